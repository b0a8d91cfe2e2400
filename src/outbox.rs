use crate::resource::PushNotificationResource;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::mpsc;

/// one queued group notification, published by write paths (song or
/// recording uploads) after their own persistence has committed
#[derive(Debug, Clone)]
pub struct NotificationRequest {
	pub group_id: String,
	pub title: String,
	pub body: String,
	pub data: HashMap<String, String>,
}

/// decouples notification delivery from the publishing operation, a
/// failed send never fails the write that triggered it
pub struct NotificationOutbox {
	sender: mpsc::UnboundedSender<NotificationRequest>,
}

impl NotificationOutbox {
	/// starts the consumer task, it ends once all outbox handles are
	/// dropped and the queue drained
	#[must_use]
	pub fn spawn(resource: Arc<PushNotificationResource>) -> Self {
		let (sender, mut receiver) =
			mpsc::unbounded_channel::<NotificationRequest>();

		tokio::spawn(async move {
			while let Some(request) = receiver.recv().await {
				match resource
					.send_group_notification(
						&request.group_id,
						&request.title,
						&request.body,
						request.data,
					)
					.await
				{
					Ok(report) => tracing::info!(
						target: "push-outbox",
						group = %request.group_id,
						sent = report.sent_to,
						failed = report.did_not_send_to,
						"notification delivered"
					),
					Err(e) => tracing::error!(
						target: "push-outbox",
						group = %request.group_id,
						error = %e,
						"notification failed"
					),
				}
			}
		});

		Self { sender }
	}

	/// never blocks and never surfaces an error to the publisher
	pub fn publish(&self, request: NotificationRequest) {
		if let Err(e) = self.sender.send(request) {
			tracing::error!(
				target: "push-outbox",
				error = %e,
				"outbox closed"
			);
		}
	}
}
