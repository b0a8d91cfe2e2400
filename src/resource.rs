use crate::{
	error::{Error, Result},
	gateway::{
		chunk, DeliveryReceipt, PushError, PushErrorClass,
		PushGateway, PushMessage, SubmissionTicket,
	},
	group::GroupMembershipDB,
	token::{DeviceToken, DeviceTokenDB},
};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::instrument;

/// provider limits and the receipt settle interval
#[derive(Debug, Clone)]
pub struct PushConfig {
	/// max destinations per submission call
	pub submit_chunk_size: usize,
	/// max ticket ids per receipt fetch
	pub receipt_chunk_size: usize,
	/// receipts are not available right after submission, the
	/// reconciler always waits this long before the first fetch
	pub settle_delay: Duration,
}

impl Default for PushConfig {
	fn default() -> Self {
		Self {
			submit_chunk_size: 100,
			receipt_chunk_size: 300,
			settle_delay: Duration::from_secs(30),
		}
	}
}

/// aggregate outcome of one group send, raw counts only, any
/// "N Users" style presentation is up to the caller
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Serialize,
)]
pub struct DeliveryReport {
	/// tokens handed to the gateway
	pub attempted: usize,
	/// receipts confirming handoff
	pub sent_to: usize,
	/// ticket errors plus receipt errors
	pub did_not_send_to: usize,
	/// dead tokens evicted from the store
	pub resolved_tokens: usize,
	pub ticket_errors: usize,
	pub receipt_errors: usize,
}

struct StageOutcome {
	failed: usize,
	resolved: usize,
}

pub struct PushNotificationResource {
	tokens: Arc<dyn DeviceTokenDB>,
	groups: Arc<dyn GroupMembershipDB>,
	gateway: Arc<dyn PushGateway>,
	config: PushConfig,
}

impl PushNotificationResource {
	#[must_use]
	pub fn new(
		tokens: Arc<dyn DeviceTokenDB>,
		groups: Arc<dyn GroupMembershipDB>,
		gateway: Arc<dyn PushGateway>,
	) -> Self {
		Self::with_config(
			tokens,
			groups,
			gateway,
			PushConfig::default(),
		)
	}

	#[must_use]
	pub fn with_config(
		tokens: Arc<dyn DeviceTokenDB>,
		groups: Arc<dyn GroupMembershipDB>,
		gateway: Arc<dyn PushGateway>,
		config: PushConfig,
	) -> Self {
		Self {
			tokens,
			groups,
			gateway,
			config,
		}
	}

	/// # Errors
	/// will return an error if the token database failed to store
	#[instrument(skip(self, token))]
	pub async fn set_token(
		&self,
		user_id: &str,
		token: &str,
	) -> Result<()> {
		self.tokens
			.set(DeviceToken {
				user_id: user_id.to_string(),
				value: token.to_string(),
			})
			.await?;

		tracing::info!("token-stored");

		Ok(())
	}

	/// explicit unregistration from the device itself
	/// # Errors
	/// will return an error if the token database failed to delete
	#[instrument(skip(self, token))]
	pub async fn remove_token(
		&self,
		user_id: &str,
		token: &str,
	) -> Result<()> {
		self.tokens.remove(user_id, token).await?;

		tracing::info!("token-removed");

		Ok(())
	}

	/// all deliverable tokens of a group's members; an empty group
	/// or a group without registered tokens yields an empty list
	/// # Errors
	/// membership or token lookup failures propagate
	#[instrument(skip(self), err)]
	pub async fn resolve_group_tokens(
		&self,
		group_id: &str,
	) -> Result<Vec<DeviceToken>> {
		let members = self.groups.member_ids(group_id).await?;
		if members.is_empty() {
			return Ok(Vec::new());
		}

		let tokens = self.tokens.find_by_users(&members).await?;

		Ok(tokens
			.into_iter()
			.filter(|token| {
				let valid =
					self.gateway.is_valid_token(&token.value);
				if !valid {
					tracing::warn!(
						target: "push-resolve",
						user = %token.user_id,
						"malformed push token skipped"
					);
				}
				valid
			})
			.collect())
	}

	/// submits in provider-sized chunks; a chunk-level transport
	/// failure drops that chunk's tokens, they get neither a ticket
	/// nor a retry
	async fn submit(
		&self,
		tokens: &[String],
		message: &PushMessage,
	) -> Vec<SubmissionTicket> {
		let mut tickets = Vec::with_capacity(tokens.len());

		for chunk in chunk(tokens, self.config.submit_chunk_size) {
			match self
				.gateway
				.submit_chunk(&chunk, message)
				.await
			{
				Ok(mut chunk_tickets) => {
					tickets.append(&mut chunk_tickets);
				}
				Err(e) => {
					tracing::error!(
						target: "push-submit",
						error = %e,
						dropped = chunk.len(),
						"chunk submission failed"
					);
				}
			}
		}

		tickets
	}

	/// counts every error, collects `DeviceNotRegistered` tokens and
	/// evicts them in one bulk call
	async fn handle_errors(
		&self,
		errors: Vec<PushError>,
		stage: &'static str,
	) -> StageOutcome {
		let failed = errors.len();
		let mut evict = Vec::new();

		for error in errors {
			match error.class {
				PushErrorClass::DeviceNotRegistered => {
					error.token.map_or_else(
						|| {
							tracing::error!(
								target: "push-errors",
								stage,
								"DeviceNotRegistered without a token"
							);
						},
						|token| evict.push(token),
					);
				}
				class => {
					tracing::warn!(
						target: "push-errors",
						stage,
						class = %class,
						message = %error.message,
						"push error"
					);
				}
			}
		}

		let resolved = self.evict_tokens(&evict).await;

		StageOutcome { failed, resolved }
	}

	/// storage failures here are logged, they never fail the send
	async fn evict_tokens(&self, values: &[String]) -> usize {
		if values.is_empty() {
			return 0;
		}

		let records = match self.tokens.find_by_values(values).await
		{
			Ok(records) => records,
			Err(e) => {
				tracing::error!(
					target: "push-evict",
					error = %e,
					"token lookup for eviction failed"
				);
				return 0;
			}
		};

		if records.is_empty() {
			return 0;
		}

		match self.tokens.delete_many(&records).await {
			Ok(resolved) => {
				tracing::info!(
					target: "push-evict",
					resolved,
					"evicted dead tokens"
				);
				resolved
			}
			Err(e) => {
				tracing::error!(
					target: "push-evict",
					error = %e,
					"token eviction failed"
				);
				0
			}
		}
	}

	/// two-phase reconciliation: ticket errors first, then receipts
	/// after the settle interval
	async fn reconcile(
		&self,
		tickets: Vec<SubmissionTicket>,
		attempted: usize,
	) -> DeliveryReport {
		let mut receipt_ids = Vec::new();
		let mut ticket_errors = Vec::new();
		for ticket in tickets {
			match ticket {
				SubmissionTicket::Ok { id } => receipt_ids.push(id),
				SubmissionTicket::Error(error) => {
					ticket_errors.push(error);
				}
			}
		}

		// ticket-stage errors are acted on before any receipt work
		let ticket_outcome =
			self.handle_errors(ticket_errors, "ticket").await;

		tokio::time::sleep(self.config.settle_delay).await;

		let mut ok_receipts = 0;
		let mut receipt_errors = Vec::new();
		for chunk in
			chunk(&receipt_ids, self.config.receipt_chunk_size)
		{
			match self.gateway.fetch_receipts(&chunk).await {
				Ok(receipts) => {
					// ids absent from the response have no receipt
					// yet and count neither as ok nor as error
					for receipt in receipts.into_values() {
						match receipt {
							DeliveryReceipt::Ok => ok_receipts += 1,
							DeliveryReceipt::Error(error) => {
								receipt_errors.push(error);
							}
						}
					}
				}
				Err(e) => {
					tracing::error!(
						target: "push-receipt",
						error = %e,
						"receipt fetch failed"
					);
				}
			}
		}

		let receipt_outcome =
			self.handle_errors(receipt_errors, "receipt").await;

		DeliveryReport {
			attempted,
			sent_to: ok_receipts,
			did_not_send_to: ticket_outcome.failed
				+ receipt_outcome.failed,
			resolved_tokens: ticket_outcome.resolved
				+ receipt_outcome.resolved,
			ticket_errors: ticket_outcome.failed,
			receipt_errors: receipt_outcome.failed,
		}
	}

	/// notifies every member of a group; evicting dead tokens is the
	/// only persistent side effect
	/// # Errors
	/// fails fast on missing parameters, and when membership or
	/// token resolution fails
	#[instrument(skip(self, data), err)]
	pub async fn send_group_notification(
		&self,
		group_id: &str,
		title: &str,
		body: &str,
		data: HashMap<String, String>,
	) -> Result<DeliveryReport> {
		if group_id.is_empty() {
			return Err(Error::MissingParameter("group_id"));
		}
		if title.is_empty() {
			return Err(Error::MissingParameter("title"));
		}
		if body.is_empty() {
			return Err(Error::MissingParameter("body"));
		}

		let tokens = self.resolve_group_tokens(group_id).await?;
		if tokens.is_empty() {
			tracing::info!(
				target: "push-send",
				group = %group_id,
				"no deliverable tokens"
			);
			return Ok(DeliveryReport::default());
		}

		let values = tokens
			.iter()
			.map(|token| token.value.clone())
			.collect::<Vec<_>>();

		let message = PushMessage {
			title: title.to_string(),
			body: body.to_string(),
			data,
		};

		let tickets = self.submit(&values, &message).await;
		let report = self.reconcile(tickets, values.len()).await;

		tracing::info!(
			target: "push-send",
			group = %group_id,
			attempted = report.attempted,
			sent = report.sent_to,
			failed = report.did_not_send_to,
			resolved = report.resolved_tokens,
			"group notification done"
		);

		Ok(report)
	}
}
