pub mod expo;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

/// payload handed to the push provider for every destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushMessage {
	pub title: String,
	pub body: String,
	pub data: HashMap<String, String>,
}

/// provider error codes; `DeviceNotRegistered` is the only class that
/// justifies evicting a token, everything else is transient
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display)]
pub enum PushErrorClass {
	DeviceNotRegistered,
	MessageTooBig,
	MessageRateExceeded,
	MismatchSenderId,
	InvalidCredentials,
	#[strum(default)]
	Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushError {
	pub class: PushErrorClass,
	pub message: String,
	/// the provider includes the offending token for
	/// `DeviceNotRegistered`
	pub token: Option<String>,
}

/// per-destination acknowledgment of one submission call, only lives
/// for the duration of a send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTicket {
	Ok { id: String },
	Error(PushError),
}

/// later confirmation of the gateway handoff, keyed by ticket id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReceipt {
	Ok,
	Error(PushError),
}

#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait PushGateway: Send + Sync {
	/// syntactic check only, no deliverability guarantee
	fn is_valid_token(&self, token: &str) -> bool;

	/// one provider call, `Err` means the whole chunk failed transport
	async fn submit_chunk(
		&self,
		tokens: &[String],
		message: &PushMessage,
	) -> Result<Vec<SubmissionTicket>>;

	/// ids absent from the result have no receipt available yet
	async fn fetch_receipts(
		&self,
		ticket_ids: &[String],
	) -> Result<HashMap<String, DeliveryReceipt>>;
}

/// splits `items` into provider-sized chunks, preserving order
#[must_use]
pub fn chunk<T: Clone>(items: &[T], max_size: usize) -> Vec<Vec<T>> {
	items
		.chunks(max_size.max(1))
		.map(<[T]>::to_vec)
		.collect()
}
