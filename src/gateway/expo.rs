use super::{
	DeliveryReceipt, PushError, PushErrorClass, PushGateway,
	PushMessage, SubmissionTicket,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr};
use tracing::instrument;

pub const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push";

/// client for the Expo push HTTP API
pub struct ExpoGateway {
	client: reqwest::Client,
	base_url: String,
}

impl Default for ExpoGateway {
	fn default() -> Self {
		Self::with_base_url(EXPO_PUSH_URL.to_string())
	}
}

impl ExpoGateway {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_base_url(base_url: String) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url,
		}
	}
}

#[derive(Serialize)]
struct SendRequest<'a> {
	to: &'a [String],
	title: &'a str,
	body: &'a str,
	#[serde(skip_serializing_if = "HashMap::is_empty")]
	data: &'a HashMap<String, String>,
	sound: &'a str,
}

#[derive(Serialize)]
struct ReceiptRequest<'a> {
	ids: &'a [String],
}

#[derive(Deserialize)]
struct TicketResponse {
	data: Vec<WireTicket>,
}

#[derive(Deserialize)]
struct WireTicket {
	status: String,
	id: Option<String>,
	message: Option<String>,
	details: Option<WireDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDetails {
	error: Option<String>,
	expo_push_token: Option<String>,
}

#[derive(Deserialize)]
struct ReceiptResponse {
	data: HashMap<String, WireReceipt>,
}

#[derive(Deserialize)]
struct WireReceipt {
	status: String,
	message: Option<String>,
	details: Option<WireDetails>,
}

fn wire_error(
	message: Option<String>,
	details: Option<WireDetails>,
) -> PushError {
	let (class, token) = details
		.map_or((None, None), |d| (d.error, d.expo_push_token));

	let class = class.map_or_else(
		|| PushErrorClass::Unknown(String::new()),
		|class| {
			PushErrorClass::from_str(&class).unwrap_or_else(|_| {
				PushErrorClass::Unknown(class)
			})
		},
	);

	PushError {
		class,
		message: message.unwrap_or_default(),
		token,
	}
}

impl WireTicket {
	fn into_ticket(self) -> SubmissionTicket {
		if self.status == "ok" {
			if let Some(id) = self.id {
				return SubmissionTicket::Ok { id };
			}
		}
		SubmissionTicket::Error(wire_error(
			self.message,
			self.details,
		))
	}
}

impl WireReceipt {
	fn into_receipt(self) -> DeliveryReceipt {
		if self.status == "ok" {
			return DeliveryReceipt::Ok;
		}
		DeliveryReceipt::Error(wire_error(
			self.message,
			self.details,
		))
	}
}

#[async_trait]
impl PushGateway for ExpoGateway {
	fn is_valid_token(&self, token: &str) -> bool {
		(token.starts_with("ExponentPushToken[")
			|| token.starts_with("ExpoPushToken["))
			&& token.ends_with(']')
	}

	#[instrument(skip(self, tokens, message), fields(tokens = tokens.len()), err)]
	async fn submit_chunk(
		&self,
		tokens: &[String],
		message: &PushMessage,
	) -> Result<Vec<SubmissionTicket>> {
		let request = SendRequest {
			to: tokens,
			title: &message.title,
			body: &message.body,
			data: &message.data,
			//note: on ios this is used and shown
			sound: "default",
		};

		let response = self
			.client
			.post(format!("{}/send", self.base_url))
			.json(&request)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(Error::Gateway(format!(
				"push send returned {}",
				response.status()
			)));
		}

		let body = response.bytes().await?;
		let tickets: TicketResponse =
			serde_json::from_slice(&body)?;

		tracing::debug!("tickets received: {}", tickets.data.len());

		Ok(tickets
			.data
			.into_iter()
			.map(WireTicket::into_ticket)
			.collect())
	}

	#[instrument(skip(self, ticket_ids), fields(ids = ticket_ids.len()), err)]
	async fn fetch_receipts(
		&self,
		ticket_ids: &[String],
	) -> Result<HashMap<String, DeliveryReceipt>> {
		let request = ReceiptRequest { ids: ticket_ids };

		let response = self
			.client
			.post(format!("{}/getReceipts", self.base_url))
			.json(&request)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(Error::Gateway(format!(
				"receipt fetch returned {}",
				response.status()
			)));
		}

		let body = response.bytes().await?;
		let receipts: ReceiptResponse =
			serde_json::from_slice(&body)?;

		Ok(receipts
			.data
			.into_iter()
			.map(|(id, receipt)| (id, receipt.into_receipt()))
			.collect())
	}
}
