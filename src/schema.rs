use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenStoreRequest {
	pub user_id: String,
	pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenStoreResponse {
	pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupNotificationRequest {
	pub group_id: String,
	pub title: String,
	pub message: String,
	#[serde(default)]
	pub data: HashMap<String, String>,
}
