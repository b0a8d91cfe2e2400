use crate::error::Result;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use strum_macros::{EnumString, ToString};
use tokio::sync::Mutex;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString, ToString)]
pub enum GroupRole {
	Admin,
	Member,
}

/// membership row of a choir group, never mutated by this crate
#[derive(Debug, Clone)]
pub struct GroupMember {
	pub user_id: String,
	pub group_id: String,
	pub role: GroupRole,
}

/// query boundary into the app's group persistence, the real store
/// lives outside this crate
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait GroupMembershipDB: Send + Sync {
	async fn member_ids(&self, group_id: &str)
		-> Result<Vec<String>>;
}

#[derive(Default)]
pub struct InMemoryGroupDB {
	pub db: Arc<Mutex<HashMap<String, Vec<GroupMember>>>>,
}

impl InMemoryGroupDB {
	pub async fn add_member(&self, member: GroupMember) {
		let mut db = self.db.lock().await;
		db.entry(member.group_id.clone())
			.or_default()
			.push(member);
	}
}

#[async_trait]
impl GroupMembershipDB for InMemoryGroupDB {
	async fn member_ids(
		&self,
		group_id: &str,
	) -> Result<Vec<String>> {
		let db = self.db.lock().await;
		Ok(db
			.get(group_id)
			.map(|members| {
				members.iter().map(|m| m.user_id.clone()).collect()
			})
			.unwrap_or_default())
	}
}
