pub mod dynamo;
pub mod in_memory;

use crate::error::Result;
use async_trait::async_trait;

/// one registered push destination; a user holds one entry per device.
/// unique per (`user_id`, `value`) pair, duplicate inserts are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceToken {
	pub user_id: String,
	pub value: String,
}

#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait DeviceTokenDB: Send + Sync {
	async fn set(&self, token: DeviceToken) -> Result<()>;
	async fn remove(&self, user_id: &str, value: &str)
		-> Result<()>;
	async fn find_by_users(
		&self,
		user_ids: &[String],
	) -> Result<Vec<DeviceToken>>;
	async fn find_by_values(
		&self,
		values: &[String],
	) -> Result<Vec<DeviceToken>>;
	/// returns the number of tokens actually removed, deleting an
	/// already-gone token contributes 0
	async fn delete_many(
		&self,
		tokens: &[DeviceToken],
	) -> Result<usize>;
}
