use super::{DeviceToken, DeviceTokenDB};
use crate::error::Result;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryDeviceTokenDB {
	pub db: Arc<Mutex<HashMap<(String, String), DeviceToken>>>,
}

#[async_trait]
impl DeviceTokenDB for InMemoryDeviceTokenDB {
	async fn set(&self, token: DeviceToken) -> Result<()> {
		let mut db = self.db.lock().await;

		db.insert(
			(token.user_id.clone(), token.value.clone()),
			token,
		);

		Ok(())
	}

	async fn remove(
		&self,
		user_id: &str,
		value: &str,
	) -> Result<()> {
		let mut db = self.db.lock().await;
		db.remove(&(user_id.to_string(), value.to_string()));
		Ok(())
	}

	async fn find_by_users(
		&self,
		user_ids: &[String],
	) -> Result<Vec<DeviceToken>> {
		let db = self.db.lock().await;
		Ok(db
			.values()
			.filter(|t| user_ids.contains(&t.user_id))
			.cloned()
			.collect())
	}

	async fn find_by_values(
		&self,
		values: &[String],
	) -> Result<Vec<DeviceToken>> {
		let db = self.db.lock().await;
		Ok(db
			.values()
			.filter(|t| values.contains(&t.value))
			.cloned()
			.collect())
	}

	async fn delete_many(
		&self,
		tokens: &[DeviceToken],
	) -> Result<usize> {
		let mut db = self.db.lock().await;
		Ok(tokens
			.iter()
			.filter(|t| {
				db.remove(&(t.user_id.clone(), t.value.clone()))
					.is_some()
			})
			.count())
	}
}
