use super::{DeviceToken, DeviceTokenDB};
use crate::{
	dynamo_util::{attr_s, db_key, table_init, DynamoHashMap},
	error::{Error, Result},
};
use async_trait::async_trait;
use rusoto_dynamodb::{
	AttributeValue, DeleteItemInput, DynamoDb, DynamoDbClient,
	PutItemInput, QueryInput, ScanInput,
};
use std::{
	collections::HashMap,
	convert::{TryFrom, TryInto},
};
use tracing::instrument;

const HASH_KEY: &str = "user_id";
const RANGE_KEY: &str = "token";

/// DynamoDB rejects `IN` lists with more than 100 operands
const SCAN_IN_LIMIT: usize = 100;

#[derive(Clone)]
pub struct DynamoDeviceTokenDB {
	db: DynamoDbClient,
	table: String,
}

impl DynamoDeviceTokenDB {
	/// # Errors
	/// Returns an error if the table is not initiated
	pub async fn new(
		table_name: &str,
		db: DynamoDbClient,
	) -> Result<Self> {
		table_init(&db, table_name, HASH_KEY, RANGE_KEY).await?;
		Ok(Self {
			db,
			table: table_name.to_string(),
		})
	}

	#[instrument(skip(self), err)]
	async fn query_user(
		&self,
		user_id: &str,
	) -> Result<Vec<DeviceToken>> {
		let mut values = HashMap::with_capacity(1);
		values.insert(":uid".to_string(), attr_s(user_id));

		let output = self
			.db
			.query(QueryInput {
				table_name: self.table.clone(),
				key_condition_expression: Some(format!(
					"{} = :uid",
					HASH_KEY
				)),
				expression_attribute_values: Some(values),
				..QueryInput::default()
			})
			.await?;

		Ok(output
			.items
			.unwrap_or_default()
			.into_iter()
			.filter_map(|item| item.try_into().ok())
			.collect())
	}
}

impl From<DeviceToken> for DynamoHashMap {
	fn from(v: DeviceToken) -> Self {
		let mut map = Self::with_capacity(2);
		map.insert(HASH_KEY.to_string(), attr_s(&v.user_id));
		map.insert(RANGE_KEY.to_string(), attr_s(&v.value));
		map
	}
}

impl TryFrom<HashMap<String, AttributeValue>> for DeviceToken {
	type Error = Error;

	fn try_from(
		map: HashMap<String, AttributeValue>,
	) -> Result<Self> {
		Ok(Self {
			user_id: map
				.get(HASH_KEY)
				.and_then(|attr| attr.s.clone())
				.ok_or(Error::DynamoDeserialize(HASH_KEY))?,
			value: map
				.get(RANGE_KEY)
				.and_then(|attr| attr.s.clone())
				.ok_or(Error::DynamoDeserialize(RANGE_KEY))?,
		})
	}
}

#[async_trait]
impl DeviceTokenDB for DynamoDeviceTokenDB {
	#[instrument(skip(self, token), err)]
	async fn set(&self, token: DeviceToken) -> Result<()> {
		// put_item on the composite key makes duplicate inserts no-ops
		self.db
			.put_item(PutItemInput {
				table_name: self.table.clone(),
				item: token.into(),
				..PutItemInput::default()
			})
			.await?;

		tracing::debug!("token saved");

		Ok(())
	}

	#[instrument(skip(self), err)]
	async fn remove(
		&self,
		user_id: &str,
		value: &str,
	) -> Result<()> {
		self.db
			.delete_item(DeleteItemInput {
				table_name: self.table.clone(),
				key: db_key(
					(HASH_KEY, user_id),
					(RANGE_KEY, value),
				),
				..DeleteItemInput::default()
			})
			.await?;

		Ok(())
	}

	async fn find_by_users(
		&self,
		user_ids: &[String],
	) -> Result<Vec<DeviceToken>> {
		let mut tokens = Vec::new();
		for user_id in user_ids {
			tokens.extend(self.query_user(user_id).await?);
		}
		Ok(tokens)
	}

	#[instrument(skip(self, values), err)]
	async fn find_by_values(
		&self,
		values: &[String],
	) -> Result<Vec<DeviceToken>> {
		let mut names = HashMap::with_capacity(1);
		names.insert("#tok".to_string(), RANGE_KEY.to_string());

		let mut tokens = Vec::new();

		// dead tokens are rare, a filtered scan is good enough
		// here; the filter expression holds at most `SCAN_IN_LIMIT`
		// operands, larger lists take several scans
		for chunk in values.chunks(SCAN_IN_LIMIT) {
			let mut attr_values =
				HashMap::with_capacity(chunk.len());
			let mut placeholders = Vec::with_capacity(chunk.len());
			for (i, value) in chunk.iter().enumerate() {
				let placeholder = format!(":t{}", i);
				attr_values
					.insert(placeholder.clone(), attr_s(value));
				placeholders.push(placeholder);
			}

			let filter = format!(
				"#tok IN ({})",
				placeholders.join(", ")
			);
			let mut start_key = None;

			loop {
				let output = self
					.db
					.scan(ScanInput {
						table_name: self.table.clone(),
						filter_expression: Some(filter.clone()),
						expression_attribute_names: Some(
							names.clone(),
						),
						expression_attribute_values: Some(
							attr_values.clone(),
						),
						exclusive_start_key: start_key,
						..ScanInput::default()
					})
					.await?;

				tokens.extend(
					output
						.items
						.unwrap_or_default()
						.into_iter()
						.filter_map(|item| item.try_into().ok()),
				);

				start_key = output.last_evaluated_key;
				if start_key.is_none() {
					break;
				}
			}
		}

		Ok(tokens)
	}

	#[instrument(skip(self, tokens), err)]
	async fn delete_many(
		&self,
		tokens: &[DeviceToken],
	) -> Result<usize> {
		let mut removed = 0;

		for token in tokens {
			let output = self
				.db
				.delete_item(DeleteItemInput {
					table_name: self.table.clone(),
					key: db_key(
						(HASH_KEY, &token.user_id),
						(RANGE_KEY, &token.value),
					),
					return_values: Some("ALL_OLD".to_string()),
					..DeleteItemInput::default()
				})
				.await?;

			// no returned attributes means the token was already gone
			if output.attributes.is_some() {
				removed += 1;
			}
		}

		tracing::debug!("tokens removed: {}", removed);

		Ok(removed)
	}
}
