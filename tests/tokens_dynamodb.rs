use choir_push::token::{
	dynamo::DynamoDeviceTokenDB, DeviceToken, DeviceTokenDB,
};
use json::{object, JsonValue};
use mockito::mock;
use pretty_assertions::assert_eq;
use rusoto_core::{credential::StaticProvider, HttpClient, Region};
use rusoto_dynamodb::DynamoDbClient;

#[tokio::test]
async fn test_set_token() {
	let (db, _list_mock) = create_test_ddb_tokens().await;

	let mock = mock_ddb_request_ok("PutItem", object! {}).expect(1);

	db.set(DeviceToken {
		user_id: "uid".to_string(),
		value: "ExponentPushToken[a]".to_string(),
	})
	.await
	.unwrap();

	mock.assert();
}

#[tokio::test]
async fn test_find_by_users() {
	let (db, _list_mock) = create_test_ddb_tokens().await;

	let mock = mock_ddb_request_ok(
		"Query",
		object! {
			Items: [
				{
					user_id: {S: "uid"},
					token: {S: "ExponentPushToken[a]"},
				}
			]
		},
	)
	.expect(1);

	let tokens =
		db.find_by_users(&["uid".to_string()]).await.unwrap();

	mock.assert();

	assert_eq!(
		tokens,
		vec![DeviceToken {
			user_id: "uid".to_string(),
			value: "ExponentPushToken[a]".to_string(),
		}]
	);
}

#[tokio::test]
async fn test_find_by_values() {
	let (db, _list_mock) = create_test_ddb_tokens().await;

	let mock = mock_ddb_request_ok(
		"Scan",
		object! {
			Items: [
				{
					user_id: {S: "uid"},
					token: {S: "ExponentPushToken[a]"},
				}
			]
		},
	)
	.expect(1);

	let tokens = db
		.find_by_values(&["ExponentPushToken[a]".to_string()])
		.await
		.unwrap();

	mock.assert();

	assert_eq!(tokens.len(), 1);
	assert_eq!(tokens[0].user_id, "uid");
}

#[tokio::test]
async fn test_find_by_values_chunks_large_lists() {
	let (db, _list_mock) = create_test_ddb_tokens().await;

	// the filter expression holds at most 100 operands, a longer
	// eviction list has to run as several scans
	let mock = mock_ddb_request_ok("Scan", object! { Items: [] })
		.expect(2);

	let values = (0..150)
		.map(|i| format!("ExponentPushToken[{}]", i))
		.collect::<Vec<_>>();

	let tokens = db.find_by_values(&values).await.unwrap();

	mock.assert();

	assert!(tokens.is_empty());
}

#[tokio::test]
async fn test_delete_many_counts_removed() {
	let (db, _list_mock) = create_test_ddb_tokens().await;

	let mock = mock_ddb_request_ok(
		"DeleteItem",
		object! {
			Attributes: {
				user_id: {S: "uid"},
				token: {S: "ExponentPushToken[a]"},
			}
		},
	)
	.expect(1);

	let removed = db
		.delete_many(&[DeviceToken {
			user_id: "uid".to_string(),
			value: "ExponentPushToken[a]".to_string(),
		}])
		.await
		.unwrap();

	mock.assert();

	assert_eq!(removed, 1);
}

#[tokio::test]
async fn test_delete_many_already_gone_is_noop() {
	let (db, _list_mock) = create_test_ddb_tokens().await;

	// no Attributes in the reply means nothing was deleted
	let mock =
		mock_ddb_request_ok("DeleteItem", object! {}).expect(1);

	let removed = db
		.delete_many(&[DeviceToken {
			user_id: "uid".to_string(),
			value: "ExponentPushToken[gone]".to_string(),
		}])
		.await
		.unwrap();

	mock.assert();

	assert_eq!(removed, 0);
}

async fn create_test_ddb_tokens(
) -> (DynamoDeviceTokenDB, mockito::Mock) {
	// enable env logger
	let _ = env_logger::try_init();

	let table_name = "tokens";
	let data = object! {
		LastEvaluatedTableName: "string",
		TableNames: [table_name]
	};

	// DynamoDeviceTokenDB::new will call `ListTables`
	let mock = mock_ddb_request_ok("ListTables", data);
	let db = DynamoDbClient::new_with(
		HttpClient::new().unwrap(),
		StaticProvider::new_minimal(
			"foo".to_string(),
			"bar".to_string(),
		),
		Region::Custom {
			name: "local".into(),
			endpoint: mockito::server_url(),
		},
	);

	let db = DynamoDeviceTokenDB::new(table_name, db)
		.await
		.unwrap();
	(db, mock)
}

fn mock_ddb_request_ok(
	endpoint: &str,
	res: JsonValue,
) -> mockito::Mock {
	mock("POST", "/")
		.match_header(
			"x-amz-target",
			format!("DynamoDB_20120810.{}", endpoint).as_str(),
		)
		.with_status(200)
		.with_body(res.dump())
		.create()
}
