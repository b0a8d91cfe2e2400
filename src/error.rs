use rusoto_core::{
	credential::CredentialsError, request::TlsError, RusotoError,
};
use rusoto_dynamodb::{
	CreateTableError, DeleteItemError, ListTablesError,
	PutItemError, QueryError, ScanError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	#[error("missing required parameter: {0}")]
	MissingParameter(&'static str),

	#[error("push gateway error: {0}")]
	Gateway(String),

	#[error("http error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("serde json error: {0}")]
	SerdeJson(#[from] serde_json::Error),

	#[error("table {0} not found error")]
	TableNotFound(String),

	#[error("aws error: {0}")]
	RusotoPutItem(#[from] RusotoError<PutItemError>),

	#[error("aws error: {0}")]
	RusotoQuery(#[from] RusotoError<QueryError>),

	#[error("aws error: {0}")]
	RusotoScan(#[from] RusotoError<ScanError>),

	#[error("aws error: {0}")]
	RusotoDeleteItem(#[from] RusotoError<DeleteItemError>),

	#[error("aws error: {0}")]
	RusotoListTables(#[from] RusotoError<ListTablesError>),

	#[error("aws error: {0}")]
	RusotoCreateTable(#[from] RusotoError<CreateTableError>),

	#[error("aws error: {0}")]
	RusotoCredentials(#[from] CredentialsError),

	#[error("aws error: {0}")]
	RusotoTls(#[from] TlsError),

	#[error("DynamoDeserializeError for field: {0}")]
	DynamoDeserialize(&'static str),

	#[error("custom error: {0}")]
	Custom(String),
}

pub type Result<T> = std::result::Result<T, Error>;
