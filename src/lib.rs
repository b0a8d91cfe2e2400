#![forbid(unsafe_code)]
#![deny(
	dead_code,
	unused_imports,
	unused_must_use,
	unused_variables,
	unused_mut
)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(
	clippy::as_conversions,
	clippy::dbg_macro,
	clippy::float_cmp_const,
	clippy::lossy_float_literal,
	clippy::string_to_string,
	clippy::unneeded_field_pattern,
	clippy::verbose_file_reads,
	clippy::unwrap_used,
	clippy::panic,
	clippy::needless_update,
	clippy::match_like_matches_macro,
	clippy::from_over_into,
	clippy::useless_conversion
)]
#![allow(clippy::module_name_repetitions)]

pub mod dynamo_util;
pub mod error;
pub mod gateway;
pub mod group;
pub mod outbox;
pub mod resource;
pub mod schema;
pub mod token;

use error::Error;
use resource::PushNotificationResource;
use schema::{
	GroupNotificationRequest, TokenStoreRequest,
	TokenStoreResponse,
};
use std::sync::Arc;
use warp::{
	filters::BoxedFilter, hyper::StatusCode, Filter, Rejection,
	Reply,
};

/// warp routes of the push module: device token registration and
/// the admin "notify group" action
#[must_use]
pub fn create_filter(
	resource: Arc<PushNotificationResource>,
) -> BoxedFilter<(Box<dyn Reply>,)> {
	let store_resource = resource.clone();
	let store = warp::path!("push" / "token")
		.and(warp::post())
		.and(warp::body::json())
		.and(warp::any().map(move || store_resource.clone()))
		.and_then(token_store_filter_fn);

	let remove_resource = resource.clone();
	let remove = warp::path!("push" / "token")
		.and(warp::delete())
		.and(warp::body::json())
		.and(warp::any().map(move || remove_resource.clone()))
		.and_then(token_remove_filter_fn);

	let notify = warp::path!("push" / "group")
		.and(warp::post())
		.and(warp::body::json())
		.and(warp::any().map(move || resource.clone()))
		.and_then(notify_group_filter_fn);

	store
		.or(remove)
		.or(notify)
		.map(|reply| -> Box<dyn Reply> { Box::new(reply) })
		.boxed()
}

async fn token_store_filter_fn(
	request: TokenStoreRequest,
	resource: Arc<PushNotificationResource>,
) -> Result<impl Reply, Rejection> {
	match resource
		.set_token(&request.user_id, &request.token)
		.await
	{
		Ok(()) => {
			return Ok(warp::reply::json(&TokenStoreResponse {
				success: true,
			})
			.into_response());
		}
		Err(err) => tracing::error!("{}", err),
	};
	Ok(warp::reply::with_status(
		String::from("failed to store token"),
		StatusCode::BAD_REQUEST,
	)
	.into_response())
}

async fn token_remove_filter_fn(
	request: TokenStoreRequest,
	resource: Arc<PushNotificationResource>,
) -> Result<impl Reply, Rejection> {
	match resource
		.remove_token(&request.user_id, &request.token)
		.await
	{
		Ok(()) => {
			return Ok(warp::reply::json(&TokenStoreResponse {
				success: true,
			})
			.into_response());
		}
		Err(err) => tracing::error!("{}", err),
	};
	Ok(warp::reply::with_status(
		String::from("failed to remove token"),
		StatusCode::BAD_REQUEST,
	)
	.into_response())
}

async fn notify_group_filter_fn(
	request: GroupNotificationRequest,
	resource: Arc<PushNotificationResource>,
) -> Result<impl Reply, Rejection> {
	match resource
		.send_group_notification(
			&request.group_id,
			&request.title,
			&request.message,
			request.data,
		)
		.await
	{
		Ok(report) => {
			Ok(warp::reply::json(&report).into_response())
		}
		Err(err @ Error::MissingParameter(_)) => {
			tracing::warn!("{}", err);
			Ok(warp::reply::with_status(
				err.to_string(),
				StatusCode::BAD_REQUEST,
			)
			.into_response())
		}
		Err(err) => {
			tracing::error!("{}", err);
			Ok(warp::reply::with_status(
				String::from("notification failed"),
				StatusCode::INTERNAL_SERVER_ERROR,
			)
			.into_response())
		}
	}
}
