pub mod healthcheck;
pub mod movies;

use axum::{extract::OriginalUri, http::Method};

use crate::ApiError;

pub async fn not_found(uri: OriginalUri) -> ApiError {
    tracing::debug!(path = %uri.0.path(), "no route");
    ApiError::not_found()
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(&method)
}
