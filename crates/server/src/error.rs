use std::fmt::Display;

use axum::{
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use movies_api_core::validator::ValidationErrors;

use crate::json::{DecodeError, Envelope, write_json};

const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";
const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";

/// Unified API error type; rendered as `{"error": message}` with `status`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<Value>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Logs `err` and hides it from the client behind a generic message.
    pub fn server_error(err: impl Display) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    pub fn method_not_allowed(method: &Method) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("the {} method is not supported for this resource", method),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn failed_validation(errors: ValidationErrors) -> Self {
        let fields: Map<String, Value> = errors
            .into_iter()
            .map(|(field, messages)| (field, Value::from(messages)))
            .collect();
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, Value::Object(fields))
    }

    pub fn edit_conflict() -> Self {
        Self::new(StatusCode::CONFLICT, EDIT_CONFLICT_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status, self.message)
    }
}

/// Writes `{"error": message}` with `status`. If that fails the failure is
/// logged and a bare 500 with an empty body is returned instead.
pub fn error_response(status: StatusCode, message: impl Serialize) -> Response {
    let written = Envelope::new("error", message)
        .and_then(|envelope| write_json(status, envelope, HeaderMap::new()));

    match written {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "failed to write error response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Convert from core service errors to API errors
impl From<movies_api_core::Error> for ApiError {
    fn from(err: movies_api_core::Error) -> Self {
        match err {
            movies_api_core::Error::RecordNotFound => Self::not_found(),
            movies_api_core::Error::EditConflict => Self::edit_conflict(),
            other => Self::server_error(other),
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::server_error(err)
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let response = ApiError::server_error("disk on fire").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": SERVER_ERROR_MESSAGE })
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = ApiError::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "the requested resource could not be found" })
        );
    }

    #[tokio::test]
    async fn test_method_not_allowed_names_method() {
        let response = ApiError::method_not_allowed(&Method::PUT).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "the PUT method is not supported for this resource" })
        );
    }

    #[tokio::test]
    async fn test_failed_validation_carries_field_map() {
        let mut errors = ValidationErrors::new();
        errors.insert("title".to_string(), vec!["must be provided".to_string()]);
        errors.insert(
            "year".to_string(),
            vec![
                "must be provided".to_string(),
                "must be greater than 1888".to_string(),
            ],
        );

        let response = ApiError::failed_validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": {
                    "title": ["must be provided"],
                    "year": ["must be provided", "must be greater than 1888"]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_decode_error_is_bad_request() {
        let response = ApiError::from(DecodeError::Empty).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "body must not be empty" })
        );
    }

    #[test]
    fn test_core_errors_map_to_status() {
        assert_eq!(
            ApiError::from(movies_api_core::Error::RecordNotFound).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(movies_api_core::Error::EditConflict).status,
            StatusCode::CONFLICT
        );

        let json_err = serde_json::from_str::<Value>("{").unwrap_err();
        assert_eq!(
            ApiError::from(movies_api_core::Error::Serialization(json_err)).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_response_falls_back_to_bare_500() {
        let response = error_response(StatusCode::BAD_REQUEST, Unserializable);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }
}
