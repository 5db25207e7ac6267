use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::storage::StorageError;

/// Errors surfaced to API clients.
///
/// Every variant renders as `{"error": "<code>"}` with a stable,
/// machine-readable code. Storage failures are logged server-side and
/// collapsed into a generic `server_error` so internals never leak.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Validation(&'static str),
    NotFound(&'static str),
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::ArticleNotFound => ApiError::NotFound("not_found"),
            StorageError::UserNotFound => ApiError::NotFound("user_not_found"),
            other => ApiError::Storage(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Validation(code) => (StatusCode::BAD_REQUEST, code),
            ApiError::NotFound(code) => (StatusCode::NOT_FOUND, code),
            ApiError::Storage(error) => {
                tracing::error!(error = %error, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "server_error")
            }
        };
        (status, Json(json!({ "error": code }))).into_response()
    }
}
