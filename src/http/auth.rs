use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;

/// The authenticated reader's id, taken from the `x-user-id` header set by
/// the fronting auth proxy. Requests reaching this service directly
/// without the header are rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(pub i64);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .map(SessionUser)
            .ok_or(ApiError::Unauthorized)
    }
}
