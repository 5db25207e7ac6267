use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::util::is_valid_email;

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    #[serde(default)]
    email: String,
}

/// Newsletter signup. The address is normalized (trimmed, lowercased) and
/// stored locally, then relayed to Brevo best-effort: the signup succeeds
/// even when the relay does not, and the relay outcome rides along in the
/// response for the client to inspect.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Result<Json<Value>, ApiError> {
    let email = body.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("invalid_email"));
    }

    state.db.upsert_subscriber(&email).await?;
    let outcome = state.relay.subscribe_contact(&email).await;

    Ok(Json(json!({ "success": true, "brevo": outcome })))
}
