use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::SessionUser;
use super::error::ApiError;
use super::AppState;
use crate::storage::ProfileUpdate;
use crate::util::MAX_SLUG_LENGTH;

/// The signed-in reader's recently-read articles, most recent first.
/// Never more than 20 items.
pub async fn list_recently_read(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Result<Json<Value>, ApiError> {
    let items = state.db.list_recently_read(user_id).await?;
    Ok(Json(json!({ "items": items })))
}

#[derive(Debug, Deserialize)]
pub struct RecordReadBody {
    #[serde(default)]
    slug: String,
}

/// Record a read of the given article slug against the signed-in reader.
pub async fn record_read(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(body): Json<RecordReadBody>,
) -> Result<Json<Value>, ApiError> {
    let slug = body.slug.trim();
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(ApiError::Validation("invalid_slug"));
    }

    state.db.record_read(user_id, slug).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    first_name: Option<String>,
    last_name: Option<String>,
    // Historically sent as "imageURL"; accept both spellings.
    #[serde(alias = "imageURL")]
    image_url: Option<String>,
}

/// Partial profile update. Present fields are trimmed and stored, blank
/// included, so a reader can clear a field by sending an empty string.
/// Absent fields are left untouched; a request carrying no recognized
/// field at all is rejected.
pub async fn update_profile(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(body): Json<ProfileBody>,
) -> Result<Json<Value>, ApiError> {
    let clean = |field: Option<String>| field.map(|value| value.trim().to_string());

    let update = ProfileUpdate {
        first_name: clean(body.first_name),
        last_name: clean(body.last_name),
        image_url: clean(body.image_url),
    };
    if update.is_empty() {
        return Err(ApiError::Validation("no_updates"));
    }

    state.db.update_profile(user_id, &update).await?;
    Ok(Json(json!({ "success": true })))
}
