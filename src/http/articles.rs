use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::content::{render_blocks, Locale};
use crate::storage::StorageError;

const DEFAULT_LIMIT: u32 = 4;
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<String>,
    featured: Option<String>,
}

/// List published articles, newest first.
///
/// `limit` arrives as a string and anything unparseable falls back to the
/// default; the parsed value is clamped to 1..=50. `featured` filters only
/// on the literal string "true".
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query
        .limit
        .as_deref()
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);
    let featured_only = query.featured.as_deref() == Some("true");

    let articles = state.db.list_published(featured_only, limit).await?;
    Ok(Json(json!({ "articles": articles })))
}

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    locale: Option<String>,
}

/// Fetch one published article by slug, with its content blocks rendered
/// for the requested locale. Every successful fetch counts as a view.
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ArticleQuery>,
) -> Result<Json<Value>, ApiError> {
    let article = state
        .db
        .get_published_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound("not_found"))?;

    state.db.increment_view_count(article.id).await?;

    let locale = Locale::from_tag(query.locale.as_deref().unwrap_or(""));
    let rendered: Vec<String> = render_blocks(&article.blocks, locale).collect();

    let mut body = serde_json::to_value(&article).map_err(StorageError::from)?;
    body["blocks"] = serde_json::to_value(&article.blocks).map_err(StorageError::from)?;
    body["rendered"] = json!(rendered);

    Ok(Json(json!({ "article": body })))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let categories = state.db.list_active_categories().await?;
    Ok(Json(json!({ "categories": categories })))
}
