use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::ContentBlock;

// ============================================================================
// Error Types
// ============================================================================

/// Storage-layer errors.
///
/// `ArticleNotFound` / `UserNotFound` are surfaced to callers as 404s;
/// everything else maps to a generic 500 at the HTTP boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no published article matches the given slug")]
    ArticleNotFound,

    #[error("user does not exist")]
    UserNotFound,

    /// An embedded JSON document (content blocks, recently-read list)
    /// failed to (de)serialize.
    #[error("corrupt embedded document: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ============================================================================
// Row Types
// ============================================================================

/// Internal row type for article queries (used by sqlx FromRow).
/// Hydrated into an `Article` with author/category joins and parsed blocks.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleDbRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub title_ar: Option<String>,
    pub excerpt: String,
    pub excerpt_ar: Option<String>,
    pub blocks: Option<String>,
    pub featured_image: Option<String>,
    pub author_id: Option<i64>,
    pub featured: bool,
    pub published_at: Option<i64>,
    pub view_count: i64,
    pub reading_time: Option<i64>,
}

// ============================================================================
// Data Structures
// ============================================================================

/// An English/Arabic string pair as exposed over the API.
///
/// The Arabic side falls back to the English text when no Arabic variant
/// was authored, so clients always have something to show.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Bilingual {
    pub en: String,
    pub ar: String,
}

impl Bilingual {
    pub fn with_fallback(en: String, ar: Option<String>) -> Self {
        let ar = ar.unwrap_or_else(|| en.clone());
        Self { en, ar }
    }

    pub fn empty() -> Self {
        Self {
            en: String::new(),
            ar: String::new(),
        }
    }
}

/// Author fields populated onto articles at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Category fields populated onto articles and category listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub slug: String,
    pub title_en: String,
    pub title_ar: String,
}

/// A published article with its references resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub slug: String,
    pub title: Bilingual,
    pub excerpt: Bilingual,
    #[serde(skip)]
    pub blocks: Vec<ContentBlock>,
    pub featured_image: Option<String>,
    pub author: Option<Author>,
    pub categories: Vec<CategoryRef>,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub reading_time: Option<i64>,
}

/// A reader account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub image_url: String,
}

/// Fields accepted by the profile update endpoint. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.image_url.is_none()
    }
}

/// Input for creating a reader account (used by admin tooling and tests).
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

/// Publication status of an article. Only published articles are
/// externally visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// Input for creating an article (used by admin tooling and tests).
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub slug: String,
    pub title: String,
    pub title_ar: Option<String>,
    pub excerpt: String,
    pub excerpt_ar: Option<String>,
    pub blocks: Vec<ContentBlock>,
    pub featured_image: Option<String>,
    pub author_id: Option<i64>,
    pub status: ArticleStatus,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: Option<i64>,
}

impl Default for NewArticle {
    fn default() -> Self {
        Self {
            slug: String::new(),
            title: String::new(),
            title_ar: None,
            excerpt: String::new(),
            excerpt_ar: None,
            blocks: Vec::new(),
            featured_image: None,
            author_id: None,
            status: ArticleStatus::Draft,
            featured: false,
            published_at: None,
            reading_time: None,
        }
    }
}

// ============================================================================
// Recently-Read List
// ============================================================================

/// One entry of a user's embedded recently-read list, exactly as persisted
/// in the `recently_read` JSON column. The display fields are a snapshot of
/// the article at read time, used as a fallback if the article later
/// disappears or is unpublished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyReadEntry {
    pub article_id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    pub read_at: DateTime<Utc>,
}

/// One item of the recently-read listing: the read timestamp plus the
/// article, resolved live when still published and snapshot otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyReadItem {
    pub read_at: DateTime<Utc>,
    pub article: RecentArticle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentArticle {
    pub id: i64,
    pub title: Bilingual,
    pub slug: String,
    pub excerpt: Bilingual,
    pub category: Bilingual,
    pub author: Option<Author>,
    pub published_at: DateTime<Utc>,
    pub featured_image: Option<String>,
}

impl RecentArticle {
    /// Build from the live article; the snapshot entry only contributes the
    /// read timestamp as a fallback publication date.
    pub(crate) fn from_live(article: Article, entry: &RecentlyReadEntry) -> Self {
        let category = article
            .categories
            .first()
            .map(|c| Bilingual {
                en: c.title_en.clone(),
                ar: c.title_ar.clone(),
            })
            .unwrap_or_else(Bilingual::empty);

        Self {
            id: article.id,
            title: article.title,
            slug: article.slug,
            excerpt: article.excerpt,
            category,
            author: article.author,
            published_at: article.published_at.unwrap_or(entry.read_at),
            featured_image: article.featured_image,
        }
    }

    /// The article is gone or unpublished; degrade gracefully to the
    /// snapshot captured at read time.
    pub(crate) fn from_snapshot(entry: &RecentlyReadEntry) -> Self {
        let excerpt = entry.excerpt.clone().unwrap_or_default();
        Self {
            id: entry.article_id,
            title: Bilingual::with_fallback(entry.title.clone(), None),
            slug: entry.slug.clone(),
            excerpt: Bilingual::with_fallback(excerpt, None),
            category: Bilingual::empty(),
            author: None,
            published_at: entry.read_at,
            featured_image: entry.featured_image.clone(),
        }
    }
}
