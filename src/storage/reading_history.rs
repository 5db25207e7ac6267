use chrono::Utc;

use super::schema::Database;
use super::types::{RecentArticle, RecentlyReadEntry, RecentlyReadItem, StorageError};
use super::RECENTLY_READ_CAP;

/// Maintain the invariants of the embedded recently-read list: no two
/// entries share a slug, the newest entry sits at the front, and the list
/// never exceeds [`RECENTLY_READ_CAP`] entries (oldest evicted first).
fn push_entry(
    mut list: Vec<RecentlyReadEntry>,
    entry: RecentlyReadEntry,
) -> Vec<RecentlyReadEntry> {
    list.retain(|existing| existing.slug != entry.slug);
    list.insert(0, entry);
    list.truncate(RECENTLY_READ_CAP);
    list
}

impl Database {
    // ========================================================================
    // Recently-Read Operations
    // ========================================================================

    /// Record that `user_id` read the published article with `slug`.
    ///
    /// Snapshots the article's display fields into a new list entry,
    /// de-duplicates by slug, prepends, caps at 20, and persists the whole
    /// list. The persist is a full-document rewrite: two concurrent reads
    /// by the same user race and the last write wins. Accepted for this
    /// non-critical feature.
    pub async fn record_read(&self, user_id: i64, slug: &str) -> Result<(), StorageError> {
        let article: Option<(i64, String, String, String, Option<String>)> = sqlx::query_as(
            "SELECT id, slug, title, excerpt, featured_image
             FROM articles WHERE slug = ? AND status = 'published'",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        let (article_id, slug, title, excerpt, featured_image) =
            article.ok_or(StorageError::ArticleNotFound)?;

        let stored: Option<(String,)> =
            sqlx::query_as("SELECT recently_read FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        let (raw,) = stored.ok_or(StorageError::UserNotFound)?;
        let list: Vec<RecentlyReadEntry> = serde_json::from_str(&raw)?;

        let entry = RecentlyReadEntry {
            article_id,
            slug,
            title,
            excerpt: (!excerpt.is_empty()).then_some(excerpt),
            featured_image,
            read_at: Utc::now(),
        };
        let list = push_entry(list, entry);

        sqlx::query("UPDATE users SET recently_read = ? WHERE id = ?")
            .bind(serde_json::to_string(&list)?)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Return the user's recently-read items, most recent first.
    ///
    /// Entries are re-sorted by `readAt` rather than trusting storage
    /// order. Each entry is resolved against the live store so titles and
    /// categories reflect edits made after the read; entries whose article
    /// has been deleted or unpublished fall back to the snapshot captured
    /// at read time instead of disappearing.
    pub async fn list_recently_read(
        &self,
        user_id: i64,
    ) -> Result<Vec<RecentlyReadItem>, StorageError> {
        let stored: Option<(String,)> =
            sqlx::query_as("SELECT recently_read FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some((raw,)) = stored else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<RecentlyReadEntry> = serde_json::from_str(&raw)?;
        entries.sort_by(|a, b| b.read_at.cmp(&a.read_at));

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let article = match self.get_published_by_id(entry.article_id).await? {
                Some(live) => RecentArticle::from_live(live, &entry),
                None => RecentArticle::from_snapshot(&entry),
            };
            items.push(RecentlyReadItem {
                read_at: entry.read_at,
                article,
            });
        }
        Ok(items)
    }
}

// ============================================================================
// Tests
// ============================================================================
