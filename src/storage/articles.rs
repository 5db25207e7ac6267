use chrono::{DateTime, Utc};

use super::schema::Database;
use super::types::{
    Article, ArticleDbRow, Author, Bilingual, CategoryRef, NewArticle, StorageError,
};

/// Columns selected for every article query; must stay in sync with
/// `ArticleDbRow`.
const ARTICLE_COLUMNS: &str = "id, slug, title, title_ar, excerpt, excerpt_ar, blocks, \
     featured_image, author_id, featured, published_at, view_count, reading_time";

impl Database {
    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Insert an article, returning its id. Authoring happens in the CMS;
    /// this exists for admin tooling and tests.
    pub async fn insert_article(&self, article: &NewArticle) -> Result<i64, StorageError> {
        let blocks_json = if article.blocks.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&article.blocks)?)
        };

        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO articles (slug, title, title_ar, excerpt, excerpt_ar, blocks,
                                  featured_image, author_id, status, featured,
                                  published_at, reading_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
        "#,
        )
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.title_ar)
        .bind(&article.excerpt)
        .bind(&article.excerpt_ar)
        .bind(blocks_json)
        .bind(&article.featured_image)
        .bind(article.author_id)
        .bind(article.status.as_str())
        .bind(article.featured)
        .bind(article.published_at.map(|t| t.timestamp()))
        .bind(article.reading_time)
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Replace an article's category references, preserving the given order.
    pub async fn set_article_categories(
        &self,
        article_id: i64,
        category_ids: &[i64],
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM article_category_links WHERE article_id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        for (position, category_id) in category_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO article_category_links (article_id, category_id, position)
                 VALUES (?, ?, ?)",
            )
            .bind(article_id)
            .bind(category_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List published articles, newest first, with author and categories
    /// populated. `featured_only` narrows to featured articles; `limit` is
    /// expected pre-clamped by the caller (1..=50).
    pub async fn list_published(
        &self,
        featured_only: bool,
        limit: u32,
    ) -> Result<Vec<Article>, StorageError> {
        let sql = if featured_only {
            format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles
                 WHERE status = 'published' AND featured = 1
                 ORDER BY published_at DESC, created_at DESC
                 LIMIT ?"
            )
        } else {
            format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles
                 WHERE status = 'published'
                 ORDER BY published_at DESC, created_at DESC
                 LIMIT ?"
            )
        };

        let rows: Vec<ArticleDbRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            articles.push(self.hydrate(row).await?);
        }
        Ok(articles)
    }

    /// Fetch a single published article by slug with references populated.
    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Article>, StorageError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = ? AND status = 'published'"
        );
        let row: Option<ArticleDbRow> = sqlx::query_as(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Fetch a single published article by id; used when resolving
    /// recently-read entries against the live store.
    pub(crate) async fn get_published_by_id(
        &self,
        id: i64,
    ) -> Result<Option<Article>, StorageError> {
        let sql =
            format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ? AND status = 'published'");
        let row: Option<ArticleDbRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Bump the view counter with a single atomic UPDATE.
    pub async fn increment_view_count(&self, article_id: i64) -> Result<(), StorageError> {
        sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = ?")
            .bind(article_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resolve references (author, categories) and parse embedded blocks.
    async fn hydrate(&self, row: ArticleDbRow) -> Result<Article, StorageError> {
        let author = match row.author_id {
            Some(author_id) => {
                let found: Option<(String, String, String, String)> = sqlx::query_as(
                    "SELECT username, first_name, last_name, email FROM users WHERE id = ?",
                )
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await?;
                found.map(|(username, first_name, last_name, email)| Author {
                    username,
                    first_name,
                    last_name,
                    email,
                })
            }
            None => None,
        };

        let categories: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT c.slug, c.title_en, c.title_ar
            FROM article_categories c
            JOIN article_category_links l ON l.category_id = c.id
            WHERE l.article_id = ?
            ORDER BY l.position
        "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;
        let categories = categories
            .into_iter()
            .map(|(slug, title_en, title_ar)| CategoryRef {
                slug,
                title_en,
                title_ar,
            })
            .collect();

        let blocks = match row.blocks.as_deref() {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };

        Ok(Article {
            id: row.id,
            slug: row.slug,
            title: Bilingual::with_fallback(row.title, row.title_ar),
            excerpt: Bilingual::with_fallback(row.excerpt, row.excerpt_ar),
            blocks,
            featured_image: row.featured_image,
            author,
            categories,
            featured: row.featured,
            published_at: row
                .published_at
                .and_then(|t| DateTime::from_timestamp(t, 0)),
            view_count: row.view_count,
            reading_time: row.reading_time,
        })
    }
}
