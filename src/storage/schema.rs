use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::StorageError;

// ============================================================================
// Database
// ============================================================================

/// Pooled handle to the document store. Opened once at startup and cloned
/// into request handlers; all entity operations hang off this type in the
/// sibling modules.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open a database connection pool and run migrations.
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout=5000: wait up to 5 seconds for locks to release
        // before returning SQLITE_BUSY, absorbing transient contention
        // between concurrent request handlers.
        let options = SqliteConnectOptions::from_str(&url)?
            .foreign_keys(true)
            .pragma("busy_timeout", "5000");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Raw pool access for admin tooling and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the document collections and their indexes.
    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL DEFAULT '',
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'customer',
                image_url TEXT NOT NULL DEFAULT '',
                recently_read TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY,
                slug TEXT UNIQUE NOT NULL,
                title TEXT NOT NULL,
                title_ar TEXT,
                excerpt TEXT NOT NULL DEFAULT '',
                excerpt_ar TEXT,
                blocks TEXT,
                featured_image TEXT,
                author_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                featured INTEGER NOT NULL DEFAULT 0,
                published_at INTEGER,
                view_count INTEGER NOT NULL DEFAULT 0,
                reading_time INTEGER,
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS article_categories (
                id INTEGER PRIMARY KEY,
                slug TEXT UNIQUE NOT NULL,
                title_en TEXT NOT NULL,
                title_ar TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active'
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // Join table; position preserves the authored category order so
        // "first category" is stable in listings.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS article_category_links (
                article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES article_categories(id) ON DELETE CASCADE,
                position INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (article_id, category_id)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS newsletter_subscribers (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // Indexes for the public listing queries
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_articles_status_published
             ON articles(status, published_at DESC)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_featured ON articles(featured)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_category_links_article
             ON article_category_links(article_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
