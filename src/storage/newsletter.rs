use chrono::Utc;

use super::schema::Database;
use super::types::StorageError;

impl Database {
    // ========================================================================
    // Newsletter Operations
    // ========================================================================

    /// Record a newsletter signup. Idempotent: re-subscribing an existing
    /// address leaves the stored record untouched. Returns whether a new
    /// record was created.
    ///
    /// The caller is responsible for normalizing and validating the address
    /// before it gets here.
    pub async fn upsert_subscriber(&self, email: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers (email, created_at)
            VALUES (?, ?)
            ON CONFLICT(email) DO NOTHING
        "#,
        )
        .bind(email)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn subscriber_count(&self) -> Result<i64, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM newsletter_subscribers")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
