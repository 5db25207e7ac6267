use super::schema::Database;
use super::types::{CategoryRef, StorageError};

impl Database {
    // ========================================================================
    // Category Operations
    // ========================================================================

    /// Create a category, returning its id.
    pub async fn create_category(
        &self,
        slug: &str,
        title_en: &str,
        title_ar: &str,
    ) -> Result<i64, StorageError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO article_categories (slug, title_en, title_ar)
            VALUES (?, ?, ?)
            RETURNING id
        "#,
        )
        .bind(slug)
        .bind(title_en)
        .bind(title_ar)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Flip a category between `active` and `inactive`.
    pub async fn set_category_status(
        &self,
        category_id: i64,
        status: &str,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE article_categories SET status = ? WHERE id = ?")
            .bind(status)
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List active categories for the public category endpoint.
    pub async fn list_active_categories(&self) -> Result<Vec<CategoryRef>, StorageError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT slug, title_en, title_ar FROM article_categories WHERE status = 'active'",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(slug, title_en, title_ar)| CategoryRef {
                slug,
                title_en,
                title_ar,
            })
            .collect())
    }
}
