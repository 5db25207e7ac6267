use chrono::Utc;
use sqlx::QueryBuilder;

use super::schema::Database;
use super::types::{NewUser, ProfileUpdate, StorageError, User};

impl Database {
    // ========================================================================
    // User Operations
    // ========================================================================

    /// Insert a reader account, returning its id. Account creation is
    /// handled by the auth provider's signup flow; this exists for admin
    /// tooling and tests.
    pub async fn insert_user(&self, user: &NewUser) -> Result<i64, StorageError> {
        let role = if user.role.is_empty() {
            "customer"
        } else {
            &user.role
        };
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, first_name, last_name, email, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
        "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(role)
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, StorageError> {
        let row: Option<(i64, String, String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, username, first_name, last_name, email, role, image_url
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(id, username, first_name, last_name, email, role, image_url)| User {
                id,
                username,
                first_name,
                last_name,
                email,
                role,
                image_url,
            },
        ))
    }

    /// Apply a partial profile update. Absent fields are left untouched;
    /// an entirely empty update is a no-op (the handler rejects it before
    /// getting here). Updating a non-existent user is silently a no-op,
    /// matching the historical `findByIdAndUpdate` behavior.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");
        if let Some(first_name) = &update.first_name {
            fields.push("first_name = ");
            fields.push_bind_unseparated(first_name);
        }
        if let Some(last_name) = &update.last_name {
            fields.push("last_name = ");
            fields.push_bind_unseparated(last_name);
        }
        if let Some(image_url) = &update.image_url {
            fields.push("image_url = ");
            fields.push_bind_unseparated(image_url);
        }
        builder.push(" WHERE id = ").push_bind(user_id);

        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, NewUser, ProfileUpdate};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn reader(email: &str) -> NewUser {
        NewUser {
            username: "reader".into(),
            email: email.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_user() {
        let db = test_db().await;
        let id = db.insert_user(&reader("r@example.com")).await.unwrap();

        let user = db.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.email, "r@example.com");
        assert_eq!(user.role, "customer"); // empty role defaults
        assert_eq!(user.image_url, "");
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = test_db().await;
        assert!(db.get_user(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let db = test_db().await;
        let id = db.insert_user(&reader("r@example.com")).await.unwrap();

        db.update_profile(
            id,
            &ProfileUpdate {
                first_name: Some("Rami".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let user = db.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.first_name, "Rami");
        assert_eq!(user.last_name, ""); // untouched
    }

    #[tokio::test]
    async fn test_update_profile_all_fields() {
        let db = test_db().await;
        let id = db.insert_user(&reader("r@example.com")).await.unwrap();

        db.update_profile(
            id,
            &ProfileUpdate {
                first_name: Some("Rami".into()),
                last_name: Some("Nasser".into()),
                image_url: Some("https://cdn.example.com/avatar.png".into()),
            },
        )
        .await
        .unwrap();

        let user = db.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.first_name, "Rami");
        assert_eq!(user.last_name, "Nasser");
        assert_eq!(user.image_url, "https://cdn.example.com/avatar.png");
    }

    #[tokio::test]
    async fn test_update_profile_missing_user_is_noop() {
        let db = test_db().await;
        db.update_profile(
            424242,
            &ProfileUpdate {
                first_name: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() {
        let db = test_db().await;
        let id = db.insert_user(&reader("r@example.com")).await.unwrap();
        db.update_profile(id, &ProfileUpdate::default()).await.unwrap();
        let user = db.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.first_name, "");
    }
}
