use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::UserId;

/// User model - SQL persistence layer
///
/// Credentials are stored as Argon2id hashes; plaintext passwords never
/// touch the database.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find user by username (the login identifier)
    pub async fn find_by_username(username: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn username_taken(username: &str, pool: &PgPool) -> Result<bool> {
        let row: Option<(UserId,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    /// Insert a new user with an already-hashed credential
    pub async fn insert(
        username: &str,
        email: &str,
        password_hash: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (id, username, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_struct() {
        // Just verify struct compiles
        let user = User {
            id: UserId::new(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(user.username, "ana");
    }
}
