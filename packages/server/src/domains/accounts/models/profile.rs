use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::UserId;

/// Profile model - 1:1 with a user, created lazily on first profile view.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Profile {
    pub user_id: UserId,
    pub bio: String,
    pub phone: String,
    pub photo_url: String,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Fetch the user's profile, creating an empty one if none exists yet.
    ///
    /// Insert is idempotent (ON CONFLICT DO NOTHING), so concurrent first
    /// views converge on a single row.
    pub async fn get_or_create(user_id: UserId, pool: &PgPool) -> Result<Self> {
        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;

        sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Replace the profile fields. Only ever called for the owning user.
    pub async fn update(
        user_id: UserId,
        bio: &str,
        phone: &str,
        photo_url: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE profiles
             SET bio = $2, phone = $3, photo_url = $4, updated_at = NOW()
             WHERE user_id = $1
             RETURNING *",
        )
        .bind(user_id)
        .bind(bio)
        .bind(phone)
        .bind(photo_url)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
