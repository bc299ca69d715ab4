//! Profile repository

use super::StoreResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRecord {
    pub id: i64,
    pub user_id: i64,
    pub avatar: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn find_by_user_id(pool: &PgPool, user_id: i64) -> StoreResult<Option<ProfileRecord>> {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT id, user_id, avatar, bio, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Create the profile on first write, otherwise update it.
    ///
    /// `None` for either field keeps the stored value (or the empty default
    /// on insert).
    pub async fn upsert(
        pool: &PgPool,
        user_id: i64,
        bio: Option<&str>,
        avatar: Option<&str>,
    ) -> StoreResult<ProfileRecord> {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            r#"
            INSERT INTO profiles (user_id, bio, avatar)
            VALUES ($1, COALESCE($2, ''), COALESCE($3, ''))
            ON CONFLICT (user_id) DO UPDATE SET
                bio = COALESCE($2, profiles.bio),
                avatar = COALESCE($3, profiles.avatar),
                updated_at = NOW()
            RETURNING id, user_id, avatar, bio, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(bio)
        .bind(avatar)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }
}
