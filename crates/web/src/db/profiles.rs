//! Profile repository backed by `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;

use threewords_core::Username;

use super::{ProfileRepository, RepositoryError, conflict_on_unique};
use crate::models::{NewProfile, Profile};

/// `PostgreSQL` implementation of [`ProfileRepository`].
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_profile(&self, username: &Username) -> Result<Option<Profile>, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(
            r"
            SELECT id, username, display_name, avatar_url, created_at
            FROM profiles
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(
            r"
            INSERT INTO profiles (username, display_name, avatar_url)
            VALUES ($1, $2, $3)
            RETURNING id, username, display_name, avatar_url, created_at
            ",
        )
        .bind(&profile.username)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))
    }
}
