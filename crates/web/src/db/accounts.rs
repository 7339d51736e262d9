//! Account repository backed by `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{AccountRepository, RepositoryError, conflict_on_unique};
use crate::models::{Account, NewAccount};

/// `PostgreSQL` implementation of [`AccountRepository`].
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, RepositoryError> {
        let account = sqlx::query_as::<_, Account>(
            r"
            SELECT id, external_id, username, display_name, avatar_url, created_at
            FROM accounts
            WHERE external_id = $1
            ",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        sqlx::query_as::<_, Account>(
            r"
            INSERT INTO accounts (external_id, username, display_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, external_id, username, display_name, avatar_url, created_at
            ",
        )
        .bind(&account.external_id)
        .bind(&account.username)
        .bind(&account.display_name)
        .bind(&account.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "account"))
    }
}
