//! Storage for profiles, word submissions and accounts.
//!
//! # Tables
//!
//! - `profiles` - Claimed usernames (unique, lowercase)
//! - `word_submissions` - Append-only three-word submissions
//! - `accounts` - Identities linked through OAuth sign-in
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p threewords-cli -- migrate
//! ```
//!
//! The repository traits are implemented by the `PostgreSQL` repositories in
//! this module and by [`memory::MemoryStore`], which backs the tests.

pub mod accounts;
pub mod memory;
pub mod profiles;
pub mod submissions;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use threewords_core::{ProfileId, Username};

use crate::models::{Account, NewAccount, NewProfile, NewSubmission, Profile, WordSubmission};

pub use accounts::PgAccountRepository;
pub use memory::MemoryStore;
pub use profiles::PgProfileRepository;
pub use submissions::PgSubmissionRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in database is invalid or corrupted.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// Record not found.
    #[error("Not found")]
    NotFound,

    /// Unique constraint violation.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Map a unique violation to `Conflict`, keeping every other error as-is.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Profile storage.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Look up a profile by its normalized username.
    async fn find_profile(&self, username: &Username) -> Result<Option<Profile>, RepositoryError>;

    /// Insert a profile.
    ///
    /// Returns `RepositoryError::Conflict` if the username is already taken.
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, RepositoryError>;
}

/// Append-only word submission storage.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Append a submission and return the stored record.
    async fn create_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<WordSubmission, RepositoryError>;

    /// All submissions for a profile, newest first (ties broken by id, descending).
    async fn list_submissions(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<WordSubmission>, RepositoryError>;
}

/// Account storage for signed-in identities.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Look up an account by the identity provider's stable id.
    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, RepositoryError>;

    /// Insert an account.
    ///
    /// Returns `RepositoryError::Conflict` if the external id is already linked.
    async fn create_account(&self, account: NewAccount) -> Result<Account, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
