//! Identity error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during sign-in.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the exchange or returned something unusable.
    #[error("provider error: {0}")]
    Provider(String),

    /// Sign-in is not configured.
    #[error("sign-in is not configured")]
    NotConfigured,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
