//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All JSON route handlers return `Result<T, AppError>`.
//!
//! Client-facing bodies are plain text.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::identity::IdentityError;
use crate::services::profiles::{ClaimError, ProfileError};
use crate::services::submissions::{RATE_LIMITED_MESSAGE, SubmitError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Identity provider operation failed.
    #[error("Identity error: {0}")]
    Identity(IdentityError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
            _ => "Invalid request body",
        };
        Self::BadRequest(message.to_string())
    }
}

impl From<ClaimError> for AppError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::InvalidUsername(e) => Self::BadRequest(e.to_string()),
            ClaimError::UsernameTaken => Self::BadRequest(err.to_string()),
            ClaimError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound => Self::NotFound(err.to_string()),
            ProfileError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::InvalidInput(e) => Self::BadRequest(e.to_string()),
            SubmitError::RateLimited => Self::RateLimited,
            SubmitError::ProfileNotFound => Self::NotFound(err.to_string()),
            SubmitError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Repository(e) => Self::Database(e),
            IdentityError::NotConfigured => Self::NotFound("Sign-in is not configured".to_string()),
            other => Self::Identity(other),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        // Don't expose internal error details to clients
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Identity(_) => "Sign-in failed".to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
        }
    }

    /// Log and capture server-side failures.
    pub(crate) fn report(&self) {
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Identity(_)
        ) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), self.client_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for a signed-in account.
pub fn set_sentry_user(account_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the account.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
