//! Profile claim flow.
//!
//! A username is checked for availability, then claimed. The availability
//! check is advisory; the store's uniqueness constraint decides races.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use threewords_core::{Username, UsernameError, placeholder_avatar_url};

use crate::db::{ProfileRepository, RepositoryError};
use crate::models::{NewProfile, Profile};

/// Message returned when a valid username is free.
pub const AVAILABLE_MESSAGE: &str = "Username is available!";

/// Message returned when a username is already claimed.
pub const TAKEN_MESSAGE: &str = "Username is already taken";

/// Result of an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    pub message: String,
}

impl Availability {
    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
        }
    }
}

/// Errors from claiming a profile.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error(transparent)]
    InvalidUsername(#[from] UsernameError),

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Errors from looking up a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found")]
    NotFound,

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Profile claim and lookup operations.
pub struct ProfileService<'a> {
    profiles: &'a dyn ProfileRepository,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(profiles: &'a dyn ProfileRepository) -> Self {
        Self { profiles }
    }

    /// Report whether `candidate` could be claimed right now.
    ///
    /// Invalid candidates come back unavailable with the validation message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    #[instrument(skip(self))]
    pub async fn check_username_availability(
        &self,
        candidate: &str,
    ) -> Result<Availability, RepositoryError> {
        let username = match Username::parse(candidate) {
            Ok(username) => username,
            Err(e) => return Ok(Availability::unavailable(e.to_string())),
        };

        if self.profiles.find_profile(&username).await?.is_some() {
            return Ok(Availability::unavailable(TAKEN_MESSAGE));
        }

        Ok(Availability {
            available: true,
            message: AVAILABLE_MESSAGE.to_string(),
        })
    }

    /// Claim `candidate` as a new profile.
    ///
    /// The display name defaults to the candidate as typed, and the avatar to
    /// a placeholder seeded by it.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidUsername` if validation fails.
    /// Returns `ClaimError::UsernameTaken` if the normalized name already exists,
    /// including when a concurrent claim wins the insert.
    #[instrument(skip(self))]
    pub async fn claim_profile(&self, candidate: &str) -> Result<Profile, ClaimError> {
        let username = Username::parse(candidate)?;

        if self.profiles.find_profile(&username).await?.is_some() {
            return Err(ClaimError::UsernameTaken);
        }

        let profile = self
            .profiles
            .create_profile(NewProfile {
                username,
                display_name: candidate.to_string(),
                avatar_url: Some(placeholder_avatar_url(candidate)),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ClaimError::UsernameTaken,
                other => ClaimError::Repository(other),
            })?;

        tracing::info!(profile_id = %profile.id, username = %profile.username, "Profile claimed");
        Ok(profile)
    }

    /// Fetch a profile by username.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if the username is invalid or unclaimed.
    pub async fn get_profile(&self, candidate: &str) -> Result<Profile, ProfileError> {
        let Ok(username) = Username::parse(candidate) else {
            return Err(ProfileError::NotFound);
        };

        self.profiles
            .find_profile(&username)
            .await?
            .ok_or(ProfileError::NotFound)
    }
}
