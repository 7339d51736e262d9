//! Word submission flow.

use std::net::IpAddr;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use threewords_core::{SubmissionError, Username, validate_word_submission};

use crate::db::{ProfileRepository, RepositoryError, SubmissionRepository};
use crate::models::{NewSubmission, Profile, WordSubmission};
use crate::services::rate_limit::SubmissionLimiter;

/// Message returned when the submission limit is hit.
pub const RATE_LIMITED_MESSAGE: &str = "Too many submissions, please try again later";

/// Three words as sent by a visitor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordPayload {
    #[serde(default)]
    pub word1: String,
    #[serde(default)]
    pub word2: String,
    #[serde(default)]
    pub word3: String,
    #[serde(default)]
    pub submitter_name: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Errors from submitting or listing words.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    InvalidInput(#[from] SubmissionError),

    #[error("Too many submissions, please try again later")]
    RateLimited,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Submission and listing operations for a profile's words.
pub struct SubmissionService<'a> {
    profiles: &'a dyn ProfileRepository,
    submissions: &'a dyn SubmissionRepository,
    limiter: &'a dyn SubmissionLimiter,
}

impl<'a> SubmissionService<'a> {
    #[must_use]
    pub const fn new(
        profiles: &'a dyn ProfileRepository,
        submissions: &'a dyn SubmissionRepository,
        limiter: &'a dyn SubmissionLimiter,
    ) -> Self {
        Self {
            profiles,
            submissions,
            limiter,
        }
    }

    async fn find_profile(&self, candidate: &str) -> Result<Profile, SubmitError> {
        let Ok(username) = Username::parse(candidate) else {
            return Err(SubmitError::ProfileNotFound);
        };

        self.profiles
            .find_profile(&username)
            .await?
            .ok_or(SubmitError::ProfileNotFound)
    }

    /// Append three words to a profile.
    ///
    /// The payload is validated first, then the origin address is counted
    /// against the limiter, then the profile is looked up.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::InvalidInput` if a word or the name fails validation.
    /// Returns `SubmitError::RateLimited` if `origin` is over its limit.
    /// Returns `SubmitError::ProfileNotFound` if no profile has that username.
    #[instrument(skip(self, payload), fields(anonymous = payload.anonymous))]
    pub async fn submit_words(
        &self,
        username: &str,
        payload: WordPayload,
        origin: IpAddr,
    ) -> Result<WordSubmission, SubmitError> {
        validate_word_submission(
            &payload.word1,
            &payload.word2,
            &payload.word3,
            payload.submitter_name.as_deref(),
        )?;

        if !self.limiter.record(origin) {
            tracing::warn!(%origin, "Submission rate limited");
            return Err(SubmitError::RateLimited);
        }

        let profile = self.find_profile(username).await?;

        let submitter_name = if payload.anonymous {
            None
        } else {
            payload.submitter_name.filter(|name| !name.is_empty())
        };

        let submission = self
            .submissions
            .create_submission(NewSubmission {
                profile_id: profile.id,
                submitter_name,
                word1: payload.word1,
                word2: payload.word2,
                word3: payload.word3,
                anonymous: payload.anonymous,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => SubmitError::ProfileNotFound,
                other => SubmitError::Repository(other),
            })?;

        tracing::info!(
            submission_id = %submission.id,
            profile_id = %profile.id,
            "Words submitted"
        );
        Ok(submission)
    }

    /// A profile together with its full submission history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::ProfileNotFound` if no profile has that username.
    pub async fn profile_with_words(
        &self,
        username: &str,
    ) -> Result<(Profile, Vec<WordSubmission>), SubmitError> {
        let profile = self.find_profile(username).await?;
        let words = self.submissions.list_submissions(profile.id).await?;
        Ok((profile, words))
    }

    /// A profile's full submission history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::ProfileNotFound` if no profile has that username.
    pub async fn list_words(&self, username: &str) -> Result<Vec<WordSubmission>, SubmitError> {
        let (_, words) = self.profile_with_words(username).await?;
        Ok(words)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use threewords_core::WordPosition;

    use super::*;
    use crate::config::SubmissionLimitConfig;
    use crate::db::MemoryStore;
    use crate::services::profiles::ProfileService;
    use crate::services::rate_limit::SlidingWindowLimiter;

    fn payload(words: [&str; 3]) -> WordPayload {
        WordPayload {
            word1: words[0].to_string(),
            word2: words[1].to_string(),
            word3: words[2].to_string(),
            submitter_name: None,
            anonymous: false,
        }
    }

    fn origin(last: u8) -> IpAddr {
        IpAddr::from([192, 168, 1, last])
    }

    async fn setup() -> (MemoryStore, SlidingWindowLimiter) {
        let store = MemoryStore::new();
        ProfileService::new(&store)
            .claim_profile("alice")
            .await
            .unwrap();
        let limiter = SlidingWindowLimiter::new(SubmissionLimitConfig {
            max_attempts: 10,
            window: Duration::from_secs(900),
        });
        (store, limiter)
    }

    #[tokio::test]
    async fn test_anonymous_drops_submitter_name() {
        let (store, limiter) = setup().await;
        let service = SubmissionService::new(&store, &store, &limiter);

        let mut input = payload(["kind", "funny", "loud"]);
        input.submitter_name = Some("Bob".to_string());
        input.anonymous = true;

        let submission = service.submit_words("alice", input, origin(1)).await.unwrap();
        assert!(submission.anonymous);
        assert_eq!(submission.submitter_name, None);
    }

    #[tokio::test]
    async fn test_empty_submitter_name_is_absent() {
        let (store, limiter) = setup().await;
        let service = SubmissionService::new(&store, &store, &limiter);

        let mut input = payload(["a", "b", "c"]);
        input.submitter_name = Some(String::new());

        let submission = service.submit_words("alice", input, origin(1)).await.unwrap();
        assert_eq!(submission.submitter_name, None);
    }

    #[tokio::test]
    async fn test_invalid_payload_rejected_before_limiter() {
        let (store, limiter) = setup().await;
        let service = SubmissionService::new(&store, &store, &limiter);

        for _ in 0..20 {
            let err = service
                .submit_words("alice", payload(["ok", "", "ok"]), origin(1))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                SubmitError::InvalidInput(SubmissionError::MissingWord {
                    position: WordPosition::Second
                })
            ));
        }

        // Invalid attempts never reached the limiter.
        service
            .submit_words("alice", payload(["a", "b", "c"]), origin(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_eleventh_submission_rate_limited() {
        let (store, limiter) = setup().await;
        let service = SubmissionService::new(&store, &store, &limiter);

        for _ in 0..10 {
            service
                .submit_words("alice", payload(["a", "b", "c"]), origin(1))
                .await
                .unwrap();
        }
        let err = service
            .submit_words("alice", payload(["a", "b", "c"]), origin(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::RateLimited));
        assert_eq!(err.to_string(), RATE_LIMITED_MESSAGE);

        assert_eq!(service.list_words("alice").await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_rate_limit_checked_before_profile_lookup() {
        let (store, limiter) = setup().await;
        let service = SubmissionService::new(&store, &store, &limiter);

        for _ in 0..10 {
            let err = service
                .submit_words("ghost", payload(["a", "b", "c"]), origin(2))
                .await
                .unwrap_err();
            assert!(matches!(err, SubmitError::ProfileNotFound));
        }
        let err = service
            .submit_words("ghost", payload(["a", "b", "c"]), origin(2))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::RateLimited));
    }

    #[tokio::test]
    async fn test_invalid_username_is_not_found() {
        let (store, limiter) = setup().await;
        let service = SubmissionService::new(&store, &store, &limiter);

        let err = service
            .submit_words("no", payload(["a", "b", "c"]), origin(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::ProfileNotFound));
        assert!(matches!(
            service.list_words("no").await,
            Err(SubmitError::ProfileNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_words_newest_first() {
        let (store, limiter) = setup().await;
        let service = SubmissionService::new(&store, &store, &limiter);

        for word in ["first", "second", "third"] {
            service
                .submit_words("ALICE", payload([word, "x", "y"]), origin(1))
                .await
                .unwrap();
        }

        let words: Vec<String> = service
            .list_words("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.word1)
            .collect();
        assert_eq!(words, vec!["third", "second", "first"]);
    }
}
