//! Word submission model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use threewords_core::{ProfileId, SubmissionId, ThreeWords};

/// Three words someone left on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WordSubmission {
    pub id: SubmissionId,
    pub profile_id: ProfileId,
    pub submitter_name: Option<String>,
    pub word1: String,
    pub word2: String,
    pub word3: String,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl WordSubmission {
    /// Name shown next to the submission in the recent list.
    #[must_use]
    pub fn attribution(&self) -> &str {
        if self.anonymous {
            return "Anonymous";
        }
        self.submitter_name.as_deref().unwrap_or("Someone")
    }
}

impl ThreeWords for WordSubmission {
    fn words(&self) -> [&str; 3] {
        [&self.word1, &self.word2, &self.word3]
    }
}

/// Data required to append a submission.
///
/// `submitter_name` must already be cleared for anonymous submissions.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub profile_id: ProfileId,
    pub submitter_name: Option<String>,
    pub word1: String,
    pub word2: String,
    pub word3: String,
    pub anonymous: bool,
}
