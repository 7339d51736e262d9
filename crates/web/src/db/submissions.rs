//! Word submission repository backed by `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;

use threewords_core::ProfileId;

use super::{RepositoryError, SubmissionRepository};
use crate::models::{NewSubmission, WordSubmission};

/// `PostgreSQL` implementation of [`SubmissionRepository`].
#[derive(Clone)]
pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    async fn create_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<WordSubmission, RepositoryError> {
        let row = sqlx::query_as::<_, WordSubmission>(
            r"
            INSERT INTO word_submissions
                (profile_id, submitter_name, word1, word2, word3, anonymous)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, profile_id, submitter_name, word1, word2, word3,
                      anonymous, created_at
            ",
        )
        .bind(submission.profile_id)
        .bind(&submission.submitter_name)
        .bind(&submission.word1)
        .bind(&submission.word2)
        .bind(&submission.word3)
        .bind(submission.anonymous)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The profile vanished between lookup and insert.
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(row)
    }

    async fn list_submissions(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<WordSubmission>, RepositoryError> {
        let rows = sqlx::query_as::<_, WordSubmission>(
            r"
            SELECT id, profile_id, submitter_name, word1, word2, word3,
                   anonymous, created_at
            FROM word_submissions
            WHERE profile_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
