//! In-memory store implementing every repository trait.
//!
//! Used by service tests and the integration test suite. A single lock guards
//! all tables and is held across each check-and-insert, so uniqueness holds
//! under concurrent claims the same way the database constraint does.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use threewords_core::{AccountId, ProfileId, SubmissionId, Username};

use super::{AccountRepository, ProfileRepository, RepositoryError, SubmissionRepository};
use crate::models::{Account, NewAccount, NewProfile, NewSubmission, Profile, WordSubmission};

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    submissions: Vec<WordSubmission>,
    accounts: Vec<Account>,
}

/// Process-local store for tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn profile_count(&self) -> usize {
        self.tables().profiles.len()
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.tables().accounts.len()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_id(len: usize) -> Result<i32, RepositoryError> {
    i32::try_from(len + 1)
        .map_err(|_| RepositoryError::DataCorruption("id sequence exhausted".to_string()))
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_profile(&self, username: &Username) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .tables()
            .profiles
            .iter()
            .find(|p| &p.username == username)
            .cloned())
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, RepositoryError> {
        let mut tables = self.tables();
        if tables.profiles.iter().any(|p| p.username == profile.username) {
            return Err(RepositoryError::Conflict("username already exists".to_string()));
        }

        let created = Profile {
            id: ProfileId::new(next_id(tables.profiles.len())?),
            username: profile.username,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            created_at: Utc::now(),
        };
        tables.profiles.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl SubmissionRepository for MemoryStore {
    async fn create_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<WordSubmission, RepositoryError> {
        let mut tables = self.tables();
        if !tables.profiles.iter().any(|p| p.id == submission.profile_id) {
            return Err(RepositoryError::NotFound);
        }

        // Keep timestamps monotonic so insertion order is never reversed.
        let created_at = tables
            .submissions
            .last()
            .map_or_else(Utc::now, |last| last.created_at.max(Utc::now()));

        let created = WordSubmission {
            id: SubmissionId::new(next_id(tables.submissions.len())?),
            profile_id: submission.profile_id,
            submitter_name: submission.submitter_name,
            word1: submission.word1,
            word2: submission.word2,
            word3: submission.word3,
            anonymous: submission.anonymous,
            created_at,
        };
        tables.submissions.push(created.clone());
        Ok(created)
    }

    async fn list_submissions(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<WordSubmission>, RepositoryError> {
        let mut rows: Vec<WordSubmission> = self
            .tables()
            .submissions
            .iter()
            .filter(|s| s.profile_id == profile_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .tables()
            .accounts
            .iter()
            .find(|a| a.external_id == external_id)
            .cloned())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut tables = self.tables();
        if tables
            .accounts
            .iter()
            .any(|a| a.external_id == account.external_id)
        {
            return Err(RepositoryError::Conflict("account already exists".to_string()));
        }

        let created = Account {
            id: AccountId::new(next_id(tables.accounts.len())?),
            external_id: account.external_id,
            username: account.username,
            display_name: account.display_name,
            avatar_url: account.avatar_url,
            created_at: Utc::now(),
        };
        tables.accounts.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_profile(name: &str) -> NewProfile {
        NewProfile {
            username: Username::parse(name).unwrap(),
            display_name: name.to_string(),
            avatar_url: None,
        }
    }

    fn new_submission(profile_id: ProfileId, word: &str) -> NewSubmission {
        NewSubmission {
            profile_id,
            submitter_name: None,
            word1: word.to_string(),
            word2: word.to_string(),
            word3: word.to_string(),
            anonymous: false,
        }
    }

    #[tokio::test]
    async fn test_create_profile_conflict() {
        let store = MemoryStore::new();
        store.create_profile(new_profile("alice")).await.unwrap();

        let result = store.create_profile(new_profile("ALICE")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_submission_requires_profile() {
        let store = MemoryStore::new();
        let result = store
            .create_submission(new_submission(ProfileId::new(42), "x"))
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_submissions_newest_first() {
        let store = MemoryStore::new();
        let alice = store.create_profile(new_profile("alice")).await.unwrap();
        let bob = store.create_profile(new_profile("bob")).await.unwrap();

        for word in ["one", "two", "three"] {
            store
                .create_submission(new_submission(alice.id, word))
                .await
                .unwrap();
        }
        store
            .create_submission(new_submission(bob.id, "other"))
            .await
            .unwrap();

        let words: Vec<String> = store
            .list_submissions(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.word1)
            .collect();
        assert_eq!(words, vec!["three", "two", "one"]);
    }

    #[tokio::test]
    async fn test_account_conflict_on_external_id() {
        let store = MemoryStore::new();
        let account = NewAccount {
            external_id: "g-1".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: None,
        };
        store.create_account(account.clone()).await.unwrap();

        let result = store.create_account(account).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert!(store.find_account("g-1").await.unwrap().is_some());
    }
}
