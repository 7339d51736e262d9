//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ThreeWordsConfig;
use crate::db::{
    AccountRepository, MemoryStore, PgAccountRepository, PgProfileRepository,
    PgSubmissionRepository, ProfileRepository, SubmissionRepository,
};
use crate::services::identity::{GoogleIdentityProvider, IdentityProvider};
use crate::services::rate_limit::{SlidingWindowLimiter, SubmissionLimiter};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repositories, the submission limiter and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ThreeWordsConfig,
    pool: Option<PgPool>,
    profiles: Arc<dyn ProfileRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    accounts: Arc<dyn AccountRepository>,
    limiter: Arc<dyn SubmissionLimiter>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

/// Builder for [`AppState`] with pluggable storage and identity.
pub struct AppStateBuilder {
    config: ThreeWordsConfig,
    pool: Option<PgPool>,
    profiles: Arc<dyn ProfileRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    accounts: Arc<dyn AccountRepository>,
    limiter: Arc<dyn SubmissionLimiter>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    /// Create the production state backed by `PostgreSQL`.
    ///
    /// Google sign-in is enabled when its credentials are configured.
    #[must_use]
    pub fn new(config: ThreeWordsConfig, pool: PgPool) -> Self {
        let identity = config.google.clone().map(|google| {
            Arc::new(GoogleIdentityProvider::new(google)) as Arc<dyn IdentityProvider>
        });

        let mut builder = Self::builder(config)
            .profiles(Arc::new(PgProfileRepository::new(pool.clone())))
            .submissions(Arc::new(PgSubmissionRepository::new(pool.clone())))
            .accounts(Arc::new(PgAccountRepository::new(pool.clone())));
        builder.pool = Some(pool);
        builder.identity = identity;
        builder.build()
    }

    /// Start building a state. Defaults to a fresh in-memory store, the
    /// configured submission limit and no identity provider.
    #[must_use]
    pub fn builder(config: ThreeWordsConfig) -> AppStateBuilder {
        let store = Arc::new(MemoryStore::new());
        let limiter = Arc::new(SlidingWindowLimiter::new(config.submission_limit));

        AppStateBuilder {
            config,
            pool: None,
            profiles: store.clone(),
            submissions: store.clone(),
            accounts: store,
            limiter,
            identity: None,
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ThreeWordsConfig {
        &self.inner.config
    }

    /// Get the database pool, if running against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn profiles(&self) -> &dyn ProfileRepository {
        self.inner.profiles.as_ref()
    }

    #[must_use]
    pub fn submissions(&self) -> &dyn SubmissionRepository {
        self.inner.submissions.as_ref()
    }

    #[must_use]
    pub fn accounts(&self) -> &dyn AccountRepository {
        self.inner.accounts.as_ref()
    }

    /// Get the submission rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &dyn SubmissionLimiter {
        self.inner.limiter.as_ref()
    }

    /// Shared handle to the limiter, for background pruning.
    #[must_use]
    pub fn limiter_handle(&self) -> Arc<dyn SubmissionLimiter> {
        Arc::clone(&self.inner.limiter)
    }

    /// Get the identity provider, if sign-in is enabled.
    #[must_use]
    pub fn identity(&self) -> Option<&dyn IdentityProvider> {
        self.inner.identity.as_deref()
    }
}

impl AppStateBuilder {
    /// Use a single in-memory store for every repository.
    #[must_use]
    pub fn memory_store(self, store: Arc<MemoryStore>) -> Self {
        self.profiles(store.clone())
            .submissions(store.clone())
            .accounts(store)
    }

    #[must_use]
    pub fn profiles(mut self, profiles: Arc<dyn ProfileRepository>) -> Self {
        self.profiles = profiles;
        self
    }

    #[must_use]
    pub fn submissions(mut self, submissions: Arc<dyn SubmissionRepository>) -> Self {
        self.submissions = submissions;
        self
    }

    #[must_use]
    pub fn accounts(mut self, accounts: Arc<dyn AccountRepository>) -> Self {
        self.accounts = accounts;
        self
    }

    #[must_use]
    pub fn limiter(mut self, limiter: Arc<dyn SubmissionLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn build(self) -> AppState {
        AppState {
            inner: Arc::new(AppStateInner {
                config: self.config,
                pool: self.pool,
                profiles: self.profiles,
                submissions: self.submissions,
                accounts: self.accounts,
                limiter: self.limiter,
                identity: self.identity,
            }),
        }
    }
}
