//! OAuth sign-in and account linkage.
//!
//! # Flow
//!
//! 1. Build the provider's login URL with `authorization_url()`
//! 2. The provider redirects back with an authorization code
//! 3. `exchange_code()` turns the code into an [`ExternalIdentity`]
//! 4. [`AccountService::sign_in`] links that identity to an [`Account`],
//!    creating it on first sign-in

mod error;
mod google;

pub use error::IdentityError;
pub use google::GoogleIdentityProvider;

use async_trait::async_trait;
use tracing::instrument;

use threewords_core::placeholder_avatar_url;

use crate::db::{AccountRepository, RepositoryError};
use crate::models::{Account, NewAccount};

/// Identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Stable subject identifier.
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// An OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to send the browser to for sign-in.
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Exchange an authorization code for the signed-in identity.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExternalIdentity, IdentityError>;
}

/// Links external identities to local accounts.
pub struct AccountService<'a> {
    accounts: &'a dyn AccountRepository,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountRepository) -> Self {
        Self { accounts }
    }

    /// Find or create the account for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Repository` if the store fails.
    #[instrument(skip(self, identity), fields(external_id = %identity.external_id))]
    pub async fn sign_in(&self, identity: ExternalIdentity) -> Result<Account, IdentityError> {
        if let Some(account) = self.accounts.find_account(&identity.external_id).await? {
            return Ok(account);
        }

        let new_account = new_account_for(identity);
        let external_id = new_account.external_id.clone();

        match self.accounts.create_account(new_account).await {
            Ok(account) => {
                tracing::info!(account_id = %account.id, "Account created on first sign-in");
                Ok(account)
            }
            // A concurrent sign-in created it first.
            Err(RepositoryError::Conflict(_)) => self
                .accounts
                .find_account(&external_id)
                .await?
                .ok_or(IdentityError::Repository(RepositoryError::NotFound)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Derive a new account from a provider identity.
fn new_account_for(identity: ExternalIdentity) -> NewAccount {
    let username = identity
        .email
        .as_deref()
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
        .map_or_else(|| format!("user{}", identity.external_id), String::from);

    let avatar_url = identity
        .avatar_url
        .unwrap_or_else(|| placeholder_avatar_url(&identity.external_id));

    NewAccount {
        external_id: identity.external_id,
        username,
        display_name: identity.display_name,
        avatar_url: Some(avatar_url),
    }
}
