//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use threewords_core::AccountId;

use super::Account;

/// Session-stored account identity.
///
/// This is also the body of `GET /api/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAccount {
    pub id: AccountId,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&Account> for CurrentAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            avatar_url: account.avatar_url.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in account.
    pub const CURRENT_ACCOUNT: &str = "current_account";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";
}
