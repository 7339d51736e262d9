//! Signed-in account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use threewords_core::AccountId;

/// An account linked to an external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    /// Stable identifier issued by the identity provider.
    #[serde(skip)]
    pub external_id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to insert an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub external_id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
