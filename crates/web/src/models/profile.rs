//! Profile model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use threewords_core::{ProfileId, Username};

/// A claimed public profile.
///
/// Profiles are created once through the claim flow and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub username: Username,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// The avatar to show, falling back to a placeholder seeded by the username.
    #[must_use]
    pub fn avatar(&self) -> String {
        self.avatar_url
            .clone()
            .unwrap_or_else(|| self.username.placeholder_avatar_url())
    }
}

/// Data required to insert a profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: Username,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
