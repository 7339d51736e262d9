//! Profile username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Base URL of the placeholder avatar service.
const PLACEHOLDER_AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// Errors that can occur when parsing a [`Username`].
///
/// The `Display` output is the message shown to the person choosing a name.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    /// Fewer than [`Username::MIN_LENGTH`] characters.
    #[error("Username must be at least 3 characters")]
    TooShort,
    /// More than [`Username::MAX_LENGTH`] characters.
    #[error("Username must be less than 30 characters")]
    TooLong,
    /// Contains a character outside `[a-zA-Z0-9_-]`.
    #[error("Only letters, numbers, underscores and dashes are allowed")]
    InvalidCharacters,
}

/// A normalized profile username.
///
/// Usernames are the uniqueness key for profiles. The stored form is always
/// lowercase, so two candidates that differ only in case collide.
///
/// ## Constraints
///
/// - Length: 3-30 characters
/// - Characters: ASCII letters, digits, `_` and `-`
///
/// ## Examples
///
/// ```
/// use threewords_core::{Username, UsernameError};
///
/// let name = Username::parse("Alice_99").unwrap();
/// assert_eq!(name.as_str(), "alice_99");
///
/// assert_eq!(Username::parse("ab"), Err(UsernameError::TooShort));
/// assert_eq!(Username::parse("bad name"), Err(UsernameError::InvalidCharacters));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 3;

    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 30;

    /// Validate a candidate and return its lowercase-folded form.
    ///
    /// Checks run in order: too short, too long, invalid characters.
    ///
    /// # Errors
    ///
    /// Returns the first [`UsernameError`] the candidate fails.
    pub fn parse(candidate: &str) -> Result<Self, UsernameError> {
        let length = candidate.chars().count();

        if length < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort);
        }

        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong);
        }

        if !candidate.chars().all(is_username_char) {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(candidate.to_ascii_lowercase()))
    }

    /// Returns the normalized username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Placeholder avatar seeded by this username.
    #[must_use]
    pub fn placeholder_avatar_url(&self) -> String {
        placeholder_avatar_url(&self.0)
    }
}

/// Deterministic placeholder avatar URL for `seed`.
///
/// Seeds are usernames or provider account IDs, both URL-safe.
#[must_use]
pub fn placeholder_avatar_url(seed: &str) -> String {
    format!("{PLACEHOLDER_AVATAR_BASE}?seed={seed}")
}

const fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Username {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Username {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
