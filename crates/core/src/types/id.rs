//! Entity IDs.
//!
//! A profile ID cannot be passed where a submission ID is expected.

/// Declares an `i32`-backed ID newtype.
///
/// Keys are Postgres `SERIAL` columns. Each generated type serializes as a
/// bare number, displays as one, and (with the `postgres` feature) binds and
/// decodes as `INTEGER` through sqlx's transparent derive.
///
/// ```rust
/// # use threewords_core::define_id;
/// define_id!(WidgetId);
///
/// let id = WidgetId::new(3);
/// assert_eq!(id.as_i32(), 3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::convert::From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self::new(raw)
            }
        }

        impl ::core::convert::From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.as_i32()
            }
        }
    };
}

define_id!(ProfileId);
define_id!(SubmissionId);
define_id!(AccountId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_i32() {
        let id = ProfileId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(ProfileId::from(42), id);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&SubmissionId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_id_ordering() {
        assert!(SubmissionId::new(1) < SubmissionId::new(2));
    }
}
