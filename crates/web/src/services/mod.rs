//! Business logic services for Three Words.
//!
//! # Services
//!
//! - `profiles` - Username availability, profile claim and lookup
//! - `submissions` - Rate-limited word submission and history
//! - `rate_limit` - Sliding-window limiter for the submission path
//! - `identity` - OAuth sign-in and account linkage

pub mod identity;
pub mod profiles;
pub mod rate_limit;
pub mod submissions;
