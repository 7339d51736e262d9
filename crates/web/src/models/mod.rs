//! Domain models for Three Words.

pub mod account;
pub mod profile;
pub mod session;
pub mod submission;

pub use account::{Account, NewAccount};
pub use profile::{NewProfile, Profile};
pub use session::{CurrentAccount, keys as session_keys};
pub use submission::{NewSubmission, WordSubmission};
