//! Core types for Three Words.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod username;
pub mod words;

pub use id::*;
pub use username::{Username, UsernameError, placeholder_avatar_url};
pub use words::{
    MAX_SUBMITTER_NAME_LENGTH, MAX_WORD_LENGTH, SubmissionError, WordPosition,
    validate_word_submission,
};
