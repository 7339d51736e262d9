//! Three Words Core - Shared types and the word-cloud engine.
//!
//! This crate provides the pieces of Three Words that do no I/O:
//! - validated newtypes (`Username`, entity IDs)
//! - word submission validation
//! - the word-cloud aggregation and ranking engine
//!
//! The `web` crate owns storage, HTTP and identity. Keeping this crate free of
//! I/O lets it be tested exhaustively with plain unit tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and validation
//! - [`word_cloud`] - Frequency ranking and size buckets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod word_cloud;

pub use types::*;
pub use word_cloud::{CloudEntry, ThreeWords, build_word_cloud};
