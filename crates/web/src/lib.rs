//! Three Words web server library.
//!
//! This crate provides the server as a library, allowing the router to be
//! driven end-to-end from tests against the in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
