//! Siteulation Core - Shared types library.
//!
//! This crate provides common types used across all siteulation components:
//! - `client` - Single-page client core (routing, sessions, persistence)
//! - `cli` - Command-line tools for cache seeding and inspection
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! storage access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, and slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
