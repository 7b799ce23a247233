//! Core types for siteulation.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod slug;
pub mod username;

pub use id::{ProjectId, UserId};
pub use slug::{Slug, SlugError};
pub use username::{Username, UsernameError};
