//! External collaborator boundaries.
//!
//! Opaque services the core consumes but does not implement: only their
//! success/failure shapes matter here.

pub mod generate;

pub use generate::{Generated, GenerateError, Generator};
