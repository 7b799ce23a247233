//! Content store error types.

use thiserror::Error;

use siteulation_core::{Slug, UsernameError};

/// Errors that can occur during content store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The owner already has a project with this slug.
    #[error("slug already in use: {0}")]
    SlugConflict(Slug),

    /// No version with this number exists on the project.
    #[error("version {0} not found")]
    VersionNotFound(u32),

    /// Project not found.
    #[error("project not found")]
    ProjectNotFound,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Username already taken.
    #[error("username already taken")]
    UsernameTaken,

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Invalid credentials (wrong password or unknown user).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A mutation targeted a project owned by someone else.
    #[error("only the owner may modify this project")]
    Forbidden,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The token balance cannot cover the debit.
    #[error("not enough tokens")]
    InsufficientTokens,

    /// Password hashing error.
    #[error("credential hashing error")]
    CredentialHash,
}
