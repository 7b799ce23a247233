//! Dual-mode persistence.
//!
//! Every durable read and write is expressed against
//! [`PersistenceAdapter`], which prefers the remote API and transparently
//! retries against the durable local record when the network is
//! unavailable. The backend seam is the [`RemoteApi`] trait so the
//! fallback decision stays an explicit, testable branch rather than
//! scattered catch blocks.

mod adapter;
mod local;
mod remote;
mod wire;

pub use adapter::PersistenceAdapter;
pub use local::{CacheError, CacheRecord, LocalStore};
pub use remote::ApiClient;

use secrecy::SecretString;
use thiserror::Error;

use siteulation_core::{ProjectId, Slug, Username};

use crate::models::{CurrentUser, PopularUser, Project, ProjectSummary, Version};

/// Errors from the remote backend.
///
/// `Unavailable` is the network-level case the adapter silently redirects
/// to the local backend. Every other variant is a well-formed application
/// response and propagates to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: the remote API could not be reached.
    #[error("remote api unreachable: {0}")]
    Unavailable(String),

    /// Invalid credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The operation was rejected for lack of ownership.
    #[error("forbidden")]
    Forbidden,

    /// The resource does not exist on the remote store.
    #[error("not found")]
    NotFound,

    /// A validation conflict, e.g. a slug or username already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other well-formed error response.
    #[error("unexpected response ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, possibly truncated.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this is a connectivity failure rather than an application
    /// response.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// The remote backend strategy.
///
/// [`ApiClient`] talks to the real API; tests substitute stubs. Methods
/// mirror the logical operations of the content store and session, not
/// HTTP endpoints.
#[allow(async_fn_in_trait)]
pub trait RemoteApi {
    /// Confirm the current session. `Ok(None)` means anonymous.
    async fn who_am_i(&self) -> Result<Option<CurrentUser>, ApiError>;

    /// Authenticate and start a session.
    async fn login(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<CurrentUser, ApiError>;

    /// Create an account and start a session.
    async fn signup(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<CurrentUser, ApiError>;

    /// End the current session.
    async fn logout(&self) -> Result<(), ApiError>;

    /// All projects, most viewed first.
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ApiError>;

    /// Users ranked by total views.
    async fn list_popular_users(&self) -> Result<Vec<PopularUser>, ApiError>;

    /// Projects owned by one user.
    async fn projects_of(&self, username: &Username) -> Result<Vec<ProjectSummary>, ApiError>;

    /// A project with its full version history.
    async fn fetch_project(&self, username: &Username, slug: &Slug) -> Result<Project, ApiError>;

    /// Create a project owned by the session user.
    async fn create_project(
        &self,
        title: &str,
        slug_hint: Option<&str>,
    ) -> Result<Project, ApiError>;

    /// Append a content snapshot to a project.
    async fn append_version(&self, project: ProjectId, content: &str)
    -> Result<Version, ApiError>;

    /// Pin a version, or clear the pin with `None`.
    async fn pin_version(&self, project: ProjectId, number: Option<u32>) -> Result<(), ApiError>;

    /// Fork a project into a copy owned by the session user.
    async fn remix(&self, project: ProjectId) -> Result<Project, ApiError>;

    /// Count a view.
    async fn record_view(&self, project: ProjectId) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_detection() {
        assert!(ApiError::Unavailable("refused".to_owned()).is_unavailable());
        assert!(!ApiError::NotFound.is_unavailable());
        assert!(
            !ApiError::Conflict("slug already in use".to_owned()).is_unavailable()
        );
    }
}
