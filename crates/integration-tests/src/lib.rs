//! Test support for the siteulation scenario tests.
//!
//! Stub remote backends and constructors for hermetic apps backed by a
//! temporary cache file. The stubs exercise the adapter's fallback
//! branches without any network.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;

use siteulation_client::App;
use siteulation_client::config::ClientConfig;
use siteulation_client::models::{CurrentUser, PopularUser, Project, ProjectSummary, Version};
use siteulation_client::persist::{ApiError, RemoteApi};
use siteulation_core::{ProjectId, Slug, Username};

fn unreachable_api<T>() -> Result<T, ApiError> {
    Err(ApiError::Unavailable("connection refused".to_owned()))
}

/// A remote backend that is never reachable. Every call fails at the
/// transport level, driving the adapter onto the local record.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineApi;

impl RemoteApi for OfflineApi {
    async fn who_am_i(&self) -> Result<Option<CurrentUser>, ApiError> {
        unreachable_api()
    }

    async fn login(
        &self,
        _username: &Username,
        _password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        unreachable_api()
    }

    async fn signup(
        &self,
        _username: &Username,
        _password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        unreachable_api()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        unreachable_api()
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ApiError> {
        unreachable_api()
    }

    async fn list_popular_users(&self) -> Result<Vec<PopularUser>, ApiError> {
        unreachable_api()
    }

    async fn projects_of(&self, _username: &Username) -> Result<Vec<ProjectSummary>, ApiError> {
        unreachable_api()
    }

    async fn fetch_project(
        &self,
        _username: &Username,
        _slug: &Slug,
    ) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn create_project(
        &self,
        _title: &str,
        _slug_hint: Option<&str>,
    ) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn append_version(
        &self,
        _project: ProjectId,
        _content: &str,
    ) -> Result<Version, ApiError> {
        unreachable_api()
    }

    async fn pin_version(&self, _project: ProjectId, _number: Option<u32>) -> Result<(), ApiError> {
        unreachable_api()
    }

    async fn remix(&self, _project: ProjectId) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn record_view(&self, _project: ProjectId) -> Result<(), ApiError> {
        unreachable_api()
    }
}

/// A reachable identity service with a scripted `who_am_i` answer.
/// Everything unrelated to sessions stays unreachable.
#[derive(Debug, Clone, Default)]
pub struct IdentityApi {
    /// The identity the service reports; `None` means anonymous.
    pub answer: Option<CurrentUser>,
}

impl RemoteApi for IdentityApi {
    async fn who_am_i(&self) -> Result<Option<CurrentUser>, ApiError> {
        Ok(self.answer.clone())
    }

    async fn login(
        &self,
        _username: &Username,
        _password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        self.answer.clone().ok_or(ApiError::InvalidCredentials)
    }

    async fn signup(
        &self,
        _username: &Username,
        _password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        self.answer.clone().ok_or(ApiError::InvalidCredentials)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ApiError> {
        unreachable_api()
    }

    async fn list_popular_users(&self) -> Result<Vec<PopularUser>, ApiError> {
        unreachable_api()
    }

    async fn projects_of(&self, _username: &Username) -> Result<Vec<ProjectSummary>, ApiError> {
        unreachable_api()
    }

    async fn fetch_project(
        &self,
        _username: &Username,
        _slug: &Slug,
    ) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn create_project(
        &self,
        _title: &str,
        _slug_hint: Option<&str>,
    ) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn append_version(
        &self,
        _project: ProjectId,
        _content: &str,
    ) -> Result<Version, ApiError> {
        unreachable_api()
    }

    async fn pin_version(&self, _project: ProjectId, _number: Option<u32>) -> Result<(), ApiError> {
        unreachable_api()
    }

    async fn remix(&self, _project: ProjectId) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn record_view(&self, _project: ProjectId) -> Result<(), ApiError> {
        unreachable_api()
    }
}

/// A backend whose listing reads return empty after a delay: slow enough
/// for a later navigation to supersede the first, and empty so the home
/// screen then consults the local record.
#[derive(Debug, Clone, Copy)]
pub struct SlowApi {
    /// Delay applied to listing reads.
    pub delay: Duration,
}

impl RemoteApi for SlowApi {
    async fn who_am_i(&self) -> Result<Option<CurrentUser>, ApiError> {
        Ok(None)
    }

    async fn login(
        &self,
        _username: &Username,
        _password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        unreachable_api()
    }

    async fn signup(
        &self,
        _username: &Username,
        _password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        unreachable_api()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn list_popular_users(&self) -> Result<Vec<PopularUser>, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn projects_of(&self, _username: &Username) -> Result<Vec<ProjectSummary>, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn fetch_project(
        &self,
        _username: &Username,
        _slug: &Slug,
    ) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn create_project(
        &self,
        _title: &str,
        _slug_hint: Option<&str>,
    ) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn append_version(
        &self,
        _project: ProjectId,
        _content: &str,
    ) -> Result<Version, ApiError> {
        unreachable_api()
    }

    async fn pin_version(&self, _project: ProjectId, _number: Option<u32>) -> Result<(), ApiError> {
        unreachable_api()
    }

    async fn remix(&self, _project: ProjectId) -> Result<Project, ApiError> {
        unreachable_api()
    }

    async fn record_view(&self, _project: ProjectId) -> Result<(), ApiError> {
        unreachable_api()
    }
}

/// Configuration pointing at an unroutable API with the cache record in
/// `dir`.
///
/// # Panics
///
/// Panics if the static base URL fails to parse, which cannot happen.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config(dir: &Path) -> ClientConfig {
    ClientConfig::new("http://127.0.0.1:9", dir.join("cache.json")).unwrap()
}

/// An app over [`OfflineApi`] with its cache in `dir`.
///
/// # Panics
///
/// Panics if construction fails, which in tests should be fatal.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn offline_app(dir: &Path) -> App<OfflineApi> {
    App::new(test_config(dir), OfflineApi).unwrap()
}

/// Sign up a user on an offline app, returning the session identity.
///
/// # Panics
///
/// Panics if signup fails.
#[allow(clippy::unwrap_used)]
pub async fn offline_signup(app: &App<OfflineApi>, username: &str) -> CurrentUser {
    app.signup(username, &SecretString::from("hunter22".to_owned()))
        .await
        .unwrap()
}
