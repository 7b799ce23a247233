//! Remote API client.
//!
//! JSON over HTTP with a cookie-backed session, mirroring the endpoints of
//! the siteulation server. Public listing reads are cached briefly with
//! `moka`; everything mutable goes straight through.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use secrecy::{ExposeSecret, SecretString};
use siteulation_core::{ProjectId, Slug, Username};

use crate::config::ClientConfig;
use crate::models::{CurrentUser, PopularUser, Project, ProjectSummary, Version};
use crate::services::{Generated, GenerateError, Generator};

use super::wire;
use super::{ApiError, RemoteApi};

/// Listing cache TTL.
const LISTING_TTL: Duration = Duration::from_secs(60);

/// Listing cache capacity; there are only a handful of listing keys.
const LISTING_CAPACITY: u64 = 16;

#[derive(Clone)]
enum CacheValue {
    Projects(Vec<ProjectSummary>),
    PopularUsers(Vec<PopularUser>),
}

/// Client for the siteulation remote API.
///
/// Cheaply cloneable; the session cookie jar is shared across clones.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    listings: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        let listings = Cache::builder()
            .max_capacity(LISTING_CAPACITY)
            .time_to_live(LISTING_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base.clone(),
                listings,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .header("Accept", "application/json")
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// POST that only cares about success, tolerating an empty body.
    async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut request = self.inner.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await?;
        Err(status_error(status, &text))
    }
}

/// Interpret a response body, mapping error statuses onto the typed
/// taxonomy.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status, &text));
    }

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse api response"
        );
        ApiError::Parse(e)
    })
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<wire::ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED => ApiError::InvalidCredentials,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::CONFLICT => ApiError::Conflict(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

impl RemoteApi for ApiClient {
    #[instrument(skip(self))]
    async fn who_am_i(&self) -> Result<Option<CurrentUser>, ApiError> {
        let response: wire::MeResponse = self.get_json("/api/me").await?;
        Ok(response.user.map(CurrentUser::from))
    }

    #[instrument(skip(self, password), fields(username = %username))]
    async fn login(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        let body = wire::Credentials {
            username: username.as_str(),
            password: password.expose_secret(),
        };
        let response: wire::AuthResponse = self.post_json("/api/login", &body).await?;
        Ok(response.user.into())
    }

    #[instrument(skip(self, password), fields(username = %username))]
    async fn signup(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        let body = wire::Credentials {
            username: username.as_str(),
            password: password.expose_secret(),
        };
        let response: wire::AuthResponse = self.post_json("/api/signup", &body).await?;
        Ok(response.user.into())
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), ApiError> {
        self.post_unit::<()>("/api/logout", None).await
    }

    #[instrument(skip(self))]
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ApiError> {
        if let Some(CacheValue::Projects(rows)) = self.inner.listings.get("projects").await {
            debug!("cache hit for project listing");
            return Ok(rows);
        }

        let response: wire::ProjectsResponse = self.get_json("/api/projects").await?;
        let rows: Vec<ProjectSummary> = response
            .projects
            .into_iter()
            .map(ProjectSummary::from)
            .collect();

        // An empty listing is not cached: it would pin the local fallback
        // path for the TTL even after the server fills up.
        if !rows.is_empty() {
            self.inner
                .listings
                .insert("projects".to_owned(), CacheValue::Projects(rows.clone()))
                .await;
        }

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn list_popular_users(&self) -> Result<Vec<PopularUser>, ApiError> {
        if let Some(CacheValue::PopularUsers(rows)) = self.inner.listings.get("popular").await {
            debug!("cache hit for popular users");
            return Ok(rows);
        }

        let response: wire::PopularResponse = self.get_json("/api/popular-users").await?;
        let rows: Vec<PopularUser> = response.users.into_iter().map(PopularUser::from).collect();

        if !rows.is_empty() {
            self.inner
                .listings
                .insert("popular".to_owned(), CacheValue::PopularUsers(rows.clone()))
                .await;
        }

        Ok(rows)
    }

    #[instrument(skip(self), fields(username = %username))]
    async fn projects_of(&self, username: &Username) -> Result<Vec<ProjectSummary>, ApiError> {
        let response: wire::ProjectsResponse = self
            .get_json(&format!("/api/users/{username}/projects"))
            .await?;
        Ok(response
            .projects
            .into_iter()
            .map(ProjectSummary::from)
            .collect())
    }

    #[instrument(skip(self), fields(username = %username, slug = %slug))]
    async fn fetch_project(&self, username: &Username, slug: &Slug) -> Result<Project, ApiError> {
        let response: wire::ProjectResponse =
            self.get_json(&format!("/api/@{username}/{slug}")).await?;
        Ok(response.into())
    }

    #[instrument(skip(self))]
    async fn create_project(
        &self,
        title: &str,
        slug_hint: Option<&str>,
    ) -> Result<Project, ApiError> {
        let body = wire::CreateProjectBody {
            title,
            slug: slug_hint,
        };
        let response: wire::ProjectResponse = self.post_json("/api/projects", &body).await?;
        self.inner.listings.invalidate("projects").await;
        Ok(response.into())
    }

    #[instrument(skip(self, content), fields(project = %project))]
    async fn append_version(
        &self,
        project: ProjectId,
        content: &str,
    ) -> Result<Version, ApiError> {
        let body = wire::AppendVersionBody { content };
        let response: wire::VersionBody = self
            .post_json(&format!("/api/projects/{project}/versions"), &body)
            .await?;
        Ok(response.into())
    }

    #[instrument(skip(self), fields(project = %project))]
    async fn pin_version(&self, project: ProjectId, number: Option<u32>) -> Result<(), ApiError> {
        let body = wire::PinBody { version: number };
        self.post_unit(&format!("/api/projects/{project}/pin"), Some(&body))
            .await
    }

    #[instrument(skip(self), fields(project = %project))]
    async fn remix(&self, project: ProjectId) -> Result<Project, ApiError> {
        let response: wire::ProjectResponse = self
            .post_json(&format!("/api/projects/{project}/remix"), &())
            .await?;
        Ok(response.into())
    }

    #[instrument(skip(self), fields(project = %project))]
    async fn record_view(&self, project: ProjectId) -> Result<(), ApiError> {
        self.post_unit::<()>(&format!("/api/projects/{project}/view"), None)
            .await
    }
}

impl Generator for ApiClient {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<Generated, GenerateError> {
        let body = wire::GenerateBody { prompt };
        let response: wire::GenerateResponse =
            self.post_json("/api/generate", &body)
                .await
                .map_err(|e| match e {
                    ApiError::Unavailable(message) => GenerateError::Unavailable(message),
                    other => GenerateError::Rejected(other.to_string()),
                })?;

        Ok(Generated {
            content: response.content,
            tokens_remaining: response.tokens_remaining,
        })
    }
}
