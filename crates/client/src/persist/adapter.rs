//! The dual-mode persistence gateway.
//!
//! Remote first, for every read and write. A transport failure retries the
//! same logical operation against the local record and returns its result
//! - degraded mode is silent by design. Well-formed application errors
//! from Remote propagate unchanged. Nothing written locally is ever synced
//! back: a project lives wherever it was created.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, instrument};

use siteulation_core::{ProjectId, Slug, Username};

use crate::error::AppError;
use crate::models::{CurrentUser, PopularUser, Project, ProjectSummary, Version};
use crate::store::StoreError;

use super::{ApiError, LocalStore, RemoteApi};

/// Gateway over the remote API and the durable local record.
pub struct PersistenceAdapter<A> {
    remote: A,
    local: Arc<LocalStore>,
}

impl<A: RemoteApi> PersistenceAdapter<A> {
    /// Create an adapter over the given backends.
    pub fn new(remote: A, local: Arc<LocalStore>) -> Self {
        Self { remote, local }
    }

    /// The remote backend.
    pub fn remote(&self) -> &A {
        &self.remote
    }

    /// The local backend.
    #[must_use]
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Authenticate, against the local credential store when the identity
    /// service is unreachable.
    ///
    /// # Errors
    ///
    /// Propagates `InvalidCredentials` from either backend.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<CurrentUser, AppError> {
        match self.remote.login(username, password).await {
            Ok(user) => Ok(user),
            Err(e) if e.is_unavailable() => {
                debug!("identity service unreachable, authenticating locally");
                let user = self.local.read(|r| r.catalog.authenticate(username, password))?;
                Ok(CurrentUser {
                    id: user.id,
                    username: user.username,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create an account, in the local store when the identity service is
    /// unreachable. Local accounts keep the same invariants (username
    /// uniqueness, hashed credentials).
    ///
    /// # Errors
    ///
    /// Propagates conflicts and validation failures from either backend.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn signup(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<CurrentUser, AppError> {
        match self.remote.signup(username, password).await {
            Ok(user) => Ok(user),
            Err(e) if e.is_unavailable() => {
                debug!("identity service unreachable, creating local account");
                let user = self
                    .local
                    .mutate(|r| r.catalog.create_user(username.clone(), password))??;
                Ok(CurrentUser {
                    id: user.id,
                    username: user.username,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Public Reads
    // =========================================================================

    /// Project listing for discovery views.
    ///
    /// Falls back to the local record when Remote is unreachable or
    /// returns nothing, keeping the UI populated during early bootstrap
    /// or offline demos.
    ///
    /// # Errors
    ///
    /// Propagates well-formed remote failures.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, AppError> {
        match self.remote.list_projects().await {
            Ok(rows) if !rows.is_empty() => Ok(rows),
            Ok(_) => {
                debug!("remote returned no projects, reading local record");
                Ok(self.local.read(|r| r.catalog.summaries()))
            }
            Err(e) if e.is_unavailable() => Ok(self.local.read(|r| r.catalog.summaries())),
            Err(e) => Err(e.into()),
        }
    }

    /// Popular-user listing, with the same fallback as
    /// [`Self::list_projects`].
    ///
    /// # Errors
    ///
    /// Propagates well-formed remote failures.
    #[instrument(skip(self))]
    pub async fn list_popular_users(&self) -> Result<Vec<PopularUser>, AppError> {
        match self.remote.list_popular_users().await {
            Ok(rows) if !rows.is_empty() => Ok(rows),
            Ok(_) => {
                debug!("remote returned no users, reading local record");
                Ok(self.local.read(|r| r.catalog.popular_users()))
            }
            Err(e) if e.is_unavailable() => Ok(self.local.read(|r| r.catalog.popular_users())),
            Err(e) => Err(e.into()),
        }
    }

    /// Projects of one user, with the listing fallback.
    ///
    /// # Errors
    ///
    /// Propagates well-formed remote failures.
    #[instrument(skip(self), fields(username = %username))]
    pub async fn projects_of(&self, username: &Username) -> Result<Vec<ProjectSummary>, AppError> {
        match self.remote.projects_of(username).await {
            Ok(rows) if !rows.is_empty() => Ok(rows),
            Ok(_) => Ok(self.local.read(|r| r.catalog.projects_of(username))),
            Err(e) if e.is_unavailable() => {
                Ok(self.local.read(|r| r.catalog.projects_of(username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a project with its history.
    ///
    /// A project absent on Remote may still live in the local record (it
    /// was created while disconnected), so `NotFound` also consults Local
    /// before giving up.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProjectNotFound` when neither backend knows
    /// the project.
    #[instrument(skip(self), fields(username = %username, slug = %slug))]
    pub async fn fetch_project(
        &self,
        username: &Username,
        slug: &Slug,
    ) -> Result<Project, AppError> {
        match self.remote.fetch_project(username, slug).await {
            Ok(project) => Ok(project),
            Err(ApiError::Unavailable(_) | ApiError::NotFound) => self
                .local
                .read(|r| r.catalog.project_by_handle(username, slug).cloned())
                .ok_or(AppError::Store(StoreError::ProjectNotFound)),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a project owned by `actor`.
    ///
    /// # Errors
    ///
    /// Propagates `SlugConflict` from either backend.
    #[instrument(skip(self), fields(actor = %actor.username))]
    pub async fn create_project(
        &self,
        actor: &CurrentUser,
        title: &str,
        slug_hint: Option<&str>,
    ) -> Result<Project, AppError> {
        match self.remote.create_project(title, slug_hint).await {
            Ok(project) => Ok(project),
            Err(e) if e.is_unavailable() => {
                debug!("remote unreachable, creating project locally");
                let project = self.local.mutate(|r| {
                    r.catalog.ensure_user(actor.id, &actor.username);
                    r.catalog.create_project(actor.id, title, slug_hint)
                })??;
                Ok(project)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append a content snapshot.
    ///
    /// # Errors
    ///
    /// Propagates ownership and existence failures.
    #[instrument(skip(self, content), fields(project = %project))]
    pub async fn append_version(
        &self,
        actor: &CurrentUser,
        project: ProjectId,
        content: &str,
    ) -> Result<Version, AppError> {
        match self.remote.append_version(project, content).await {
            Ok(version) => Ok(version),
            Err(e) if self.falls_through(&e, project) => Ok(self
                .local
                .mutate(|r| r.catalog.append_version(project, actor.id, content.to_owned()))??),
            Err(e) => Err(e.into()),
        }
    }

    /// Pin a version, or clear the pin with `None`.
    ///
    /// # Errors
    ///
    /// Propagates `VersionNotFound`, ownership, and existence failures.
    #[instrument(skip(self), fields(project = %project))]
    pub async fn pin_version(
        &self,
        actor: &CurrentUser,
        project: ProjectId,
        number: Option<u32>,
    ) -> Result<(), AppError> {
        match self.remote.pin_version(project, number).await {
            Ok(()) => Ok(()),
            Err(e) if self.falls_through(&e, project) => Ok(self
                .local
                .mutate(|r| r.catalog.pin_version(project, actor.id, number))??),
            Err(e) => Err(e.into()),
        }
    }

    /// Fork a project into a copy owned by `actor`.
    ///
    /// # Errors
    ///
    /// Propagates existence failures.
    #[instrument(skip(self), fields(project = %project))]
    pub async fn remix(
        &self,
        actor: &CurrentUser,
        project: ProjectId,
    ) -> Result<Project, AppError> {
        match self.remote.remix(project).await {
            Ok(remixed) => Ok(remixed),
            Err(e) if self.falls_through(&e, project) => {
                let remixed = self.local.mutate(|r| {
                    r.catalog.ensure_user(actor.id, &actor.username);
                    r.catalog.remix(project, actor.id)
                })??;
                Ok(remixed)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Count a view. The local increment is atomic under the record lock,
    /// so racing duplicate calls in one tab never lose a count.
    ///
    /// # Errors
    ///
    /// Propagates existence failures; callers treat view tracking as
    /// best-effort.
    #[instrument(skip(self), fields(project = %project))]
    pub async fn record_view(&self, project: ProjectId) -> Result<(), AppError> {
        match self.remote.record_view(project).await {
            Ok(()) => Ok(()),
            Err(e) if self.falls_through(&e, project) => {
                self.local.mutate(|r| r.catalog.record_view(project))??;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a remote failure should be retried against the local
    /// record: any transport failure, or a `NotFound` for a project that
    /// lives only in the local store.
    fn falls_through(&self, error: &ApiError, project: ProjectId) -> bool {
        if error.is_unavailable() {
            return true;
        }
        matches!(error, ApiError::NotFound)
            && self.local.read(|r| r.catalog.contains_project(project))
    }
}
