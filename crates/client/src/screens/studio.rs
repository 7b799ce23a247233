//! Studio screen: the authenticated workspace for creating projects and
//! generating site content.

use tracing::instrument;

use siteulation_core::ProjectId;

use crate::error::Result;
use crate::models::{Project, Version};
use crate::persist::RemoteApi;
use crate::services::Generator;
use crate::session::SessionState;
use crate::state::AppState;

use super::{View, current_user};

/// Display the studio, or bounce an anonymous visitor to the login form.
#[instrument(skip(state))]
pub async fn studio_screen<A: RemoteApi>(state: &AppState<A>) -> View {
    let SessionState::Authenticated(user) = state.session().current() else {
        return View::Redirect {
            to: "/login".to_owned(),
            replace: true,
        };
    };

    let projects = state
        .adapter()
        .projects_of(&user.username)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load own projects");
            Vec::new()
        });

    View::Studio { user, projects }
}

/// Create an empty project owned by the current user.
///
/// # Errors
///
/// Surfaces `SlugConflict` as a user-actionable validation error and
/// `Forbidden` for anonymous callers.
#[instrument(skip(state))]
pub async fn create_project<A: RemoteApi>(
    state: &AppState<A>,
    title: &str,
    slug_hint: Option<&str>,
) -> Result<Project> {
    let user = current_user(state)?;
    state.adapter().create_project(&user, title, slug_hint).await
}

/// Generate site content for a prompt and append it as a new version.
///
/// Generation is remote-only; storing the result is dual-mode. Returns
/// the appended version and the remaining token balance reported by the
/// generation service.
///
/// # Errors
///
/// Surfaces generation failures (including exhausted tokens) and storage
/// rule violations.
#[instrument(skip(state, prompt), fields(project = %project))]
pub async fn generate<A: RemoteApi + Generator>(
    state: &AppState<A>,
    project: ProjectId,
    prompt: &str,
) -> Result<(Version, i64)> {
    let user = current_user(state)?;

    let generated = state.remote().generate(prompt).await?;
    let version = state
        .adapter()
        .append_version(&user, project, &generated.content)
        .await?;

    Ok((version, generated.tokens_remaining))
}
