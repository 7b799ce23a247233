//! Site screen: fetch a project, count the view, resolve the displayed
//! version. Also hosts the pin and remix operations.

use tracing::instrument;

use siteulation_core::{ProjectId, Slug, Username};

use crate::error::Result;
use crate::models::Project;
use crate::persist::RemoteApi;
use crate::router::Params;
use crate::state::AppState;

use super::{DisplayedVersion, SiteView, View, current_user};

/// Display a generated site.
///
/// The displayed version honors the precedence: an explicit `?version=`
/// request that exists, then the pin, then the latest.
#[instrument(skip(state, params))]
pub async fn site_screen<A: RemoteApi>(state: &AppState<A>, params: &Params) -> View {
    let not_found = || View::NotFound {
        path: params.path().to_owned(),
    };

    let (Some(username), Some(slug)) = (
        params.get("username").and_then(|u| Username::parse(u).ok()),
        params.get("slug").and_then(|s| Slug::parse(s).ok()),
    ) else {
        return not_found();
    };

    let project = match state.adapter().fetch_project(&username, &slug).await {
        Ok(project) => project,
        Err(e) if e.is_not_found() => return not_found(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load site");
            return not_found();
        }
    };

    // View tracking is best-effort and never fails the page. The local
    // increment serializes under the record lock, so duplicate calls for
    // one page load cannot lose a count.
    if let Err(e) = state.adapter().record_view(project.id).await {
        tracing::debug!(error = %e, "view not recorded");
    }

    let requested = params.query("version").and_then(|v| v.parse::<u32>().ok());
    let displayed = project
        .resolve_displayed_version(requested)
        .map(|v| DisplayedVersion {
            number: v.number,
            content: v.content.clone(),
            pinned: project.pinned_version == Some(v.number),
        });

    View::Site(SiteView {
        owner: username,
        slug,
        title: project.title.clone(),
        views: project.views,
        displayed,
        version_count: project.versions.len(),
        pinned_version: project.pinned_version,
    })
}

/// Pin a version as the project's default, or clear the pin with `None`.
///
/// # Errors
///
/// Surfaces `VersionNotFound` and ownership violations.
#[instrument(skip(state), fields(project = %project))]
pub async fn pin_version<A: RemoteApi>(
    state: &AppState<A>,
    project: ProjectId,
    number: Option<u32>,
) -> Result<()> {
    let user = current_user(state)?;
    state.adapter().pin_version(&user, project, number).await
}

/// Fork someone else's project into a copy owned by the current user.
///
/// This is the recovery path offered when a mutation is rejected with
/// `Forbidden`: the viewer cannot edit the original, but can continue
/// from their own copy.
///
/// # Errors
///
/// Surfaces existence failures; requires an authenticated session.
#[instrument(skip(state), fields(project = %project))]
pub async fn remix<A: RemoteApi>(state: &AppState<A>, project: ProjectId) -> Result<Project> {
    let user = current_user(state)?;
    state.adapter().remix(&user, project).await
}
