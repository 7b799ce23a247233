//! Profile screen: one user's public projects.

use tracing::instrument;

use siteulation_core::Username;

use crate::persist::RemoteApi;
use crate::router::Params;
use crate::state::AppState;

use super::View;

/// Display a user's profile.
#[instrument(skip(state, params))]
pub async fn profile_screen<A: RemoteApi>(state: &AppState<A>, params: &Params) -> View {
    let Some(username) = params.get("username").and_then(|u| Username::parse(u).ok()) else {
        // The route constraint guarantees a well-formed handle; anything
        // else is a table misregistration, rendered as not found.
        return View::NotFound {
            path: params.path().to_owned(),
        };
    };

    let projects = state
        .adapter()
        .projects_of(&username)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load profile projects");
            Vec::new()
        });

    View::Profile { username, projects }
}
