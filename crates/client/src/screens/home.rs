//! Landing screen: most viewed projects and most popular users.

use tracing::instrument;

use crate::persist::RemoteApi;
use crate::state::AppState;

use super::View;

/// Display the landing page.
///
/// Discovery listings tolerate unavailable or empty sources; the screen
/// renders with whatever could be fetched.
#[instrument(skip(state))]
pub async fn home_screen<A: RemoteApi>(state: &AppState<A>) -> View {
    let projects = state.adapter().list_projects().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load project listing");
        Vec::new()
    });

    let popular = state
        .adapter()
        .list_popular_users()
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load popular users");
            Vec::new()
        });

    View::Home { projects, popular }
}
