//! Print a summary of the local cache record.

use siteulation_client::config::ClientConfig;
use siteulation_client::persist::LocalStore;

/// Summarize users, projects, and the cached session.
pub fn run() -> siteulation_client::Result<()> {
    let config = ClientConfig::from_env()?;
    let local = LocalStore::open(config.cache_path.clone());

    local.read(|record| {
        println!("cache record: {}", local.path().display());

        match &record.current_session {
            Some(session) => println!("session: @{}", session.username),
            None => println!("session: none"),
        }

        println!("users: {}", record.catalog.users.len());
        for user in &record.catalog.users {
            let kind = if user.credential_hash.is_some() {
                "local"
            } else {
                "mirrored"
            };
            println!(
                "  @{} ({kind}, {} tokens)",
                user.username, user.token_balance
            );
        }

        println!("projects: {}", record.catalog.projects.len());
        for project in &record.catalog.projects {
            let pin = project
                .pinned_version
                .map_or_else(|| "unpinned".to_owned(), |n| format!("pinned v{n}"));
            println!(
                "  {} ({} versions, {} views, {pin})",
                project.slug,
                project.versions.len(),
                project.views
            );
        }
    });

    Ok(())
}
