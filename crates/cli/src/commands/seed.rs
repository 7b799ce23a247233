//! Seed the local cache with demo content.
//!
//! Writes directly to the durable record through the same catalog the
//! offline fallback uses, so seeded data obeys every store invariant.

use secrecy::SecretString;

use siteulation_client::config::ClientConfig;
use siteulation_client::models::{Project, User};
use siteulation_client::persist::LocalStore;
use siteulation_client::store::StoreError;
use siteulation_core::Username;

const DEMO_CONTENT_V1: &str = "<!doctype html><html><body><h1>Hello from siteulation</h1>\
    <p>This page was seeded locally.</p></body></html>";

const DEMO_CONTENT_V2: &str = "<!doctype html><html><body><h1>Hello again</h1>\
    <p>A second, newer version.</p></body></html>";

/// Create a demo account with one project and two versions.
pub fn run(username: &str, password: &str) -> siteulation_client::Result<()> {
    let config = ClientConfig::from_env()?;
    let local = LocalStore::open(config.cache_path.clone());

    let username = Username::parse(username).map_err(StoreError::from)?;
    let password = SecretString::from(password.to_owned());

    let (user, project) = local.mutate(|record| -> Result<(User, Project), StoreError> {
        let user = record.catalog.create_user(username, &password)?;
        let project = record.catalog.create_project(user.id, "My Site", None)?;
        record
            .catalog
            .append_version(project.id, user.id, DEMO_CONTENT_V1.to_owned())?;
        record
            .catalog
            .append_version(project.id, user.id, DEMO_CONTENT_V2.to_owned())?;
        Ok((user, project))
    })??;

    println!(
        "seeded @{} with project \"{}\" at /@{}/{} ({} tokens, cache: {})",
        user.username,
        project.title,
        user.username,
        project.slug,
        user.token_balance,
        local.path().display()
    );

    Ok(())
}
