//! Offline behavior: every write that would succeed against the remote
//! API also succeeds against the local record, with the same invariants
//! enforced, and the record survives restarts.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use siteulation_client::AppError;
use siteulation_client::View;
use siteulation_client::store::StoreError;
use siteulation_integration_tests::{offline_app, offline_signup};

fn password() -> SecretString {
    SecretString::from("hunter22".to_owned())
}

#[tokio::test]
async fn offline_signup_and_login_roundtrip() {
    let dir = tempfile::tempdir().unwrap();

    {
        let app = offline_app(dir.path());
        let user = offline_signup(&app, "alice").await;
        assert_eq!(user.username.as_str(), "alice");
        app.logout().await;
    }

    // A fresh client over the same cache can log back in, entirely
    // offline, against the stored Argon2 hash.
    let app = offline_app(dir.path());
    let user = app.login("alice", &password()).await.unwrap();
    assert_eq!(user.username.as_str(), "alice");

    let wrong = app
        .login("alice", &SecretString::from("wrong-pass".to_owned()))
        .await;
    assert!(matches!(
        wrong,
        Err(AppError::Store(StoreError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn offline_signup_enforces_username_uniqueness() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    offline_signup(&app, "alice").await;
    app.logout().await;

    let conflict = app.signup("alice", &password()).await;
    assert!(matches!(
        conflict,
        Err(AppError::Store(StoreError::UsernameTaken))
    ));
}

#[tokio::test]
async fn offline_create_enforces_slug_uniqueness() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    offline_signup(&app, "alice").await;

    app.create_project("My Site", None).await.unwrap();
    let conflict = app.create_project("my SITE", None).await;
    assert!(matches!(
        conflict,
        Err(AppError::Store(StoreError::SlugConflict(_)))
    ));
}

#[tokio::test]
async fn offline_data_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let project_id = {
        let app = offline_app(dir.path());
        let user = offline_signup(&app, "alice").await;
        let project = app.create_project("My Site", None).await.unwrap();
        app.state()
            .adapter()
            .append_version(&user, project.id, "<h1>A</h1>")
            .await
            .unwrap();
        project.id
    };

    let app = offline_app(dir.path());
    // The session also survives: booted from the cache, provisionally.
    assert!(app.state().session().current().is_authenticated());

    let view = app.open("/@alice/my-site").await.unwrap();
    let View::Site(site) = view else {
        panic!("expected site view, got {view:?}");
    };
    assert_eq!(site.version_count, 1);

    assert!(
        app.state()
            .local()
            .read(|r| r.catalog.contains_project(project_id))
    );
}

#[tokio::test]
async fn record_view_increments_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    offline_signup(&app, "alice").await;
    let project = app.create_project("My Site", None).await.unwrap();

    // Duplicate view-tracking calls for one page load race through the
    // adapter; the record lock serializes them.
    let adapter = app.state().adapter();
    let (a, b) = tokio::join!(
        adapter.record_view(project.id),
        adapter.record_view(project.id)
    );
    a.unwrap();
    b.unwrap();

    let views = app
        .state()
        .local()
        .read(|r| r.catalog.project(project.id).unwrap().views);
    assert_eq!(views, 2);
}

#[tokio::test]
async fn malformed_cache_record_recovered_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cache.json"), b"]]]{{{ definitely not json").unwrap();

    let app = offline_app(dir.path());
    // The client still works; the record was treated as empty.
    let view = app.open("/").await.unwrap();
    let View::Home { projects, popular } = view else {
        panic!("expected home view, got {view:?}");
    };
    assert!(projects.is_empty());
    assert!(popular.is_empty());

    // And it is usable for new writes.
    offline_signup(&app, "alice").await;
    assert!(app.create_project("My Site", None).await.is_ok());
}

#[tokio::test]
async fn listings_fall_back_to_local_content() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    offline_signup(&app, "alice").await;
    let project = app.create_project("My Site", None).await.unwrap();
    app.state().adapter().record_view(project.id).await.unwrap();

    let view = app.open("/").await.unwrap();
    let View::Home { projects, popular } = view else {
        panic!("expected home view, got {view:?}");
    };
    assert_eq!(projects.len(), 1);
    assert_eq!(projects.first().unwrap().slug.as_str(), "my-site");
    assert_eq!(popular.len(), 1);
    assert_eq!(popular.first().unwrap().username.as_str(), "alice");
}
