//! Open a path through the full app and describe the resulting view.

use siteulation_client::{App, View};

/// Bootstrap, navigate, and print what a renderer would receive.
pub async fn run(target: &str) -> siteulation_client::Result<()> {
    let app = App::from_env()?;
    app.bootstrap().await;

    let view = app.open(target).await;
    println!("path: {}", app.current_path());
    match view {
        Some(view) => println!("{}", describe(&view)),
        None => println!("view: none"),
    }

    Ok(())
}

fn describe(view: &View) -> String {
    match view {
        View::Home { projects, popular } => format!(
            "home: {} projects, {} popular users",
            projects.len(),
            popular.len()
        ),
        View::Login => "login form".to_owned(),
        View::Signup => "signup form".to_owned(),
        View::Studio { user, projects } => {
            format!("studio for @{} ({} projects)", user.username, projects.len())
        }
        View::Profile { username, projects } => {
            format!("profile of @{username} ({} projects)", projects.len())
        }
        View::Site(site) => {
            let displayed = site.displayed.as_ref().map_or_else(
                || "no versions yet".to_owned(),
                |v| {
                    format!(
                        "v{}{} ({} bytes)",
                        v.number,
                        if v.pinned { " (pinned)" } else { "" },
                        v.content.len()
                    )
                },
            );
            format!(
                "site /@{}/{}: \"{}\", {} views, {displayed}",
                site.owner, site.slug, site.title, site.views
            )
        }
        View::Redirect { to, .. } => format!("redirect to {to}"),
        View::NotFound { path } => format!("not found: {path}"),
    }
}
