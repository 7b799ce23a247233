//! Login and signup screens and the credential operations behind them.

use secrecy::SecretString;
use tracing::instrument;

use siteulation_core::Username;

use crate::error::Result;
use crate::models::CurrentUser;
use crate::persist::RemoteApi;
use crate::state::AppState;
use crate::store::StoreError;

use super::View;

/// Display the login form, or bounce an authenticated user to the
/// studio.
pub fn login_screen<A: RemoteApi>(state: &AppState<A>) -> View {
    if state.session().current().is_authenticated() {
        return View::Redirect {
            to: "/studio".to_owned(),
            replace: true,
        };
    }
    View::Login
}

/// Display the signup form, with the same guard as the login screen.
pub fn signup_screen<A: RemoteApi>(state: &AppState<A>) -> View {
    if state.session().current().is_authenticated() {
        return View::Redirect {
            to: "/studio".to_owned(),
            replace: true,
        };
    }
    View::Signup
}

/// Log in and persist the confirmed identity.
///
/// # Errors
///
/// Surfaces `InvalidCredentials` at the form; the session state is
/// untouched on failure.
#[instrument(skip(state, password))]
pub async fn submit_login<A: RemoteApi>(
    state: &AppState<A>,
    username: &str,
    password: &SecretString,
) -> Result<CurrentUser> {
    let username = Username::parse(username).map_err(StoreError::from)?;
    let user = state.adapter().login(&username, password).await?;
    state.session().set_authenticated(user.clone());
    Ok(user)
}

/// Create an account and start a session.
///
/// # Errors
///
/// Surfaces validation failures and username conflicts.
#[instrument(skip(state, password))]
pub async fn submit_signup<A: RemoteApi>(
    state: &AppState<A>,
    username: &str,
    password: &SecretString,
) -> Result<CurrentUser> {
    let username = Username::parse(username).map_err(StoreError::from)?;
    let user = state.adapter().signup(&username, password).await?;
    state.session().set_authenticated(user.clone());
    Ok(user)
}

/// Clear the session; the remote service is notified best-effort.
pub async fn logout<A: RemoteApi>(state: &AppState<A>) {
    state.session().logout(state.remote()).await;
}
