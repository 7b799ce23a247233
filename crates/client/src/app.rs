//! The application umbrella: one browsing context wiring navigation to
//! screens and shared state.

use secrecy::SecretString;
use tracing::instrument;

use siteulation_core::ProjectId;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{CurrentUser, Project, Version};
use crate::nav::{LinkDisposition, NavigationController, ViewResolver, classify_link};
use crate::persist::{ApiClient, RemoteApi};
use crate::router::Params;
use crate::screens::{self, Screen, View};
use crate::services::Generator;
use crate::state::AppState;

/// Guard redirects followed per `open` call before giving up.
const MAX_REDIRECTS: usize = 4;

impl<A: RemoteApi> ViewResolver for AppState<A> {
    type Handler = Screen;
    type View = View;

    async fn resolve(&self, handler: Screen, params: Params) -> View {
        match handler {
            Screen::Home => screens::home_screen(self).await,
            Screen::Login => screens::login_screen(self),
            Screen::Signup => screens::signup_screen(self),
            Screen::Studio => screens::studio_screen(self).await,
            Screen::Profile => screens::profile_screen(self, &params).await,
            Screen::Site => screens::site_screen(self, &params).await,
        }
    }

    fn not_found(&self, path: &str) -> View {
        View::NotFound {
            path: path.to_owned(),
        }
    }
}

/// A browsing context: one logical tab.
pub struct App<A: RemoteApi> {
    state: AppState<A>,
    nav: NavigationController<AppState<A>>,
}

impl App<ApiClient> {
    /// Build the default app from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the HTTP client is invalid.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let remote = ApiClient::new(&config)?;
        Self::new(config, remote)
    }
}

impl<A: RemoteApi> App<A> {
    /// Build an app over the given remote backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the route table fails to build.
    pub fn new(config: ClientConfig, remote: A) -> Result<Self> {
        let state = AppState::new(config, remote);
        let table = screens::route_table()?;
        let nav = NavigationController::new(table, state.clone());

        Ok(Self { state, nav })
    }

    /// Reconcile the provisional session with the identity service.
    ///
    /// Call once after construction; tolerates an unreachable service by
    /// keeping the cached identity.
    pub async fn bootstrap(&self) {
        self.state.session().reconcile(self.state.remote()).await;
    }

    /// Navigate to a target, following guard redirects.
    #[instrument(skip(self))]
    pub async fn open(&self, target: &str) -> Option<View> {
        self.nav.navigate(target, false).await;
        self.follow_redirects().await
    }

    /// Handle an activated in-page link.
    ///
    /// Same-origin links become in-app navigations; everything else is
    /// left to the browser and returns `None`.
    pub async fn activate_link(&self, href: &str) -> Option<View> {
        match classify_link(&self.state.config().origin, href) {
            LinkDisposition::Intercept(target) => self.open(&target).await,
            LinkDisposition::Browser => None,
        }
    }

    /// Browser back gesture.
    pub async fn back(&self) -> Option<View> {
        self.nav.back().await;
        self.follow_redirects().await
    }

    /// Browser forward gesture.
    pub async fn forward(&self) -> Option<View> {
        self.nav.forward().await;
        self.follow_redirects().await
    }

    async fn follow_redirects(&self) -> Option<View> {
        for _ in 0..MAX_REDIRECTS {
            match self.nav.current_view() {
                Some(View::Redirect { to, replace }) => {
                    self.nav.navigate(&to, replace).await;
                }
                other => return other,
            }
        }
        self.nav.current_view()
    }

    /// The shared state bundle.
    #[must_use]
    pub fn state(&self) -> &AppState<A> {
        &self.state
    }

    /// The navigation controller.
    #[must_use]
    pub fn nav(&self) -> &NavigationController<AppState<A>> {
        &self.nav
    }

    /// The target the history currently points at.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.nav.current_path()
    }

    /// The most recently committed view.
    #[must_use]
    pub fn current_view(&self) -> Option<View> {
        self.nav.current_view()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Log in.
    ///
    /// # Errors
    ///
    /// Surfaces `InvalidCredentials` at the form.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<CurrentUser> {
        screens::submit_login(&self.state, username, password).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Surfaces validation failures and username conflicts.
    pub async fn signup(&self, username: &str, password: &SecretString) -> Result<CurrentUser> {
        screens::submit_signup(&self.state, username, password).await
    }

    /// Log out.
    pub async fn logout(&self) {
        screens::logout(&self.state).await;
    }

    /// Create a project owned by the current user.
    ///
    /// # Errors
    ///
    /// Surfaces `SlugConflict` and `Forbidden`.
    pub async fn create_project(&self, title: &str, slug_hint: Option<&str>) -> Result<Project> {
        screens::create_project(&self.state, title, slug_hint).await
    }

    /// Pin a version, or clear the pin with `None`.
    ///
    /// # Errors
    ///
    /// Surfaces `VersionNotFound` and ownership violations.
    pub async fn pin_version(&self, project: ProjectId, number: Option<u32>) -> Result<()> {
        screens::pin_version(&self.state, project, number).await
    }

    /// Fork a project into a copy owned by the current user.
    ///
    /// # Errors
    ///
    /// Surfaces existence failures; requires an authenticated session.
    pub async fn remix(&self, project: ProjectId) -> Result<Project> {
        screens::remix(&self.state, project).await
    }
}

impl<A: RemoteApi + Generator> App<A> {
    /// Generate site content and append it as a new version.
    ///
    /// # Errors
    ///
    /// Surfaces generation failures and storage rule violations.
    pub async fn generate(&self, project: ProjectId, prompt: &str) -> Result<(Version, i64)> {
        screens::generate(&self.state, project, prompt).await
    }
}
