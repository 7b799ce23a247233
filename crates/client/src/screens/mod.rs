//! Screen handlers.
//!
//! One module per screen, each resolving route parameters plus adapter
//! data into a typed view model. Rendering is out of scope: views carry
//! data only, and site content stays an opaque blob destined for a
//! sandboxed embed.

mod auth;
mod home;
mod profile;
mod site;
mod studio;

pub use auth::{login_screen, logout, signup_screen, submit_login, submit_signup};
pub use home::home_screen;
pub use profile::profile_screen;
pub use site::{pin_version, remix, site_screen};
pub use studio::{create_project, generate, studio_screen};

use siteulation_core::{Slug, Username};

use crate::error::{AppError, Result};
use crate::models::{CurrentUser, PopularUser, ProjectSummary};
use crate::persist::RemoteApi;
use crate::router::{Pattern, PatternError, RouteTable, Segment};
use crate::state::AppState;
use crate::store::StoreError;

/// Username segment constraint.
const HANDLE_PATTERN: &str = "[A-Za-z0-9_]{3,20}";

/// Slug segment constraint.
const SLUG_PATTERN: &str = "[a-z0-9-]{1,50}";

/// Route handler identifiers registered in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Login,
    Signup,
    Studio,
    Profile,
    Site,
}

/// Build the application route table.
///
/// Literal routes come first; the parameterized profile and site patterns
/// follow. Resolution is first-match-wins in this order.
///
/// # Errors
///
/// Returns `PatternError` if a segment constraint fails to compile.
pub fn route_table() -> std::result::Result<RouteTable<Screen>, PatternError> {
    let mut table = RouteTable::new();

    table.register(Pattern::literal("/"), Screen::Home);
    table.register(Pattern::literal("/login"), Screen::Login);
    table.register(Pattern::literal("/signup"), Screen::Signup);
    table.register(Pattern::literal("/studio"), Screen::Studio);
    table.register(
        Pattern::segments(vec![Segment::prefixed_param(
            "@",
            "username",
            HANDLE_PATTERN,
        )?]),
        Screen::Profile,
    );
    table.register(
        Pattern::segments(vec![
            Segment::prefixed_param("@", "username", HANDLE_PATTERN)?,
            Segment::param("slug", SLUG_PATTERN)?,
        ]),
        Screen::Site,
    );

    Ok(table)
}

/// Typed view models produced by the screens.
#[derive(Debug, Clone)]
pub enum View {
    /// Landing page listings.
    Home {
        projects: Vec<ProjectSummary>,
        popular: Vec<PopularUser>,
    },
    /// Login form.
    Login,
    /// Signup form.
    Signup,
    /// Authenticated workspace.
    Studio {
        user: CurrentUser,
        projects: Vec<ProjectSummary>,
    },
    /// One user's public profile.
    Profile {
        username: Username,
        projects: Vec<ProjectSummary>,
    },
    /// A generated site.
    Site(SiteView),
    /// Guard outcome: the caller should navigate elsewhere.
    Redirect { to: String, replace: bool },
    /// 404-equivalent.
    NotFound { path: String },
}

/// Data for the sandboxed site embed.
#[derive(Debug, Clone)]
pub struct SiteView {
    /// Owner's handle.
    pub owner: Username,
    /// Project slug.
    pub slug: Slug,
    /// Display title.
    pub title: String,
    /// View counter as fetched.
    pub views: u64,
    /// The displayed snapshot; `None` for a project with no versions yet.
    pub displayed: Option<DisplayedVersion>,
    /// Total number of versions.
    pub version_count: usize,
    /// Pinned version number, if any.
    pub pinned_version: Option<u32>,
}

/// The snapshot selected for display.
#[derive(Debug, Clone)]
pub struct DisplayedVersion {
    /// Version number.
    pub number: u32,
    /// Opaque HTML for a sandboxed embed; never inline-executed in the
    /// hosting context.
    pub content: String,
    /// Whether this is the project's pinned version.
    pub pinned: bool,
}

/// The session identity, required for mutating operations.
pub(crate) fn current_user<A: RemoteApi>(state: &AppState<A>) -> Result<CurrentUser> {
    state
        .session()
        .current()
        .user()
        .cloned()
        .ok_or(AppError::Store(StoreError::Forbidden))
}
