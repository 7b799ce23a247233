//! The versioned content store.
//!
//! [`Catalog`] holds users and projects in memory and enforces every
//! domain invariant - slug uniqueness per owner, strictly increasing
//! version numbers, pin validity, ownership - independent of where the
//! data is persisted. The local backend wraps a catalog; remote responses
//! convert into the same domain types.

mod error;

pub use error::StoreError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use siteulation_core::{ProjectId, Slug, UserId, Username};

use crate::models::{PopularUser, Project, ProjectSummary, StoredUser, User, Version};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Tokens granted to accounts created in the local store.
pub const DEFAULT_TOKEN_GRANT: i64 = 100;

/// In-memory users and projects with domain invariants enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Known users, locally created or mirrored.
    #[serde(default)]
    pub users: Vec<StoredUser>,
    /// Known projects with their full version history.
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Catalog {
    // =========================================================================
    // Users
    // =========================================================================

    /// Create a user with a hashed credential.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UsernameTaken` if the handle is in use and
    /// `StoreError::WeakPassword` if the password fails validation.
    pub fn create_user(
        &mut self,
        username: Username,
        password: &SecretString,
    ) -> Result<User, StoreError> {
        if self.user_by_name(&username).is_some() {
            return Err(StoreError::UsernameTaken);
        }

        validate_password(password.expose_secret())?;
        let credential_hash = hash_password(password.expose_secret())?;

        let user = StoredUser {
            id: UserId::generate(),
            username,
            credential_hash: Some(credential_hash),
            token_balance: DEFAULT_TOKEN_GRANT,
            created_at: Utc::now(),
        };
        self.users.push(user.clone());

        Ok(user.to_user())
    }

    /// Check a username/password pair against stored credentials.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCredentials` if the pair doesn't match.
    pub fn authenticate(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<User, StoreError> {
        let user = self
            .user_by_name(username)
            .ok_or(StoreError::InvalidCredentials)?;

        let hash = user
            .credential_hash
            .as_deref()
            .ok_or(StoreError::InvalidCredentials)?;

        verify_password(password.expose_secret(), hash)?;

        Ok(user.to_user())
    }

    /// Insert a shadow record for an identity confirmed elsewhere.
    ///
    /// Used when a remote-born user first touches the local store, e.g.
    /// creating a project while disconnected. No credential material is
    /// stored, so such identities cannot log in locally.
    pub fn ensure_user(&mut self, id: UserId, username: &Username) {
        if self.users.iter().any(|u| u.id == id) {
            return;
        }
        self.users.push(StoredUser {
            id,
            username: username.clone(),
            credential_hash: None,
            token_balance: 0,
            created_at: Utc::now(),
        });
    }

    /// Get a user by ID.
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&StoredUser> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Get a user by handle.
    #[must_use]
    pub fn user_by_name(&self, username: &Username) -> Option<&StoredUser> {
        self.users.iter().find(|u| &u.username == username)
    }

    /// Deduct generation tokens. The balance never goes negative.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UserNotFound` for an unknown user and
    /// `StoreError::InsufficientTokens` when the balance cannot cover the
    /// debit.
    pub fn debit_tokens(&mut self, id: UserId, amount: i64) -> Result<i64, StoreError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::UserNotFound)?;

        if user.token_balance < amount {
            return Err(StoreError::InsufficientTokens);
        }

        user.token_balance -= amount;
        Ok(user.token_balance)
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// Create a project for `owner`, deriving the slug from the hint or,
    /// absent one, the title.
    ///
    /// The project starts with zero versions and no pin.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SlugConflict` if the owner already has a
    /// project with the derived slug.
    pub fn create_project(
        &mut self,
        owner: UserId,
        title: &str,
        slug_hint: Option<&str>,
    ) -> Result<Project, StoreError> {
        let source = slug_hint.filter(|s| !s.trim().is_empty()).unwrap_or(title);
        let slug = Slug::derive(source);

        if self.slug_taken(owner, &slug) {
            return Err(StoreError::SlugConflict(slug));
        }

        let now = Utc::now();
        let project = Project {
            id: ProjectId::generate(),
            owner,
            title: title.to_owned(),
            slug,
            pinned_version: None,
            views: 0,
            created_at: now,
            updated_at: now,
            versions: Vec::new(),
        };
        self.projects.push(project.clone());

        Ok(project)
    }

    /// Get a project by ID.
    #[must_use]
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Whether a project with this ID exists.
    #[must_use]
    pub fn contains_project(&self, id: ProjectId) -> bool {
        self.project(id).is_some()
    }

    /// Get a project by its owner's handle and slug.
    #[must_use]
    pub fn project_by_handle(&self, username: &Username, slug: &Slug) -> Option<&Project> {
        let owner = self.user_by_name(username)?;
        self.projects
            .iter()
            .find(|p| p.owner == owner.id && &p.slug == slug)
    }

    /// Append an immutable snapshot, assigning the next version number.
    ///
    /// Does not alter the pin.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProjectNotFound` for an unknown project and
    /// `StoreError::Forbidden` when `actor` is not the owner.
    pub fn append_version(
        &mut self,
        id: ProjectId,
        actor: UserId,
        content: String,
    ) -> Result<Version, StoreError> {
        let project = self.owned_project_mut(id, actor)?;

        let version = Version {
            number: project.next_version_number(),
            content,
            created_at: Utc::now(),
        };
        project.versions.push(version.clone());
        project.updated_at = version.created_at;

        Ok(version)
    }

    /// Pin a version as the project's default, or clear the pin with
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::VersionNotFound` if no version with that
    /// number exists on the project, `StoreError::ProjectNotFound` for an
    /// unknown project, and `StoreError::Forbidden` when `actor` is not
    /// the owner.
    pub fn pin_version(
        &mut self,
        id: ProjectId,
        actor: UserId,
        number: Option<u32>,
    ) -> Result<(), StoreError> {
        let project = self.owned_project_mut(id, actor)?;

        if let Some(n) = number {
            if project.version(n).is_none() {
                return Err(StoreError::VersionNotFound(n));
            }
        }

        project.pinned_version = number;
        project.updated_at = Utc::now();

        Ok(())
    }

    /// Copy a project's full history into a new project owned by
    /// `new_owner`.
    ///
    /// Versions are re-numbered from 1 in their original order; the pin is
    /// not carried over. A slug collision under the new owner resolves by
    /// numeric suffixing. Source and remix are independent thereafter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProjectNotFound` for an unknown source.
    pub fn remix(&mut self, source: ProjectId, new_owner: UserId) -> Result<Project, StoreError> {
        let src = self
            .project(source)
            .ok_or(StoreError::ProjectNotFound)?
            .clone();

        let slug = self.free_slug(new_owner, &src.slug);
        let now = Utc::now();
        let versions = src
            .versions
            .iter()
            .zip(1u32..)
            .map(|(v, number)| Version {
                number,
                content: v.content.clone(),
                created_at: now,
            })
            .collect();

        let project = Project {
            id: ProjectId::generate(),
            owner: new_owner,
            title: src.title,
            slug,
            pinned_version: None,
            views: 0,
            created_at: now,
            updated_at: now,
            versions,
        };
        self.projects.push(project.clone());

        Ok(project)
    }

    /// Count a view. Requires no authentication.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ProjectNotFound` for an unknown project.
    pub fn record_view(&mut self, id: ProjectId) -> Result<u64, StoreError> {
        let project = self.project_mut(id)?;
        project.views += 1;
        Ok(project.views)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Projects ordered by views, most viewed first.
    #[must_use]
    pub fn summaries(&self) -> Vec<ProjectSummary> {
        let mut rows: Vec<ProjectSummary> = self
            .projects
            .iter()
            .filter_map(|p| self.summary_of(p))
            .collect();
        rows.sort_by(|a, b| b.views.cmp(&a.views));
        rows
    }

    /// Projects owned by one user, most viewed first.
    #[must_use]
    pub fn projects_of(&self, username: &Username) -> Vec<ProjectSummary> {
        let Some(owner) = self.user_by_name(username) else {
            return Vec::new();
        };
        let mut rows: Vec<ProjectSummary> = self
            .projects
            .iter()
            .filter(|p| p.owner == owner.id)
            .filter_map(|p| self.summary_of(p))
            .collect();
        rows.sort_by(|a, b| b.views.cmp(&a.views));
        rows
    }

    /// Users ranked by total views across their projects.
    ///
    /// Users without projects are omitted.
    #[must_use]
    pub fn popular_users(&self) -> Vec<PopularUser> {
        let mut rows: Vec<PopularUser> = self
            .users
            .iter()
            .filter_map(|u| {
                let (views, project_count) = self
                    .projects
                    .iter()
                    .filter(|p| p.owner == u.id)
                    .fold((0u64, 0usize), |(v, c), p| (v + p.views, c + 1));
                (project_count > 0).then(|| PopularUser {
                    username: u.username.clone(),
                    views,
                    project_count,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.views.cmp(&a.views));
        rows
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn summary_of(&self, project: &Project) -> Option<ProjectSummary> {
        let owner = self.user(project.owner)?;
        Some(ProjectSummary {
            owner: owner.username.clone(),
            slug: project.slug.clone(),
            title: project.title.clone(),
            views: project.views,
        })
    }

    fn slug_taken(&self, owner: UserId, slug: &Slug) -> bool {
        self.projects
            .iter()
            .any(|p| p.owner == owner && &p.slug == slug)
    }

    /// First free slug under `owner`: the base itself, else `base-2`,
    /// `base-3`, ... in order.
    fn free_slug(&self, owner: UserId, base: &Slug) -> Slug {
        if !self.slug_taken(owner, base) {
            return base.clone();
        }
        let mut n = 2u32;
        loop {
            let candidate = base.with_suffix(n);
            if !self.slug_taken(owner, &candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn project_mut(&mut self, id: ProjectId) -> Result<&mut Project, StoreError> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProjectNotFound)
    }

    fn owned_project_mut(
        &mut self,
        id: ProjectId,
        actor: UserId,
    ) -> Result<&mut Project, StoreError> {
        let project = self.project_mut(id)?;
        if project.owner != actor {
            return Err(StoreError::Forbidden);
        }
        Ok(project)
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Validate password strength requirements.
fn validate_password(password: &str) -> Result<(), StoreError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(StoreError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| StoreError::CredentialHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), StoreError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| StoreError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| StoreError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn catalog_with_user(name: &str) -> (Catalog, User) {
        let mut catalog = Catalog::default();
        let user = catalog
            .create_user(username(name), &secret("hunter22"))
            .unwrap();
        (catalog, user)
    }

    #[test]
    fn test_create_user_and_authenticate() {
        let (catalog, user) = catalog_with_user("alice");

        let authed = catalog
            .authenticate(&username("alice"), &secret("hunter22"))
            .unwrap();
        assert_eq!(authed.id, user.id);
        assert_eq!(authed.token_balance, DEFAULT_TOKEN_GRANT);
    }

    #[test]
    fn test_authenticate_rejects_wrong_password() {
        let (catalog, _) = catalog_with_user("alice");

        assert!(matches!(
            catalog.authenticate(&username("alice"), &secret("wrong-pass")),
            Err(StoreError::InvalidCredentials)
        ));
        assert!(matches!(
            catalog.authenticate(&username("nobody"), &secret("hunter22")),
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_create_user_duplicate_username() {
        let (mut catalog, _) = catalog_with_user("alice");

        assert!(matches!(
            catalog.create_user(username("alice"), &secret("hunter22")),
            Err(StoreError::UsernameTaken)
        ));
    }

    #[test]
    fn test_create_user_weak_password() {
        let mut catalog = Catalog::default();
        assert!(matches!(
            catalog.create_user(username("alice"), &secret("short")),
            Err(StoreError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_credential_hash_never_plaintext() {
        let (catalog, _) = catalog_with_user("alice");
        let stored = catalog.user_by_name(&username("alice")).unwrap();
        let hash = stored.credential_hash.as_deref().unwrap();
        assert!(!hash.contains("hunter22"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_shadow_user_cannot_authenticate() {
        let mut catalog = Catalog::default();
        catalog.ensure_user(UserId::generate(), &username("remote_user"));

        assert!(matches!(
            catalog.authenticate(&username("remote_user"), &secret("anything1")),
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_ensure_user_is_idempotent() {
        let mut catalog = Catalog::default();
        let id = UserId::generate();
        catalog.ensure_user(id, &username("remote_user"));
        catalog.ensure_user(id, &username("remote_user"));
        assert_eq!(catalog.users.len(), 1);
    }

    #[test]
    fn test_debit_tokens_never_negative() {
        let (mut catalog, user) = catalog_with_user("alice");

        assert_eq!(
            catalog.debit_tokens(user.id, DEFAULT_TOKEN_GRANT).unwrap(),
            0
        );
        assert!(matches!(
            catalog.debit_tokens(user.id, 1),
            Err(StoreError::InsufficientTokens)
        ));
    }

    #[test]
    fn test_create_project_derives_slug_from_title() {
        let (mut catalog, user) = catalog_with_user("alice");

        let project = catalog.create_project(user.id, "My Site", None).unwrap();
        assert_eq!(project.slug.as_str(), "my-site");
        assert!(project.versions.is_empty());
        assert!(project.pinned_version.is_none());
    }

    #[test]
    fn test_create_project_prefers_hint() {
        let (mut catalog, user) = catalog_with_user("alice");

        let project = catalog
            .create_project(user.id, "My Site", Some("Custom Slug"))
            .unwrap();
        assert_eq!(project.slug.as_str(), "custom-slug");

        // A blank hint falls back to the title.
        let project = catalog
            .create_project(user.id, "Other Site", Some("   "))
            .unwrap();
        assert_eq!(project.slug.as_str(), "other-site");
    }

    #[test]
    fn test_create_project_slug_conflict_per_owner() {
        let (mut catalog, alice) = catalog_with_user("alice");
        let bob = catalog
            .create_user(username("bob"), &secret("hunter22"))
            .unwrap();

        catalog.create_project(alice.id, "My Site", None).unwrap();
        assert!(matches!(
            catalog.create_project(alice.id, "My Site", None),
            Err(StoreError::SlugConflict(_))
        ));

        // Slug uniqueness is scoped per owner.
        assert!(catalog.create_project(bob.id, "My Site", None).is_ok());
    }

    #[test]
    fn test_append_version_numbers_sequential() {
        let (mut catalog, user) = catalog_with_user("alice");
        let project = catalog.create_project(user.id, "My Site", None).unwrap();

        for expected in 1..=5u32 {
            let version = catalog
                .append_version(project.id, user.id, format!("<p>{expected}</p>"))
                .unwrap();
            assert_eq!(version.number, expected);
        }

        let numbers: Vec<u32> = catalog
            .project(project.id)
            .unwrap()
            .versions
            .iter()
            .map(|v| v.number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_append_version_interleaved_with_pins() {
        let (mut catalog, user) = catalog_with_user("alice");
        let project = catalog.create_project(user.id, "My Site", None).unwrap();

        catalog
            .append_version(project.id, user.id, "<p>1</p>".to_owned())
            .unwrap();
        catalog.pin_version(project.id, user.id, Some(1)).unwrap();
        let v2 = catalog
            .append_version(project.id, user.id, "<p>2</p>".to_owned())
            .unwrap();

        // Appending never disturbs numbering or the pin.
        assert_eq!(v2.number, 2);
        assert_eq!(
            catalog.project(project.id).unwrap().pinned_version,
            Some(1)
        );
    }

    #[test]
    fn test_append_version_requires_owner() {
        let (mut catalog, alice) = catalog_with_user("alice");
        let bob = catalog
            .create_user(username("bob"), &secret("hunter22"))
            .unwrap();
        let project = catalog.create_project(alice.id, "My Site", None).unwrap();

        assert!(matches!(
            catalog.append_version(project.id, bob.id, "<p>x</p>".to_owned()),
            Err(StoreError::Forbidden)
        ));
    }

    #[test]
    fn test_pin_version_requires_existing_version() {
        let (mut catalog, user) = catalog_with_user("alice");
        let project = catalog.create_project(user.id, "My Site", None).unwrap();

        assert!(matches!(
            catalog.pin_version(project.id, user.id, Some(1)),
            Err(StoreError::VersionNotFound(1))
        ));

        catalog
            .append_version(project.id, user.id, "<p>1</p>".to_owned())
            .unwrap();
        catalog.pin_version(project.id, user.id, Some(1)).unwrap();
        assert_eq!(
            catalog.project(project.id).unwrap().pinned_version,
            Some(1)
        );
    }

    #[test]
    fn test_unpin_clears_pin() {
        let (mut catalog, user) = catalog_with_user("alice");
        let project = catalog.create_project(user.id, "My Site", None).unwrap();
        catalog
            .append_version(project.id, user.id, "<p>1</p>".to_owned())
            .unwrap();
        catalog.pin_version(project.id, user.id, Some(1)).unwrap();

        catalog.pin_version(project.id, user.id, None).unwrap();
        assert!(catalog.project(project.id).unwrap().pinned_version.is_none());
    }

    #[test]
    fn test_remix_copies_history_renumbered() {
        let (mut catalog, alice) = catalog_with_user("alice");
        let bob = catalog
            .create_user(username("bob"), &secret("hunter22"))
            .unwrap();
        let project = catalog.create_project(alice.id, "My Site", None).unwrap();
        catalog
            .append_version(project.id, alice.id, "<h1>A</h1>".to_owned())
            .unwrap();
        catalog
            .append_version(project.id, alice.id, "<h1>B</h1>".to_owned())
            .unwrap();
        catalog.pin_version(project.id, alice.id, Some(1)).unwrap();

        let remix = catalog.remix(project.id, bob.id).unwrap();

        assert_eq!(remix.owner, bob.id);
        assert_eq!(remix.slug.as_str(), "my-site");
        // Same ordered content, numbers restarting at 1, pin not carried.
        let contents: Vec<&str> = remix.versions.iter().map(|v| v.content.as_str()).collect();
        assert_eq!(contents, vec!["<h1>A</h1>", "<h1>B</h1>"]);
        let numbers: Vec<u32> = remix.versions.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(remix.pinned_version.is_none());
    }

    #[test]
    fn test_remix_is_independent_of_source() {
        let (mut catalog, alice) = catalog_with_user("alice");
        let bob = catalog
            .create_user(username("bob"), &secret("hunter22"))
            .unwrap();
        let project = catalog.create_project(alice.id, "My Site", None).unwrap();
        catalog
            .append_version(project.id, alice.id, "<h1>A</h1>".to_owned())
            .unwrap();

        let remix = catalog.remix(project.id, bob.id).unwrap();
        catalog
            .append_version(remix.id, bob.id, "<h1>B</h1>".to_owned())
            .unwrap();

        assert_eq!(catalog.project(project.id).unwrap().versions.len(), 1);
        assert_eq!(catalog.project(remix.id).unwrap().versions.len(), 2);
    }

    #[test]
    fn test_remix_slug_collision_suffixes() {
        let (mut catalog, alice) = catalog_with_user("alice");
        let project = catalog.create_project(alice.id, "My Site", None).unwrap();

        // Alice remixes her own project twice; the slug is taken each time.
        let first = catalog.remix(project.id, alice.id).unwrap();
        assert_eq!(first.slug.as_str(), "my-site-2");
        let second = catalog.remix(project.id, alice.id).unwrap();
        assert_eq!(second.slug.as_str(), "my-site-3");
    }

    #[test]
    fn test_record_view_increments() {
        let (mut catalog, user) = catalog_with_user("alice");
        let project = catalog.create_project(user.id, "My Site", None).unwrap();

        assert_eq!(catalog.record_view(project.id).unwrap(), 1);
        assert_eq!(catalog.record_view(project.id).unwrap(), 2);
        assert!(matches!(
            catalog.record_view(ProjectId::generate()),
            Err(StoreError::ProjectNotFound)
        ));
    }

    #[test]
    fn test_summaries_ordered_by_views() {
        let (mut catalog, user) = catalog_with_user("alice");
        let quiet = catalog.create_project(user.id, "Quiet", None).unwrap();
        let busy = catalog.create_project(user.id, "Busy", None).unwrap();
        catalog.record_view(busy.id).unwrap();
        catalog.record_view(busy.id).unwrap();
        catalog.record_view(quiet.id).unwrap();

        let rows = catalog.summaries();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.first().unwrap().slug.as_str(), "busy");
    }

    #[test]
    fn test_popular_users_aggregates() {
        let (mut catalog, alice) = catalog_with_user("alice");
        let bob = catalog
            .create_user(username("bob"), &secret("hunter22"))
            .unwrap();
        let project = catalog.create_project(alice.id, "My Site", None).unwrap();
        catalog.record_view(project.id).unwrap();

        let rows = catalog.popular_users();
        // Bob has no projects and is omitted.
        assert_eq!(rows.len(), 1);
        let row = rows.first().unwrap();
        assert_eq!(row.username.as_str(), "alice");
        assert_eq!(row.views, 1);
        assert_eq!(row.project_count, 1);
        assert!(catalog.user(bob.id).is_some());
    }
}
