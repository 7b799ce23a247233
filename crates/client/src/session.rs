//! Session cache.
//!
//! In-memory authentication state mirrored into the durable local record.
//! The cached value seeds the state on boot to avoid a flash of
//! logged-out UI, but it is provisional: the server's answer replaces it
//! whenever the server can be reached. Under disconnection the
//! provisional value is the best-effort session of record.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use crate::models::CurrentUser;
use crate::persist::{LocalStore, RemoteApi};

/// Authentication state of the browsing context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet determined: no cached identity and no server answer.
    #[default]
    Unknown,
    /// Confirmed or assumed logged out.
    Anonymous,
    /// A known identity, provisional until reconciled.
    Authenticated(CurrentUser),
}

impl SessionState {
    /// The identity, if authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Unknown | Self::Anonymous => None,
        }
    }

    /// Whether an identity is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// The session cache.
pub struct SessionCache {
    local: Arc<LocalStore>,
    state: Mutex<SessionState>,
}

impl SessionCache {
    /// Initialize from the durable record, provisionally.
    #[must_use]
    pub fn boot(local: Arc<LocalStore>) -> Self {
        let state = local
            .cached_session()
            .map_or(SessionState::Unknown, SessionState::Authenticated);
        if state.is_authenticated() {
            debug!("session seeded from local cache");
        }
        Self {
            local,
            state: Mutex::new(state),
        }
    }

    /// The current state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.lock().clone()
    }

    /// Confirm identity against the remote identity service.
    ///
    /// The server's answer wins and is written through to the durable
    /// cache (cleared when the server reports anonymous). When the server
    /// is unreachable the provisional value is retained until the next
    /// successful reconciliation.
    #[instrument(skip_all)]
    pub async fn reconcile<A: RemoteApi>(&self, remote: &A) {
        match remote.who_am_i().await {
            Ok(Some(user)) => {
                self.write_cache(Some(user.clone()));
                *self.lock() = SessionState::Authenticated(user);
            }
            Ok(None) => {
                self.write_cache(None);
                *self.lock() = SessionState::Anonymous;
            }
            Err(e) if e.is_unavailable() => {
                debug!("identity service unreachable, keeping provisional session");
            }
            Err(e) => {
                warn!(error = %e, "session check failed, keeping provisional session");
            }
        }
    }

    /// Record a successful login or signup.
    pub fn set_authenticated(&self, user: CurrentUser) {
        self.write_cache(Some(user.clone()));
        *self.lock() = SessionState::Authenticated(user);
    }

    /// Clear the session locally, then notify the remote service.
    ///
    /// The notification is best-effort; failing to reach the service
    /// never blocks the local transition to anonymous.
    #[instrument(skip_all)]
    pub async fn logout<A: RemoteApi>(&self, remote: &A) {
        self.write_cache(None);
        *self.lock() = SessionState::Anonymous;

        if let Err(e) = remote.logout().await {
            debug!(error = %e, "remote logout notification failed");
        }
    }

    fn write_cache(&self, session: Option<CurrentUser>) {
        if let Err(e) = self.local.set_session(session) {
            warn!(error = %e, "failed to persist session to local cache");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use siteulation_core::{UserId, Username};

    use super::*;

    fn user(name: &str) -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            username: Username::parse(name).unwrap(),
        }
    }

    #[test]
    fn test_boot_without_cache_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalStore::open(dir.path().join("cache.json")));

        let session = SessionCache::boot(local);
        assert_eq!(session.current(), SessionState::Unknown);
    }

    #[test]
    fn test_boot_from_cached_identity_is_provisional_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalStore::open(dir.path().join("cache.json")));
        let alice = user("alice");
        local.set_session(Some(alice.clone())).unwrap();

        let session = SessionCache::boot(local);
        assert_eq!(session.current(), SessionState::Authenticated(alice));
    }

    #[test]
    fn test_set_authenticated_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let local = Arc::new(LocalStore::open(&path));
        let session = SessionCache::boot(Arc::clone(&local));

        let alice = user("alice");
        session.set_authenticated(alice.clone());

        // A fresh boot sees the persisted identity.
        let rebooted = SessionCache::boot(Arc::new(LocalStore::open(&path)));
        assert_eq!(rebooted.current(), SessionState::Authenticated(alice));
    }

    #[test]
    fn test_only_public_fields_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let local = Arc::new(LocalStore::open(&path));
        let session = SessionCache::boot(local);
        session.set_authenticated(user("alice"));

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let cached = json.get("current_session").unwrap();
        assert!(cached.get("id").is_some());
        assert!(cached.get("username").is_some());
        assert!(cached.get("credential_hash").is_none());
        assert!(cached.get("password").is_none());
    }
}
