//! Application state shared across screens.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::persist::{LocalStore, PersistenceAdapter, RemoteApi};
use crate::session::SessionCache;

/// Shared services bundle.
///
/// Cheaply cloneable via `Arc`. Each piece of mutable state has a single
/// writer - the navigation controller for location, the session cache for
/// identity - and screens get read-only access.
pub struct AppState<A> {
    inner: Arc<AppStateInner<A>>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<A> {
    config: ClientConfig,
    adapter: PersistenceAdapter<A>,
    session: SessionCache,
}

impl<A: RemoteApi> AppState<A> {
    /// Create the application state, opening the local record and seeding
    /// the session from it.
    #[must_use]
    pub fn new(config: ClientConfig, remote: A) -> Self {
        let local = Arc::new(LocalStore::open(config.cache_path.clone()));
        let session = SessionCache::boot(Arc::clone(&local));
        let adapter = PersistenceAdapter::new(remote, local);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                adapter,
                session,
            }),
        }
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the persistence adapter.
    #[must_use]
    pub fn adapter(&self) -> &PersistenceAdapter<A> {
        &self.inner.adapter
    }

    /// Get a reference to the session cache.
    #[must_use]
    pub fn session(&self) -> &SessionCache {
        &self.inner.session
    }

    /// Get a reference to the remote backend.
    pub fn remote(&self) -> &A {
        self.inner.adapter.remote()
    }

    /// Get a reference to the durable local record.
    #[must_use]
    pub fn local(&self) -> &LocalStore {
        self.inner.adapter.local()
    }
}
