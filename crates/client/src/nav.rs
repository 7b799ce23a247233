//! Navigation: history, link interception, last-requested-wins rendering.
//!
//! [`NavigationController`] is the single authority for what path is
//! current. History entries update synchronously when a navigation is
//! requested; the resolved view is committed only if no newer navigation
//! arrived while it was in flight, so the visible content always reflects
//! the most recently requested path and the URL bar and rendered view
//! never disagree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use url::Url;

use crate::router::{Params, RouteTable};

/// Resolves a matched route into a view.
///
/// The controller stays independent of the application's concrete
/// screens; the app implements this seam and tests substitute toy
/// resolvers.
#[allow(async_fn_in_trait)]
pub trait ViewResolver {
    /// Handler type registered in the route table.
    type Handler: Clone;
    /// View model produced for the caller.
    type View: Clone;

    /// Produce the view for a resolved route.
    async fn resolve(&self, handler: Self::Handler, params: Params) -> Self::View;

    /// The 404-equivalent view for an unmatched path.
    fn not_found(&self, path: &str) -> Self::View;
}

/// What to do with an activated link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDisposition {
    /// Same-origin navigation: convert into a `navigate` call, keeping
    /// SPA state alive.
    Intercept(String),
    /// Leave to default browser handling.
    Browser,
}

/// Classify an anchor activation.
///
/// Fragment-only references, `mailto:`/`tel:` schemes, and cross-origin
/// targets stay with the browser. Anything same-origin is intercepted
/// with its path and query preserved.
#[must_use]
pub fn classify_link(origin: &Url, href: &str) -> LinkDisposition {
    if href.is_empty() || href.starts_with('#') {
        return LinkDisposition::Browser;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("mailto:") || lower.starts_with("tel:") {
        return LinkDisposition::Browser;
    }

    match origin.join(href) {
        Ok(resolved) if resolved.origin() == origin.origin() => {
            let mut target = resolved.path().to_owned();
            if let Some(query) = resolved.query() {
                target.push('?');
                target.push_str(query);
            }
            LinkDisposition::Intercept(target)
        }
        _ => LinkDisposition::Browser,
    }
}

/// Owns the current location and triggers route resolution.
pub struct NavigationController<R: ViewResolver> {
    inner: Arc<NavInner<R>>,
}

impl<R: ViewResolver> Clone for NavigationController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct NavInner<R: ViewResolver> {
    table: RouteTable<R::Handler>,
    resolver: R,
    /// Stamp handed to each navigation request; only the view carrying
    /// the newest stamp may commit.
    epoch: AtomicU64,
    state: Mutex<NavState<R::View>>,
}

struct NavState<V> {
    /// History entries, full targets including any query string.
    entries: Vec<String>,
    index: usize,
    view: Option<V>,
}

impl<R: ViewResolver> NavigationController<R> {
    /// Create a controller over a route table and resolver.
    pub fn new(table: RouteTable<R::Handler>, resolver: R) -> Self {
        Self {
            inner: Arc::new(NavInner {
                table,
                resolver,
                epoch: AtomicU64::new(0),
                state: Mutex::new(NavState {
                    entries: vec!["/".to_owned()],
                    index: 0,
                    view: None,
                }),
            }),
        }
    }

    /// Request navigation to `target` (a path with optional query).
    ///
    /// Pushes a history entry - or replaces the current one - before any
    /// suspension point, then resolves. Navigating to the already-current
    /// target still re-resolves: views are expected to refresh
    /// themselves.
    ///
    /// Returns whether the resolved view was committed, i.e. this
    /// navigation was not superseded while in flight.
    pub async fn navigate(&self, target: &str, replace: bool) -> bool {
        {
            let mut state = self.lock_state();
            if replace {
                let index = state.index;
                if let Some(entry) = state.entries.get_mut(index) {
                    *entry = target.to_owned();
                }
            } else {
                let keep = state.index + 1;
                state.entries.truncate(keep);
                state.entries.push(target.to_owned());
                state.index = state.entries.len() - 1;
            }
        }
        self.render(target).await
    }

    /// Browser back gesture: move the index and re-resolve without
    /// creating a new entry.
    pub async fn back(&self) -> bool {
        let target = {
            let mut state = self.lock_state();
            if state.index == 0 {
                return false;
            }
            state.index -= 1;
            state.entries.get(state.index).cloned()
        };
        match target {
            Some(target) => self.render(&target).await,
            None => false,
        }
    }

    /// Browser forward gesture.
    pub async fn forward(&self) -> bool {
        let target = {
            let mut state = self.lock_state();
            if state.index + 1 >= state.entries.len() {
                return false;
            }
            state.index += 1;
            state.entries.get(state.index).cloned()
        };
        match target {
            Some(target) => self.render(&target).await,
            None => false,
        }
    }

    /// The target the history currently points at.
    #[must_use]
    pub fn current_path(&self) -> String {
        let state = self.lock_state();
        state
            .entries
            .get(state.index)
            .cloned()
            .unwrap_or_else(|| "/".to_owned())
    }

    /// The most recently committed view.
    #[must_use]
    pub fn current_view(&self) -> Option<R::View> {
        self.lock_state().view.clone()
    }

    /// Number of history entries (for tests and debugging).
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.lock_state().entries.len()
    }

    async fn render(&self, target: &str) -> bool {
        // The stamp is taken before the first suspension point, so
        // request order decides which navigation is newest, not
        // completion order.
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let (path, query) = split_target(target);
        let view = match self.inner.table.resolve(&path) {
            Some(matched) => {
                let mut params = matched.params;
                params.set_query(query);
                self.inner.resolver.resolve(matched.handler, params).await
            }
            None => self.inner.resolver.not_found(&path),
        };

        if self.inner.epoch.load(Ordering::SeqCst) == epoch {
            self.lock_state().view = Some(view);
            true
        } else {
            debug!(target, "navigation superseded, discarding resolved view");
            false
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, NavState<R::View>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn split_target(target: &str) -> (String, HashMap<String, String>) {
    match target.split_once('?') {
        Some((path, query)) => {
            let pairs = url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            (path.to_owned(), pairs)
        }
        None => (target.to_owned(), HashMap::new()),
    }
}
