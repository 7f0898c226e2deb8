//! Location watching.
//!
//! Two values can claim to be "the current path": the one a routing
//! framework reports, and the one the environment actually holds. After a
//! fallback load the framework value can lag, so the watcher only uses it
//! as a signal to re-read the environment.

use tokio::sync::watch;

use crate::route::{self, RouteMatch};

/// Read access to the authoritative current path.
pub trait LocationSource: Send + Sync {
    /// The current path, or `None` if it is not known yet.
    fn pathname(&self) -> Option<String>;
}

impl<F> LocationSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn pathname(&self) -> Option<String> {
        self()
    }
}

/// Observable state of a [`RouteWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteState {
    /// The real path has not been observed yet. Render a placeholder.
    Unresolved,
    /// The path was observed and resolved.
    Resolved(RouteMatch),
}

impl RouteState {
    pub fn route(&self) -> Option<&RouteMatch> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(m) => Some(m),
        }
    }
}

/// Keeps a [`RouteState`] in sync with a [`LocationSource`].
pub struct RouteWatcher<S> {
    source: S,
    tx: watch::Sender<RouteState>,
}

impl<S: LocationSource> RouteWatcher<S> {
    /// Create a watcher. The state starts `Unresolved` until the first
    /// [`refresh`](Self::refresh).
    pub fn new(source: S) -> Self {
        let (tx, _rx) = watch::channel(RouteState::Unresolved);
        Self { source, tx }
    }

    /// Re-read the source and update the state.
    ///
    /// Subscribers are only woken if the resolved route changed.
    pub fn refresh(&self) -> RouteState {
        let Some(path) = self.source.pathname() else {
            tracing::trace!("location not known yet");
            return self.current();
        };

        let next = RouteState::Resolved(route::resolve(&path));
        self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                tracing::debug!(path = %path, "route changed");
                *state = next.clone();
                true
            }
        });
        next
    }

    /// A navigation was reported. The reported path is a trigger only.
    pub fn notify(&self, reported_path: &str) -> RouteState {
        let state = self.refresh();
        if let Some(m) = state.route()
            && m.raw_path() != reported_path
        {
            tracing::debug!(
                reported = %reported_path,
                observed = %m.raw_path(),
                "reported path differs from observed location"
            );
        }
        state
    }

    pub fn current(&self) -> RouteState {
        self.tx.borrow().clone()
    }

    /// Subscribe to route changes.
    pub fn subscribe(&self) -> watch::Receiver<RouteState> {
        self.tx.subscribe()
    }
}
