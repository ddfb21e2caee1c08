use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use dashmap::DashMap;
use scholarboard_core::{Dashboard, SelectionState};
use tokio::time::Instant;

/// Header naming the browser session an edit belongs to.
pub const SESSION_HEADER: &str = "x-session-id";
const DEFAULT_SESSION: &str = "default";

/// Sessions untouched for this long are dropped, open dialogs included.
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct SessionEntry {
    selection: Arc<SelectionState>,
    last_seen: Instant,
}

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub dashboard: Dashboard,
    /// Edit-dialog state of sessions that have a dialog open.
    sessions: DashMap<String, SessionEntry>,
}

/// Session named in `headers`, or the shared default session.
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            sessions: DashMap::new(),
        }
    }

    /// Selection state for `id`, created on first use. Only open calls create one.
    pub fn session(&self, id: &str) -> Arc<SelectionState> {
        let mut entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionEntry {
                selection: Arc::new(SelectionState::new()),
                last_seen: Instant::now(),
            });
        entry.last_seen = Instant::now();
        Arc::clone(&entry.selection)
    }

    /// Selection state for `id` if the session has one.
    pub fn existing_session(&self, id: &str) -> Option<Arc<SelectionState>> {
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_seen = Instant::now();
            Arc::clone(&entry.selection)
        })
    }

    /// Forget `id` once both dialogs are closed and no request still holds
    /// its state. Callers must drop their own handle first.
    pub fn release_if_idle(&self, id: &str) {
        self.sessions.remove_if(id, |_, entry| {
            Arc::strong_count(&entry.selection) == 1 && entry.selection.is_idle()
        });
    }

    /// Drop sessions not touched within `ttl`. Returns how many were removed.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.last_seen.elapsed() < ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Evict expired sessions every minute for the life of the server.
pub fn spawn_session_sweeper(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = state.evict_expired(SESSION_TTL);
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = state.session_count(),
                    "evicted expired sessions"
                );
            }
        }
    })
}
