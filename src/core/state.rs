// Application state (AppState)

use crate::metrics::collector::Metrics;
use crate::stores::user_store::UserStore;
use std::sync::Arc;

/// Shared application state
///
/// Passed explicitly to every handler; tests build one per case around
/// their own in-memory store.
#[derive(Clone)]
pub struct AppState {
    /// Record store for users
    pub user_store: Arc<UserStore>,

    /// Per-operation request counters
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(user_store: UserStore) -> Self {
        Self {
            user_store: Arc::new(user_store),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
