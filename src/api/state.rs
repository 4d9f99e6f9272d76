//! Application state shared across handlers

use crate::db::ErrorStore;

/// Shared application state. The store is injected at startup; handlers never
/// reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub store: ErrorStore,
}

impl AppState {
    pub fn new(store: ErrorStore) -> Self {
        Self { store }
    }
}
