//! Shared application state injected into every Axum handler.

use crate::config::AuthorizationsMode;
use crate::order::OrderStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable so that Axum can clone the state for each
/// request without copying the order list itself.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide registry of created orders.
    pub orders: OrderStore,
    /// How `authorizations` is populated on finalize responses.
    pub finalize_authorizations: AuthorizationsMode,
}

impl AppState {
    /// Create a new [`AppState`] with the provided store and behavior.
    pub fn new(orders: OrderStore, finalize_authorizations: AuthorizationsMode) -> Self {
        Self {
            orders,
            finalize_authorizations,
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with an empty store, suitable for tests.
    fn default() -> Self {
        Self::new(OrderStore::new(), AuthorizationsMode::Empty)
    }
}
