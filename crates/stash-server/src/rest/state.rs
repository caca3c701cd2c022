//! Application state for Axum handlers.

use stash_cache::CacheAside;
use stash_service::UserService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub cache: CacheAside,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(user_service: Arc<dyn UserService>, cache: CacheAside) -> Self {
        Self {
            user_service,
            cache,
        }
    }
}
