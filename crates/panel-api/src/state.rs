//! Shared application state.

use std::sync::Arc;

use panel_catalog::AccountCatalog;
use panel_config::PathsConfig;
use panel_lifecycle::LifecycleCoordinator;
use panel_store::ApiKeyStore;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<LifecycleCoordinator>,
    pub keys: Arc<ApiKeyStore>,
}

impl AppState {
    pub fn new(coordinator: Arc<LifecycleCoordinator>, keys: Arc<ApiKeyStore>) -> Self {
        AppState { coordinator, keys }
    }

    pub fn catalog(&self) -> &AccountCatalog {
        self.coordinator.catalog()
    }

    pub fn paths(&self) -> &PathsConfig {
        self.coordinator.paths()
    }
}
