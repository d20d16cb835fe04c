pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod store;

use std::sync::Arc;

use services::embed::Provider;
use services::mode_selector::ModeConfigSource;
use services::session::SessionRegistry;
use store::VideoStore;

/// Shared by every handler.
pub struct AppState {
    pub store: Arc<dyn VideoStore>,
    pub mode_source: Arc<dyn ModeConfigSource>,
    pub sessions: SessionRegistry,
    pub default_provider: Provider,
}

impl AppState {
    pub fn new(
        store: Arc<dyn VideoStore>,
        mode_source: Arc<dyn ModeConfigSource>,
        default_provider: Provider,
    ) -> Self {
        Self {
            store,
            mode_source,
            sessions: SessionRegistry::new(),
            default_provider,
        }
    }

    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = sessions;
        self
    }
}
