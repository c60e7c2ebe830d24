//! Shared application state for the token server.

use crate::api::SessionTokenClient;
use crate::config::ServerConfig;

/// Application state shared across HTTP handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub token_client: SessionTokenClient,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: ServerConfig) -> Self {
        let token_client = SessionTokenClient::from_config(&config);
        Self {
            config,
            token_client,
        }
    }
}
