/// Shared application state
use crate::{
    config::ServerConfig,
    services::{AuthService, Library},
};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub auth_service: Arc<AuthService>,
    pub library: Arc<Library>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>, auth_service: Arc<AuthService>, library: Arc<Library>) -> Self {
        Self {
            config,
            auth_service,
            library,
        }
    }
}
