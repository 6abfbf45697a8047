//! Libra Server Library
//!
//! Self-hosted media aggregation server: a catalog with accounts and JWT auth,
//! search fanned out over pluggable sources, and an on-disk content cache.
//!
//! This library exposes the core components so the binary and the
//! integration tests assemble the same application.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::{LoadOptions, ServerConfig};
pub use error::{Result, ServerError};
pub use services::{AuthService, ContentCache, Library};
pub use state::AppState;
