/// Server services
pub mod auth;
pub mod content_cache;
pub mod library;

pub use auth::AuthService;
pub use content_cache::{ContentCache, SweepReport};
pub use library::{CachedContent, Library, TextLookup};
