/// Request middleware
pub mod auth;

pub use auth::{global_api_auth, require_auth, user_api_auth, AuthenticatedUser};
