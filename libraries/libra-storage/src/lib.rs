//! Libra Storage
//!
//! SQLite and PostgreSQL implementation of the Libra catalog.
//!
//! # Architecture
//!
//! - **Two engines, one query set**: every query is written once with `$N`
//!   placeholders and dispatched over [`DbPool`]
//! - **Vertical Slicing**: each entity kind owns its own queries and row mapping
//! - **JSON columns**: list and map fields are stored as JSON (TEXT on SQLite,
//!   JSONB on PostgreSQL)
//! - **Embedded migrations**: reversible, per engine, applied in steps
//!
//! # Example
//!
//! ```rust,no_run
//! use libra_core::CatalogStore;
//! use libra_storage::{DatabaseConfig, SqlCatalog};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = SqlCatalog::connect(&DatabaseConfig::default()).await?;
//! catalog.migrate_up(-1).await?;
//!
//! let tracks = catalog.get_all_tracks().await?;
//! # Ok(())
//! # }
//! ```

/// Run the same query code against whichever engine backs the pool.
///
/// The body is expanded once per arm, so it must type-check for both
/// `SqlitePool` and `PgPool`.
macro_rules! with_pool {
    ($pool:expr, |$conn:ident| $body:expr) => {
        match $pool {
            $crate::pool::DbPool::Sqlite($conn) => $body,
            $crate::pool::DbPool::Postgres($conn) => $body,
        }
    };
}

mod config;
mod context;
mod error;
mod migrations;
mod pool;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod playlists;
pub mod tokens;
pub mod tracks;
pub mod users;
pub mod videos;

pub use config::{DatabaseConfig, DatabaseEngine, PostgresConfig, SqliteConfig};
pub use context::SqlCatalog;
pub use error::{Result, StorageError};
pub use migrations::{migrate_down, migrate_up};
pub use pool::DbPool;

/// Fail with `NotFound` when a write matched no rows
pub(crate) fn require_affected(rows: u64, entity: &str, id: &str) -> Result<()> {
    if rows == 0 {
        Err(StorageError::not_found(entity, id))
    } else {
        Ok(())
    }
}
