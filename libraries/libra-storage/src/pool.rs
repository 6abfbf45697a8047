//! Connection pools for the supported engines

use crate::config::{DatabaseConfig, DatabaseEngine};
use crate::error::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// A pool for one of the supported engines
///
/// Queries are written once and dispatched to the matching arm with
/// the crate-internal `with_pool!` macro.
#[derive(Debug, Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl DbPool {
    /// Connect using the configured engine
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.engine {
            DatabaseEngine::Sqlite => Self::connect_sqlite(&config.sqlite.path).await,
            DatabaseEngine::Postgresql => {
                Self::connect_postgres(&config.postgresql.connection_url()).await
            }
        }
    }

    /// Open (creating if needed) a SQLite database file
    pub async fn connect_sqlite(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening sqlite database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!(path = %path.display(), "connected to sqlite");
        Ok(Self::Sqlite(pool))
    }

    /// Connect to PostgreSQL from a `postgres://` URL
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(url)?;
        debug!(host = options.get_host(), "connecting to postgresql");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        info!("connected to postgresql");
        Ok(Self::Postgres(pool))
    }

    pub fn engine(&self) -> DatabaseEngine {
        match self {
            DbPool::Sqlite(_) => DatabaseEngine::Sqlite,
            DbPool::Postgres(_) => DatabaseEngine::Postgresql,
        }
    }

    pub async fn close(&self) {
        match self {
            DbPool::Sqlite(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
        }
    }
}
