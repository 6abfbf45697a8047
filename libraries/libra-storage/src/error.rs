/// Storage-specific errors
use libra_core::LibraError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violated
    #[error("duplicate {0}")]
    Duplicate(String),

    /// Connection-level failure (I/O, TLS, pool exhausted or closed)
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Invalid database configuration
    #[error("invalid database configuration: {0}")]
    Config(String),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),

    /// Any other driver error
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("row", ""),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Duplicate(db.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err.to_string()),
            other => Self::Database(other),
        }
    }
}

impl From<StorageError> for LibraError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => LibraError::NotFound { entity, id },
            StorageError::Duplicate(what) => LibraError::Duplicate(what),
            StorageError::Unavailable(msg) => LibraError::BackendUnavailable(msg),
            other => LibraError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_driver_errors() {
        assert!(matches!(
            StorageError::from(sqlx::Error::PoolTimedOut),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            StorageError::from(sqlx::Error::RowNotFound),
            StorageError::NotFound { .. }
        ));
        assert!(matches!(
            StorageError::from(sqlx::Error::ColumnNotFound("x".to_string())),
            StorageError::Database(_)
        ));
    }

    #[test]
    fn maps_onto_core_taxonomy() {
        let core: LibraError = StorageError::not_found("track", "abc").into();
        assert!(core.is_not_found());

        let core: LibraError = StorageError::Unavailable("down".to_string()).into();
        assert!(matches!(core, LibraError::BackendUnavailable(_)));

        let core: LibraError = StorageError::Duplicate("username".to_string()).into();
        assert!(matches!(core, LibraError::Duplicate(_)));
    }
}
