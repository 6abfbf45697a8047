/// Core error types for Libra
use thiserror::Error;

/// Result type alias using `LibraError`
pub type Result<T> = std::result::Result<T, LibraError>;

/// Core error type for Libra
///
/// Each variant is one abstract failure kind; the HTTP layer maps kinds to
/// status codes and the aggregator decides which kinds are fatal.
#[derive(Error, Debug)]
pub enum LibraError {
    /// A single-row fetch matched nothing
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `track`
        entity: String,
        /// Identifier that was looked up
        id: String,
    },

    /// Uniqueness violation on add/register
    #[error("duplicate {0}")]
    Duplicate(String),

    /// The database driver reported a connection-level failure
    #[error("database unavailable: {0}")]
    BackendUnavailable(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Backend(String),

    /// Parse or validation failure
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Capability call for a media type the source does not handle
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Capability call for a source type the source does not provide
    #[error("unsupported source type: {0}")]
    UnsupportedSourceType(String),

    /// No registered prototype matches the id
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// An external source returned an error or timed out
    #[error("source {source_id} failed: {message}")]
    Source {
        /// Id of the failing source
        source_id: String,
        /// Failure description
        message: String,
    },

    /// Token is on the blacklist
    #[error("token invalidated")]
    Invalidated,

    /// Missing or invalid credentials
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid identity without the needed permission
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl LibraError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a source failure
    pub fn source(source_id: impl Into<String>, msg: impl ToString) -> Self {
        Self::Source {
            source_id: source_id.into(),
            message: msg.to_string(),
        }
    }

    /// Whether this is a `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
