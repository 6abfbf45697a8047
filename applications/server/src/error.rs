/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use libra_core::LibraError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Libra(#[from] LibraError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<libra_storage::StorageError> for ServerError {
    fn from(err: libra_storage::StorageError) -> Self {
        ServerError::Libra(err.into())
    }
}

impl ServerError {
    /// Status and client-facing message; internal detail is logged, not returned
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::Libra(err) => libra_status(err),
            ServerError::Jwt(e) => {
                tracing::debug!("JWT rejected: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid or expired JWT".to_string())
            }
            ServerError::Config(msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            ServerError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password error".to_string(),
                )
            }
        }
    }
}

fn libra_status(err: &LibraError) -> (StatusCode, String) {
    match err {
        LibraError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        LibraError::Duplicate(_) | LibraError::InvalidInput(_) | LibraError::InvalidSource(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        LibraError::UnsupportedMediaType(_) | LibraError::UnsupportedSourceType(_) => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, err.to_string())
        }
        LibraError::Invalidated => (StatusCode::UNAUTHORIZED, "Token invalidated".to_string()),
        LibraError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        LibraError::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        LibraError::Source { .. } => {
            tracing::error!("Source error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Source error".to_string(),
            )
        }
        LibraError::Backend(_) | LibraError::BackendUnavailable(_) => {
            tracing::error!("Database error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            )
        }
        LibraError::Io(_) | LibraError::Serialization(_) => {
            tracing::error!("Internal error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_catalog_kinds_to_statuses() {
        let cases = [
            (LibraError::not_found("track", "t1"), StatusCode::NOT_FOUND),
            (LibraError::Duplicate("user".into()), StatusCode::BAD_REQUEST),
            (LibraError::invalid_input("bad"), StatusCode::BAD_REQUEST),
            (
                LibraError::UnsupportedMediaType("album".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (LibraError::Invalidated, StatusCode::UNAUTHORIZED),
            (LibraError::Unauthorized("no".into()), StatusCode::FORBIDDEN),
            (LibraError::Backend("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ServerError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn hides_backend_detail() {
        let (_, message) =
            ServerError::from(LibraError::Backend("password=hunter2".into())).status_and_message();
        assert_eq!(message, "Database error");
    }
}
