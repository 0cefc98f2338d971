use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token revoked")]
    TokenRevoked,

    /// The database file exists but cannot be parsed.
    /// Only surfaced from startup; never mapped to a per-request status.
    #[error("Database file is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Password hashing error")]
    Hashing,

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "Email already registered".to_string(),
            ),
            AppError::ValidationFailed(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            // All token failures collapse to 401 on the wire; the distinction
            // stays in the logs.
            AppError::TokenExpired => {
                tracing::debug!("Rejected expired token");
                (StatusCode::UNAUTHORIZED, "Token expired".to_string())
            }
            AppError::TokenInvalid => {
                tracing::debug!("Rejected invalid token");
                (StatusCode::UNAUTHORIZED, "Token invalid".to_string())
            }
            AppError::TokenRevoked => {
                tracing::warn!("Rejected revoked refresh token");
                (StatusCode::UNAUTHORIZED, "Token revoked".to_string())
            }
            AppError::StorageCorrupt(ref e) => {
                tracing::error!("Storage corruption surfaced at request time: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Hashing => {
                tracing::error!("Password hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
