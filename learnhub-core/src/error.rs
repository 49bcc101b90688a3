use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Device mismatch: {0}")]
    DeviceMismatch(String),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            code: &'static str,
        }

        let (status, code, error_message) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failure",
                err.to_string(),
            ),
            AppError::BadRequest(err) => {
                (StatusCode::BAD_REQUEST, "validation_failure", err.to_string())
            }
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
            AppError::Unauthorized(err) => (
                StatusCode::UNAUTHORIZED,
                "authentication_failure",
                err.to_string(),
            ),
            AppError::Forbidden(err) => (
                StatusCode::FORBIDDEN,
                "authorization_failure",
                err.to_string(),
            ),
            AppError::DeviceMismatch(msg) => (StatusCode::FORBIDDEN, "device_mismatch", msg),
            AppError::Conflict(err) => (StatusCode::CONFLICT, "state_conflict", err.to_string()),
            AppError::InternalError(err) => {
                // Full context stays server-side; the client sees an opaque failure.
                tracing::error!(error = ?err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
            AppError::BadGateway(msg) => {
                tracing::error!(error = %msg, "Upstream service failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "external_service_failure",
                    "Upstream service failure".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                tracing::error!(error = ?err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
            AppError::InvalidToken(err) => {
                tracing::debug!(error = %err, "Token validation failed");
                (
                    StatusCode::UNAUTHORIZED,
                    "authentication_failure",
                    "Invalid or expired token".to_string(),
                )
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = ?err, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                code,
            }),
        )
            .into_response()
    }
}
