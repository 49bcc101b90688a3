use learnhub_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already exists")]
    EmailAlreadyRegistered,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token has already been used")]
    TokenAlreadyUsed,

    #[error("User not found")]
    UserNotFound,

    #[error("Course not found")]
    CourseNotFound,

    #[error("No secret set")]
    NoTwoFactorSecret,

    #[error("Invalid two-factor code")]
    InvalidTwoFactorCode,

    #[error("Captcha verification failed")]
    CaptchaRejected,

    #[error("Captcha service unavailable: {0}")]
    CaptchaUnavailable(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already exists"))
            }
            ServiceError::InvalidToken => AppError::NotFound(anyhow::anyhow!("Invalid token")),
            ServiceError::TokenExpired => AppError::Unauthorized(anyhow::anyhow!("Token expired")),
            ServiceError::TokenAlreadyUsed => {
                AppError::Conflict(anyhow::anyhow!("Token has already been used"))
            }
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::CourseNotFound => {
                AppError::NotFound(anyhow::anyhow!("Course not found"))
            }
            ServiceError::NoTwoFactorSecret => {
                AppError::BadRequest(anyhow::anyhow!("No secret set"))
            }
            ServiceError::InvalidTwoFactorCode => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid two-factor code"))
            }
            ServiceError::CaptchaRejected => {
                AppError::Unauthorized(anyhow::anyhow!("Captcha verification failed"))
            }
            ServiceError::CaptchaUnavailable(e) => AppError::BadGateway(e),
            ServiceError::ValidationError(e) => AppError::BadRequest(anyhow::anyhow!(e)),
        }
    }
}
