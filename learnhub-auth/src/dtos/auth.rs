use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Device id is required"))]
    pub device_id: String,
}

/// Either a full session or a partial, two-factor-gated one.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub requires_two_factor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<TwoFactorEnrollment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

/// Out-of-band enrollment material for an authenticator app.
#[derive(Debug, Serialize)]
pub struct TwoFactorEnrollment {
    pub otpauth_url: String,
    pub qr_data_url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TwoFactorVerifyRequest {
    #[validate(length(min = 6, max = 8, message = "Code must be 6-8 digits"))]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct TwoFactorVerifyResponse {
    pub message: String,
    /// Present when verification completed a pending login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Captcha token is required"))]
    pub captcha_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollRequest {
    pub user_id: uuid::Uuid,
    pub course_id: uuid::Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CourseRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    pub first_video_link: Option<String>,
    pub live_video_link: Option<String>,
    pub archived_video_link: Option<String>,
}
