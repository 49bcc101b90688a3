use axum::{extract::State, response::IntoResponse, Json};
use learnhub_core::error::AppError;

use crate::{
    dtos::auth::{LoginRequest, LoginResponse},
    middleware::CurrentUser,
    services::LoginOutcome,
    utils::validation::ValidatedJson,
    AppState,
};

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth
        .login(&request.email, &request.password, &request.device_id)
        .await
        .map_err(AppError::from)?;

    let response = match outcome {
        LoginOutcome::Complete { token, user } => LoginResponse {
            token,
            requires_two_factor: false,
            enrollment: None,
            user: Some(user.sanitized()),
        },
        LoginOutcome::TwoFactorRequired {
            token,
            pending_secret,
            email,
        } => {
            // Enrollment is still pending: show the material again so the
            // owner can finish adding the account to their authenticator.
            let enrollment = match pending_secret {
                Some(secret) => Some(
                    state
                        .two_factor
                        .enrollment_for(&secret, &email)
                        .map_err(AppError::from)?,
                ),
                None => None,
            };

            LoginResponse {
                token,
                requires_two_factor: true,
                enrollment,
                user: None,
            }
        }
    };

    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    state.auth.logout(user.id).await.map_err(AppError::from)?;

    Ok(Json(serde_json::json!({
        "message": "Logged out successfully"
    })))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user.sanitized()))
}
