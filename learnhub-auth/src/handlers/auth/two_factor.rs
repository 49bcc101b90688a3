use axum::{extract::State, response::IntoResponse, Json};
use learnhub_core::error::AppError;

use crate::{
    dtos::auth::{TwoFactorVerifyRequest, TwoFactorVerifyResponse},
    middleware::{AuthUser, CurrentUser},
    services::TokenScope,
    utils::validation::ValidatedJson,
    AppState,
};

/// Begin (or restart) enrollment: generates a fresh secret and returns the
/// material to add it to an authenticator app. Requires a full session.
pub async fn setup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let enrollment = state.two_factor.setup(&user).await.map_err(AppError::from)?;

    Ok(Json(enrollment))
}

/// Submit a proof. Reached with either credential scope: a full session
/// finishing enrollment from settings, or a two-factor-scoped one completing
/// a pending login, in which case a full session token is returned.
pub async fn verify(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidatedJson(request): ValidatedJson<TwoFactorVerifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id().map_err(AppError::Unauthorized)?;

    state
        .two_factor
        .check_proof(user_id, &request.code)
        .await
        .map_err(AppError::from)?;

    let response = match claims.scope {
        TokenScope::TwoFactor => {
            state
                .two_factor
                .enable_and_bind(user_id, &claims.device_id)
                .await
                .map_err(AppError::from)?;

            let token = state
                .jwt
                .issue_session(user_id, &claims.device_id)
                .map_err(AppError::InternalError)?;

            TwoFactorVerifyResponse {
                message: "Two-factor verification successful".to_string(),
                token: Some(token),
            }
        }
        TokenScope::Full => {
            state
                .two_factor
                .enable(user_id)
                .await
                .map_err(AppError::from)?;

            TwoFactorVerifyResponse {
                message: "Two-factor authentication enabled".to_string(),
                token: None,
            }
        }
    };

    Ok(Json(response))
}
