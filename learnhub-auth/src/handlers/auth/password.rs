use axum::{extract::State, response::IntoResponse, Json};
use learnhub_core::error::AppError;

use crate::{
    dtos::auth::{PasswordResetConfirm, PasswordResetRequest},
    utils::validation::ValidatedJson,
    AppState,
};

/// Start a reset. The bot check gates the whole flow and fails closed; past
/// the gate, the response is identical whether or not the email is
/// registered.
pub async fn request_reset(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .bot_check
        .verify(&request.captcha_token)
        .await
        .map_err(AppError::from)?;

    // The token is persisted for out-of-band delivery; it never appears in
    // the response, which must not disclose whether the account exists.
    let _ = state
        .password_reset
        .request(&request.email)
        .await
        .map_err(AppError::from)?;

    Ok(Json(serde_json::json!({
        "message": "If the email is registered, a reset link has been sent"
    })))
}

pub async fn confirm_reset(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PasswordResetConfirm>,
) -> Result<impl IntoResponse, AppError> {
    state
        .password_reset
        .complete(&request.token, &request.new_password)
        .await
        .map_err(AppError::from)?;

    Ok(Json(serde_json::json!({
        "message": "Password has been reset"
    })))
}
