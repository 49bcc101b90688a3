use axum::{extract::State, response::IntoResponse, Json};
use learnhub_core::error::AppError;

use crate::AppState;

/// Admin-only account listing. Responses carry sanitized views only.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.auth.list_users().await.map_err(AppError::from)?;

    Ok(Json(users))
}
