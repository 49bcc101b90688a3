use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use learnhub_core::error::AppError;

use crate::{
    dtos::auth::{RegisterRequest, RegisterResponse},
    utils::validation::ValidatedJson,
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth.register(&request).await.map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.sanitized(),
        }),
    ))
}
