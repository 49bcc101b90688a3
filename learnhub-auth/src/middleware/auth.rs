use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::IntoResponse,
};
use learnhub_core::error::AppError;

use crate::{
    services::{SessionClaims, TokenScope},
    AppState,
};

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Require a full-scope session credential.
///
/// Two-factor-scope credentials are rejected here; they are only good for
/// the verify endpoint, which sits behind `session_middleware` instead.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&req).ok_or_else(|| {
        AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
    })?;

    let claims = state.jwt.verify(token).map_err(AppError::InvalidToken)?;

    if claims.scope != TokenScope::Full {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Two-factor verification required"
        )));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Accept any valid session credential, full or two-factor scoped.
///
/// Used only by the two-factor verify endpoint, which must be reachable
/// while login is still pending.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&req).ok_or_else(|| {
        AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
    })?;

    let claims = state.jwt.verify(token).map_err(AppError::InvalidToken)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extractor for the verified claims placed by the auth middleware.
pub struct AuthUser(pub SessionClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<SessionClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Auth claims missing from request extensions"))
        })?;

        Ok(AuthUser(claims.clone()))
    }
}
