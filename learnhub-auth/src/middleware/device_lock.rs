//! Single-active-device enforcement.
//!
//! A full-scope credential names the device it was issued to. On every
//! protected request the account's current binding is compared against the
//! credential; a newer login from another device has overwritten the binding,
//! so the older credential fails here even though its signature and expiry
//! are still valid.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::IntoResponse,
};
use learnhub_core::error::AppError;

use crate::{models::User, services::SessionClaims, AppState};

/// Decide whether a credential's device may act on the account.
///
/// Pure function of the two values: no binding on the account passes (the
/// account has been logged out or reset, nothing to conflict with), a
/// matching binding passes, anything else is a mismatch.
pub fn check_device_binding(credential_device: &str, account_device: Option<&str>) -> bool {
    match account_device {
        None => true,
        Some(bound) => bound == credential_device,
    }
}

/// Load the account row and enforce the device lock. Runs after
/// `auth_middleware`, which placed the verified claims in extensions.
pub async fn device_lock_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let claims = req
        .extensions()
        .get::<SessionClaims>()
        .cloned()
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Device lock ran without auth claims"))
        })?;

    let user_id = claims.user_id().map_err(AppError::Unauthorized)?;
    let user = state.auth.find_by_id(user_id).await.map_err(AppError::from)?;

    if !check_device_binding(&claims.device_id, user.device_id.as_deref()) {
        tracing::warn!(user_id = %user.id, "Session rejected: account bound to another device");
        return Err(AppError::DeviceMismatch(
            "Account is active on another device".to_string(),
        ));
    }

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Extractor for the account row placed by the device lock.
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("User missing from request extensions"))
        })?;

        Ok(CurrentUser(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_account_accepts_any_device() {
        assert!(check_device_binding("device-1", None));
        assert!(check_device_binding("", None));
    }

    #[test]
    fn matching_binding_passes() {
        assert!(check_device_binding("device-1", Some("device-1")));
    }

    #[test]
    fn differing_binding_is_a_mismatch() {
        assert!(!check_device_binding("device-1", Some("device-2")));
    }

    #[test]
    fn comparison_is_exact_not_prefix() {
        assert!(!check_device_binding("device-1", Some("device-10")));
        assert!(!check_device_binding("Device-1", Some("device-1")));
    }

    #[test]
    fn empty_credential_device_never_matches_a_binding() {
        assert!(!check_device_binding("", Some("device-1")));
    }
}
