//! Role gate for management routes. Runs after the device lock, which placed
//! the account row in extensions.

use axum::{extract::Request, middleware::Next, response::IntoResponse};
use learnhub_core::error::AppError;
use uuid::Uuid;

use crate::models::User;

pub async fn admin_middleware(req: Request, next: Next) -> Result<impl IntoResponse, AppError> {
    let user = req.extensions().get::<User>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("Role gate ran without a loaded user"))
    })?;

    if !user.is_admin() {
        tracing::warn!(user_id = %user.id, "Admin route denied");
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Admin privileges required"
        )));
    }

    Ok(next.run(req).await)
}

/// Allow an account to act on itself, or an admin to act on anyone.
pub fn ensure_self_or_admin(actor: &User, target: Uuid) -> Result<(), AppError> {
    if actor.id == target || actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(anyhow::anyhow!(
            "Not allowed to act on another account"
        )))
    }
}
