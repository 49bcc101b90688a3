//! Password-reset token lifecycle.
//!
//! Request: bot-check gate, then mint a single-use token with a 30-minute
//! horizon. Completion: consume the token and replace the credential in one
//! transaction, clearing any active device binding.

use rand::RngCore;
use sqlx::PgPool;

use crate::models::{PasswordReset, ResetStatus, User};
use crate::services::ServiceError;
use crate::utils::password::{hash_password, Password};

/// Reset tokens are 32 random bytes, hex-encoded.
const RESET_TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct PasswordResetService {
    pool: PgPool,
}

fn generate_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl PasswordResetService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mint a reset token for the account behind `email`.
    ///
    /// Returns `Ok(None)` when no account matches; callers must respond
    /// identically in both cases so the endpoint does not disclose which
    /// emails are registered. Prior pending tokens for the account are
    /// retired in the same transaction as the insert.
    pub async fn request(&self, email: &str) -> Result<Option<String>, ServiceError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user) = user else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(None);
        };

        let token = generate_token();
        let expires_at = PasswordReset::expiry_from_now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE password_resets SET status = $1 WHERE user_id = $2 AND status = $3",
        )
        .bind(ResetStatus::Used.as_str())
        .bind(user.id)
        .bind(ResetStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO password_resets (user_id, email, token, expires_at, status) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&token)
        .bind(expires_at)
        .bind(ResetStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, "Password reset token issued");

        Ok(Some(token))
    }

    /// Consume a reset token and replace the account credential.
    ///
    /// Ordering of failures: unknown token, then expired, then already used.
    /// The status flip is guarded by `status = 'pending'` so a concurrent
    /// completion with the same token loses the race cleanly.
    pub async fn complete(&self, token: &str, new_password: &str) -> Result<(), ServiceError> {
        let record: Option<PasswordReset> =
            sqlx::query_as("SELECT * FROM password_resets WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        let record = record.ok_or(ServiceError::InvalidToken)?;

        if record.is_expired() {
            return Err(ServiceError::TokenExpired);
        }
        if record.is_used() {
            return Err(ServiceError::TokenAlreadyUsed);
        }

        let new_hash = hash_password(&Password::new(new_password.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query(
            "UPDATE password_resets SET status = $1 WHERE id = $2 AND status = $3",
        )
        .bind(ResetStatus::Used.as_str())
        .bind(record.id)
        .bind(ResetStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ServiceError::TokenAlreadyUsed);
        }

        // New credential invalidates the active session: the binding is
        // cleared so the next login re-establishes it.
        sqlx::query(
            "UPDATE users SET password_hash = $1, device_id = NULL, is_logged_in = FALSE \
             WHERE id = $2",
        )
        .bind(new_hash.as_str())
        .bind(record.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %record.user_id, "Password reset completed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
