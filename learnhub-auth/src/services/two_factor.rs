//! Two-factor enrollment state machine.
//!
//! States: uninitialized (no secret) -> pending (secret stored, unverified)
//! -> verified (enabled). `setup` overwrites any pending secret; a proof is
//! accepted within one time step of clock skew either way.

use sqlx::PgPool;
use totp_rs::{Algorithm, Secret, TOTP};
use uuid::Uuid;

use crate::dtos::auth::TwoFactorEnrollment;
use crate::models::User;
use crate::services::ServiceError;

const TOTP_DIGITS: usize = 6;
const TOTP_SKEW: u8 = 1;
const TOTP_STEP: u64 = 30;

#[derive(Clone)]
pub struct TwoFactorService {
    pool: PgPool,
    issuer: String,
}

/// Build a TOTP generator for a stored base32 secret, labeled for the
/// account so authenticator apps display "issuer (email)".
fn build_totp(issuer: &str, secret_base32: &str, account: &str) -> Result<TOTP, ServiceError> {
    let secret_bytes = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Malformed TOTP secret: {:?}", e)))?;

    TOTP::new(
        Algorithm::SHA1,
        TOTP_DIGITS,
        TOTP_SKEW,
        TOTP_STEP,
        secret_bytes,
        Some(issuer.to_string()),
        account.to_string(),
    )
    .map_err(|e| ServiceError::Internal(anyhow::anyhow!("TOTP init error: {:?}", e)))
}

fn enrollment_material(totp: &TOTP) -> Result<TwoFactorEnrollment, ServiceError> {
    let qr = totp
        .get_qr_base64()
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("QR generation error: {}", e)))?;

    Ok(TwoFactorEnrollment {
        otpauth_url: totp.get_url(),
        qr_data_url: format!("data:image/png;base64,{}", qr),
    })
}

impl TwoFactorService {
    pub fn new(pool: PgPool, issuer: String) -> Self {
        Self { pool, issuer }
    }

    /// Generate a fresh secret for the account and persist it unverified.
    ///
    /// Calling this again while pending overwrites the secret, invalidating
    /// any previously issued enrollment material.
    pub async fn setup(&self, user: &User) -> Result<TwoFactorEnrollment, ServiceError> {
        let secret = Secret::generate_secret();
        let secret_bytes = secret
            .to_bytes()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Secret gen error: {:?}", e)))?;

        let totp = TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            secret_bytes,
            Some(self.issuer.clone()),
            user.email.clone(),
        )
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("TOTP init error: {:?}", e)))?;

        sqlx::query(
            "UPDATE users SET totp_secret = $1, totp_enabled = FALSE, is_verified = FALSE \
             WHERE id = $2",
        )
        .bind(totp.get_secret_base32())
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "Two-factor secret generated");

        enrollment_material(&totp)
    }

    /// Rebuild enrollment material from an already-stored secret (shown again
    /// at login while enrollment is still pending).
    pub fn enrollment_for(
        &self,
        secret_base32: &str,
        account: &str,
    ) -> Result<TwoFactorEnrollment, ServiceError> {
        let totp = build_totp(&self.issuer, secret_base32, account)?;
        enrollment_material(&totp)
    }

    /// Check a submitted proof against the account's stored secret.
    ///
    /// Fails with `NoTwoFactorSecret` when setup was never called; a wrong
    /// code mutates nothing and does not reveal whether a secret existed.
    pub async fn check_proof(&self, user_id: Uuid, code: &str) -> Result<(), ServiceError> {
        let row: Option<(Option<String>, String)> =
            sqlx::query_as("SELECT totp_secret, email FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let (secret, email) = row.ok_or(ServiceError::UserNotFound)?;
        let secret = secret.ok_or(ServiceError::NoTwoFactorSecret)?;

        let totp = build_totp(&self.issuer, &secret, &email)?;
        let valid = totp
            .check_current(code)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Clock error: {}", e)))?;

        if !valid {
            return Err(ServiceError::InvalidTwoFactorCode);
        }

        Ok(())
    }

    /// Mark enrollment verified. Both flags flip in one statement so the
    /// transition is atomic from the caller's perspective.
    pub async fn enable(&self, user_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("UPDATE users SET totp_enabled = TRUE, is_verified = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(user_id = %user_id, "Two-factor enabled");
        Ok(())
    }

    /// Mark enrollment verified and complete the pending login: logged-in
    /// flag and device binding land in the same atomic update.
    pub async fn enable_and_bind(
        &self,
        user_id: Uuid,
        device_id: &str,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE users SET totp_enabled = TRUE, is_verified = TRUE, is_logged_in = TRUE, \
             device_id = $1 WHERE id = $2",
        )
        .bind(device_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %user_id, "Two-factor enabled, login completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_secret_base32() -> String {
        let secret = Secret::generate_secret();
        let totp = TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            secret.to_bytes().unwrap(),
            Some("LearnHub".to_string()),
            "alice@example.com".to_string(),
        )
        .unwrap();
        totp.get_secret_base32()
    }

    #[test]
    fn current_window_proof_is_accepted() {
        let secret = fresh_secret_base32();
        let totp = build_totp("LearnHub", &secret, "alice@example.com").unwrap();

        let code = totp.generate_current().unwrap();
        assert!(totp.check_current(&code).unwrap());
    }

    #[test]
    fn wrong_proof_is_rejected() {
        let secret = fresh_secret_base32();
        let totp = build_totp("LearnHub", &secret, "alice@example.com").unwrap();

        let code = totp.generate_current().unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };
        assert!(!totp.check_current(wrong).unwrap());
    }

    #[test]
    fn regenerated_secret_invalidates_old_proofs() {
        let old = build_totp("LearnHub", &fresh_secret_base32(), "alice@example.com").unwrap();
        let new = build_totp("LearnHub", &fresh_secret_base32(), "alice@example.com").unwrap();

        let old_code = old.generate_current().unwrap();
        // 160-bit secrets make a collision across the one-step window
        // vanishingly unlikely.
        if old_code != new.generate_current().unwrap() {
            assert!(!new.check_current(&old_code).unwrap());
        }
    }

    #[test]
    fn malformed_secret_is_an_internal_error() {
        let result = build_totp("LearnHub", "not-base32!!", "alice@example.com");
        assert!(result.is_err());
    }

    #[test]
    fn enrollment_material_contains_uri_and_qr() {
        let secret = fresh_secret_base32();
        let totp = build_totp("LearnHub", &secret, "alice@example.com").unwrap();
        let material = enrollment_material(&totp).unwrap();

        assert!(material.otpauth_url.starts_with("otpauth://totp/"));
        assert!(material.otpauth_url.contains("LearnHub"));
        assert!(material.qr_data_url.starts_with("data:image/png;base64,"));
    }
}
