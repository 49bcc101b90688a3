//! Account registration, login, and session teardown.

use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::auth::RegisterRequest;
use crate::models::{TwoFactorState, User, UserResponse};
use crate::services::{JwtService, ServiceError};
use crate::utils::password::{hash_password, verify_password, Password, PasswordHashString};

/// What a successful credential check leads to.
pub enum LoginOutcome {
    /// Session established; the device binding has been written.
    Complete { token: String, user: User },
    /// Credentials accepted but a two-factor proof is outstanding. The token
    /// is short-lived and only good for the verify endpoint; no binding has
    /// been written yet.
    TwoFactorRequired {
        token: String,
        /// Present while enrollment is pending, so the client can re-display
        /// the enrollment material.
        pending_secret: Option<String>,
        email: String,
    },
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtService) -> Self {
        Self { pool, jwt }
    }

    /// Create an account with a hashed credential. Email uniqueness is
    /// enforced by the DB; a duplicate maps to a conflict.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ServiceError> {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&request.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let hash = hash_password(&Password::new(request.password.clone()))?;

        let user: User = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ServiceError::EmailAlreadyRegistered
            }
            _ => ServiceError::Database(e),
        })?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// Check credentials and either establish a session or hand back a
    /// two-factor challenge.
    ///
    /// The device binding is written by a single update, so concurrent logins
    /// for one account leave exactly one device bound: last write wins, and
    /// the loser's credential fails the device lock on first use.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device_id: &str,
    ) -> Result<LoginOutcome, ServiceError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        // Same error for unknown email and wrong password.
        let user = user.ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(password.to_string()),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        match user.two_factor_state() {
            TwoFactorState::Uninitialized => {
                let user: User = sqlx::query_as(
                    "UPDATE users SET device_id = $1, is_logged_in = TRUE WHERE id = $2 \
                     RETURNING *",
                )
                .bind(device_id)
                .bind(user.id)
                .fetch_one(&self.pool)
                .await?;

                let token = self.jwt.issue_session(user.id, device_id)?;

                tracing::info!(user_id = %user.id, "Login completed");

                Ok(LoginOutcome::Complete { token, user })
            }
            state => {
                let token = self.jwt.issue_two_factor(user.id, device_id)?;

                let pending_secret = match state {
                    TwoFactorState::Pending => user.totp_secret.clone(),
                    _ => None,
                };

                tracing::info!(user_id = %user.id, "Login pending two-factor proof");

                Ok(LoginOutcome::TwoFactorRequired {
                    token,
                    pending_secret,
                    email: user.email,
                })
            }
        }
    }

    /// Tear down the session: clear the binding so any credential bound to
    /// the old device stops working and the next login rebinds freely.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("UPDATE users SET device_id = NULL, is_logged_in = FALSE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(user_id = %user_id, "Logged out");

        Ok(())
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<User, ServiceError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or(ServiceError::UserNotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError> {
        let users: Vec<UserResponse> = sqlx::query_as(
            "SELECT id, username, email, role, device_id, totp_enabled, is_verified, \
             is_logged_in, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
