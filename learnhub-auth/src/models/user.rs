//! User model - course-platform accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account roles. Closed set, enforced both here and by a DB CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Normal,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Role::Normal),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Two-factor enrollment state, derived from the account columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoFactorState {
    /// No secret has ever been generated.
    Uninitialized,
    /// Secret stored but the owner has not yet proven possession.
    Pending,
    /// Enrollment complete; proofs are required at login.
    Verified,
}

/// Account row. `password_hash` and `totp_secret` never leave this type
/// unsanitized.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub device_id: Option<String>,
    pub totp_secret: Option<String>,
    pub totp_enabled: bool,
    pub is_verified: bool,
    pub is_logged_in: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        // The column carries a CHECK constraint; an unknown value means the
        // row was tampered with outside the application.
        Role::parse(&self.role).unwrap_or(Role::Normal)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn two_factor_state(&self) -> TwoFactorState {
        match (&self.totp_secret, self.is_verified) {
            (None, _) => TwoFactorState::Uninitialized,
            (Some(_), false) => TwoFactorState::Pending,
            (Some(_), true) => TwoFactorState::Verified,
        }
    }

    /// Convert to sanitized response (no password hash, no TOTP secret).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            device_id: self.device_id.clone(),
            totp_enabled: self.totp_enabled,
            is_verified: self.is_verified,
            is_logged_in: self.is_logged_in,
            created_at: self.created_at,
        }
    }
}

/// User view for API responses (no sensitive fields).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub device_id: Option<String>,
    pub totp_enabled: bool,
    pub is_verified: bool,
    pub is_logged_in: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(secret: Option<&str>, verified: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$...".into(),
            role: "normal".into(),
            device_id: None,
            totp_secret: secret.map(String::from),
            totp_enabled: verified,
            is_verified: verified,
            is_logged_in: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn role_set_is_closed() {
        assert_eq!(Role::parse("normal"), Some(Role::Normal));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn two_factor_state_derivation() {
        assert_eq!(user(None, false).two_factor_state(), TwoFactorState::Uninitialized);
        assert_eq!(
            user(Some("JBSWY3DPEHPK3PXP"), false).two_factor_state(),
            TwoFactorState::Pending
        );
        assert_eq!(
            user(Some("JBSWY3DPEHPK3PXP"), true).two_factor_state(),
            TwoFactorState::Verified
        );
    }

    #[test]
    fn sanitized_view_has_no_secrets() {
        let u = user(Some("JBSWY3DPEHPK3PXP"), true);
        let json = serde_json::to_value(u.sanitized()).unwrap();
        let text = json.to_string();
        assert!(!text.contains("argon2"));
        assert!(!text.contains("JBSWY3DPEHPK3PXP"));
    }
}
