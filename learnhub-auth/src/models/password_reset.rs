//! Password-reset record: one row per reset attempt.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reset tokens live this long after creation.
pub const RESET_TOKEN_EXPIRY_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetStatus {
    Pending,
    Used,
}

impl ResetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetStatus::Pending => "pending",
            ResetStatus::Used => "used",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    /// Expiry horizon for a record created now.
    pub fn expiry_from_now() -> DateTime<Utc> {
        Utc::now() + Duration::minutes(RESET_TOKEN_EXPIRY_MINUTES)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    pub fn is_used(&self) -> bool {
        self.status == ResetStatus::Used.as_str()
    }
}
