use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

/// Session credential issuer and verifier.
///
/// Signs a compact HS256 credential carrying identity + device binding.
/// The signing secret is loaded once at startup; it is never read from
/// ambient environment at call sites.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_expiry_days: i64,
    two_factor_expiry_minutes: i64,
}

/// What a credential is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    /// Normal operation: all protected routes, subject to the device lock.
    Full,
    /// Issued at login when two-factor verification is outstanding; accepted
    /// only by the two-factor verify endpoint.
    TwoFactor,
}

/// Claims carried by a session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Device the session is bound to
    pub device_id: String,
    /// Credential scope
    pub scope: TokenScope,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<Uuid, anyhow::Error> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow::anyhow!("Malformed subject claim: {}", e))
    }
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            session_expiry_days: config.session_expiry_days,
            two_factor_expiry_minutes: config.two_factor_expiry_minutes,
        }
    }

    /// Issue a full session credential bound to a device.
    pub fn issue_session(&self, user_id: Uuid, device_id: &str) -> Result<String, anyhow::Error> {
        self.issue(
            user_id,
            device_id,
            TokenScope::Full,
            Duration::days(self.session_expiry_days),
        )
    }

    /// Issue a short-lived credential sufficient only for two-factor verify.
    pub fn issue_two_factor(
        &self,
        user_id: Uuid,
        device_id: &str,
    ) -> Result<String, anyhow::Error> {
        self.issue(
            user_id,
            device_id,
            TokenScope::TwoFactor,
            Duration::minutes(self.two_factor_expiry_minutes),
        )
    }

    fn issue(
        &self,
        user_id: Uuid,
        device_id: &str,
        scope: TokenScope,
        ttl: Duration,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            device_id: device_id.to_string(),
            scope,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))?;

        Ok(token)
    }

    /// Validate signature and expiry, and decode the payload.
    ///
    /// A payload whose signature did not verify is never partially trusted.
    /// Device-binding comparison is the device lock's job, not the verifier's.
    /// The typed error stays server-side; callers map it to a uniform
    /// authentication failure.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: SecretString::new("test-secret-at-least-32-bytes-long!".to_string()),
            session_expiry_days: 7,
            two_factor_expiry_minutes: 10,
        })
    }

    #[test]
    fn test_issue_and_verify_session() {
        let service = test_service();
        let user_id = Uuid::new_v4();

        let token = service.issue_session(user_id, "device-1").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.device_id, "device-1");
        assert_eq!(claims.scope, TokenScope::Full);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_two_factor_token_has_limited_scope() {
        let service = test_service();
        let token = service.issue_two_factor(Uuid::new_v4(), "device-1").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.scope, TokenScope::TwoFactor);
        // Short horizon: well under an hour
        assert!(claims.exp - claims.iat <= 10 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_service();
        let token = service
            .issue(
                Uuid::new_v4(),
                "device-1",
                TokenScope::Full,
                Duration::seconds(-120),
            )
            .unwrap();

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let service = test_service();
        let token = service.issue_session(Uuid::new_v4(), "device-1").unwrap();

        // Flip the first character of the signature segment.
        let dot = token.rfind('.').unwrap();
        let mut tampered: Vec<u8> = token.clone().into_bytes();
        tampered[dot + 1] = if tampered[dot + 1] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert_ne!(token, tampered);

        assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: SecretString::new("another-secret-at-least-32-bytes!!!".to_string()),
            session_expiry_days: 7,
            two_factor_expiry_minutes: 10,
        });

        let token = other.issue_session(Uuid::new_v4(), "device-1").unwrap();
        assert!(service.verify(&token).is_err());
    }
}
