//! External bot-check verifier.
//!
//! The reset-request flow calls out to a human-verification service with the
//! site secret and the client-supplied proof token. Any transport failure or
//! timeout fails closed.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::config::CaptchaConfig;
use crate::services::ServiceError;

#[async_trait]
pub trait BotCheck: Send + Sync {
    /// Validate a client-supplied proof. Ok(()) means the caller is trusted.
    async fn verify(&self, proof: &str) -> Result<(), ServiceError>;
}

/// Response shape of the siteverify endpoint.
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    score: Option<f32>,
}

pub struct CaptchaVerifier {
    http: reqwest::Client,
    secret: SecretString,
    verify_url: String,
    min_score: f32,
}

impl CaptchaVerifier {
    pub fn new(config: &CaptchaConfig) -> Result<Self, anyhow::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build captcha HTTP client: {}", e))?;

        Ok(Self {
            http,
            secret: config.secret.clone(),
            verify_url: config.verify_url.clone(),
            min_score: config.min_score,
        })
    }

    fn evaluate(&self, response: &SiteVerifyResponse) -> Result<(), ServiceError> {
        if !response.success {
            return Err(ServiceError::CaptchaRejected);
        }

        // Score-less (checkbox-style) verifiers only report success.
        if let Some(score) = response.score {
            if score < self.min_score {
                return Err(ServiceError::CaptchaRejected);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl BotCheck for CaptchaVerifier {
    async fn verify(&self, proof: &str) -> Result<(), ServiceError> {
        let params = [
            ("secret", self.secret.expose_secret().as_str()),
            ("response", proof),
        ];

        // Fail closed: a verifier outage must never bypass the gate.
        let response = self
            .http
            .post(&self.verify_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ServiceError::CaptchaUnavailable(e.to_string()))?;

        let body: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::CaptchaUnavailable(e.to_string()))?;

        self.evaluate(&body)
    }
}

/// Test double that skips the network round-trip.
pub struct MockBotCheck {
    pub accept: bool,
}

#[async_trait]
impl BotCheck for MockBotCheck {
    async fn verify(&self, _proof: &str) -> Result<(), ServiceError> {
        if self.accept {
            Ok(())
        } else {
            Err(ServiceError::CaptchaRejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier(min_score: f32) -> CaptchaVerifier {
        CaptchaVerifier::new(&CaptchaConfig {
            secret: SecretString::new("captcha-secret".to_string()),
            verify_url: "http://localhost:1/siteverify".to_string(),
            min_score,
            timeout_seconds: 1,
        })
        .unwrap()
    }

    #[test]
    fn parses_siteverify_response() {
        let body: SiteVerifyResponse =
            serde_json::from_str(r#"{"success": true, "score": 0.9, "action": "reset"}"#).unwrap();
        assert!(body.success);
        assert_eq!(body.score, Some(0.9));
    }

    #[test]
    fn rejects_failed_verification() {
        let body = SiteVerifyResponse {
            success: false,
            score: None,
        };
        assert!(matches!(
            verifier(0.5).evaluate(&body),
            Err(ServiceError::CaptchaRejected)
        ));
    }

    #[test]
    fn rejects_low_trust_score() {
        let body = SiteVerifyResponse {
            success: true,
            score: Some(0.2),
        };
        assert!(matches!(
            verifier(0.5).evaluate(&body),
            Err(ServiceError::CaptchaRejected)
        ));
    }

    #[test]
    fn accepts_success_without_score() {
        let body = SiteVerifyResponse {
            success: true,
            score: None,
        };
        assert!(verifier(0.5).evaluate(&body).is_ok());
    }

    #[tokio::test]
    async fn unreachable_verifier_fails_closed() {
        // Port 1 is not listening; the gate must report an outage, not pass.
        let result = verifier(0.5).verify("some-proof").await;
        assert!(matches!(result, Err(ServiceError::CaptchaUnavailable(_))));
    }
}
