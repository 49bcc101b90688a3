use learnhub_core::config as core_config;
use learnhub_core::error::AppError;
use secrecy::{ExposeSecret, SecretString};
use std::env;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub captcha: CaptchaConfig,
    pub totp_issuer: String,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a request may wait for a free connection before failing.
    pub acquire_timeout_seconds: u64,
    /// Idle connections past this age are dropped back to `min_connections`.
    pub idle_timeout_seconds: u64,
    /// Hard cap on connection age, so server-side restarts drain cleanly.
    pub max_lifetime_seconds: u64,
}

#[derive(Clone)]
pub struct JwtConfig {
    /// Process-wide signing secret, loaded once at startup. Rotating it
    /// invalidates all outstanding session credentials.
    pub secret: SecretString,
    pub session_expiry_days: i64,
    pub two_factor_expiry_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("session_expiry_days", &self.session_expiry_days)
            .field("two_factor_expiry_minutes", &self.two_factor_expiry_minutes)
            .finish()
    }
}

#[derive(Clone)]
pub struct CaptchaConfig {
    pub secret: SecretString,
    pub verify_url: String,
    pub min_score: f32,
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for CaptchaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptchaConfig")
            .field("secret", &"[REDACTED]")
            .field("verify_url", &self.verify_url)
            .field("min_score", &self.min_score)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = AuthConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("learnhub-auth"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
                min_connections: get_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?
                    .parse()
                    .unwrap_or(1),
                acquire_timeout_seconds: get_env(
                    "DATABASE_ACQUIRE_TIMEOUT_SECONDS",
                    Some("30"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(30),
                idle_timeout_seconds: get_env(
                    "DATABASE_IDLE_TIMEOUT_SECONDS",
                    Some("600"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(600),
                max_lifetime_seconds: get_env(
                    "DATABASE_MAX_LIFETIME_SECONDS",
                    Some("1800"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(1800),
            },
            jwt: JwtConfig {
                secret: SecretString::new(get_env("JWT_SECRET", None, is_prod)?),
                session_expiry_days: get_env("JWT_SESSION_EXPIRY_DAYS", Some("7"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
                two_factor_expiry_minutes: get_env(
                    "JWT_TWO_FACTOR_EXPIRY_MINUTES",
                    Some("10"),
                    is_prod,
                )?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                })?,
            },
            captcha: CaptchaConfig {
                secret: SecretString::new(get_env("CAPTCHA_SECRET", None, is_prod)?),
                verify_url: get_env(
                    "CAPTCHA_VERIFY_URL",
                    Some("https://www.google.com/recaptcha/api/siteverify"),
                    is_prod,
                )?,
                min_score: get_env("CAPTCHA_MIN_SCORE", Some("0.5"), is_prod)?
                    .parse()
                    .unwrap_or(0.5),
                timeout_seconds: get_env("CAPTCHA_TIMEOUT_SECONDS", Some("5"), is_prod)?
                    .parse()
                    .unwrap_or(5),
            },
            totp_issuer: get_env("TOTP_ISSUER", Some("LearnHub"), is_prod)?,
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.database.acquire_timeout_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DATABASE_ACQUIRE_TIMEOUT_SECONDS must be greater than 0"
            )));
        }

        if self.jwt.session_expiry_days <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SESSION_EXPIRY_DAYS must be positive"
            )));
        }

        if self.jwt.two_factor_expiry_minutes <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_TWO_FACTOR_EXPIRY_MINUTES must be positive"
            )));
        }

        if self.jwt.secret.expose_secret().len() < 32 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 bytes"
            )));
        }

        if !(0.0..=1.0).contains(&self.captcha.min_score) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "CAPTCHA_MIN_SCORE must be between 0.0 and 1.0"
            )));
        }

        if self.environment == Environment::Prod
            && self.security.allowed_origins.iter().any(|o| o == "*")
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
