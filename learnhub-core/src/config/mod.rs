use crate::error::AppError;
use config::{Config as Loader, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

/// Listen settings shared by every learnhub service. Service-specific
/// configuration (database, tokens, captcha) lives in each service crate.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Layered load: an optional `configuration` file, overridden by
    /// `APP__`-prefixed environment variables (`APP__HOST`, `APP__PORT`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let loaded = Loader::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(loaded.try_deserialize()?)
    }

    /// The address to bind, validated at startup rather than at bind time.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        let host: IpAddr = self.host.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid listen host '{}': {}", self.host, e))
        })?;

        Ok(SocketAddr::new(host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_interfaces() {
        let config = Config {
            host: default_host(),
            port: default_port(),
        };

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn non_ip_host_is_a_config_error() {
        let config = Config {
            host: "not-an-address".to_string(),
            port: 8080,
        };

        assert!(config.socket_addr().is_err());
    }
}
