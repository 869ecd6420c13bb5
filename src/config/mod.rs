//! Gateway configuration
//!
//! Loaded once at startup from a YAML file plus environment overrides and
//! passed by reference into each component; nothing here mutates after
//! initialization. The JWT secret is injected configuration and must never
//! be logged.

use crate::ratelimit;
use crate::utils::error::{GateError, Result};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub redis: RedisConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret. Never logged; never defaulted in production.
    #[serde(default = "generate_dev_secret")]
    pub jwt_secret: String,
    /// Token validity in milliseconds (default: 24 hours)
    #[serde(default = "default_jwt_expiration_ms")]
    pub jwt_expiration_ms: u64,
    /// Session record TTL in seconds (default: 24 hours)
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: generate_dev_secret(),
            jwt_expiration_ms: default_jwt_expiration_ms(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

/// One bucket's policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BucketConfig {
    pub capacity: u32,
    pub refill_per_sec: f64,
}

/// Rate limiting configuration: the general and auth bucket policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_general_bucket")]
    pub general: BucketConfig,
    #[serde(default = "default_auth_bucket")]
    pub auth: BucketConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general: default_general_bucket(),
            auth: default_auth_bucket(),
        }
    }
}

/// Redis (session store) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// When disabled the in-memory session store is used instead.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-command timeout in milliseconds; a timeout fails closed.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            enabled: default_true(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)
            .map_err(|e| GateError::config(format!("invalid config file {}: {}", path, e)))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("APIGATE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(url) = std::env::var("APIGATE_REDIS_URL") {
            self.redis.url = url;
        }
        if let Ok(port) = std::env::var("APIGATE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Validate the configuration. Called once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(GateError::config(
                "JWT secret must be at least 32 characters long",
            ));
        }
        if self.auth.jwt_secret == "your-secret-key" || self.auth.jwt_secret == "change-me" {
            return Err(GateError::config(
                "JWT secret must not use a placeholder value",
            ));
        }
        if self.auth.jwt_expiration_ms < 1000 {
            return Err(GateError::config(
                "JWT expiration must be at least one second",
            ));
        }
        if self.rate_limit.general.capacity == 0 || self.rate_limit.auth.capacity == 0 {
            return Err(GateError::config("bucket capacity must be positive"));
        }
        if self.rate_limit.general.refill_per_sec <= 0.0
            || self.rate_limit.auth.refill_per_sec <= 0.0
        {
            return Err(GateError::config("bucket refill rate must be positive"));
        }
        if self.redis.command_timeout_ms == 0 || self.redis.command_timeout_ms > 1000 {
            return Err(GateError::config(
                "redis command timeout must be between 1 and 1000 ms",
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_jwt_expiration_ms() -> u64 {
    86_400_000
}

fn default_session_ttl_secs() -> u64 {
    86_400
}

fn default_general_bucket() -> BucketConfig {
    BucketConfig {
        capacity: ratelimit::GENERAL_CAPACITY,
        refill_per_sec: ratelimit::GENERAL_REFILL_PER_SEC,
    }
}

fn default_auth_bucket() -> BucketConfig {
    BucketConfig {
        capacity: ratelimit::AUTH_CAPACITY,
        refill_per_sec: ratelimit::AUTH_REFILL_PER_SEC,
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_true() -> bool {
    true
}

fn default_command_timeout_ms() -> u64 {
    1000
}

/// Generate a random secret for local development runs.
///
/// Production deployments must inject `APIGATE_JWT_SECRET` or set it in the
/// config file; a generated secret invalidates all tokens on restart.
fn generate_dev_secret() -> String {
    warn!("no JWT secret configured, generating an ephemeral one");
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_policy() {
        let config = Config::default();
        assert_eq!(config.rate_limit.general.capacity, 20);
        assert_eq!(config.rate_limit.general.refill_per_sec, 10.0);
        assert_eq!(config.rate_limit.auth.capacity, 10);
        assert_eq!(config.rate_limit.auth.refill_per_sec, 5.0);
        assert_eq!(config.auth.jwt_expiration_ms, 86_400_000);
        assert_eq!(config.auth.session_ttl_secs, 86_400);
        assert_eq!(config.redis.command_timeout_ms, 1000);
    }

    #[test]
    fn test_auth_bucket_stricter_by_default() {
        let config = Config::default();
        assert!(config.rate_limit.auth.capacity < config.rate_limit.general.capacity);
        assert!(config.rate_limit.auth.refill_per_sec < config.rate_limit.general.refill_per_sec);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = Config::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let mut config = Config::default();
        config.auth.jwt_secret = "change-me".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_excessive_store_timeout_rejected() {
        let mut config = Config::default();
        config.redis.command_timeout_ms = 5000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "server:\n  port: 9090\nauth:\n  jwt_secret: file-secret-long-enough-to-pass-check\nredis:\n  enabled: false\n"
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.jwt_secret, "file-secret-long-enough-to-pass-check");
        assert!(!config.redis.enabled);
        // Unspecified sections fall back to defaults
        assert_eq!(config.rate_limit.general.capacity, 20);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::from_file("/nonexistent/apigate.yaml").is_err());
    }
}
