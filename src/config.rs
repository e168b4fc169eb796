//! Configuration module for the CMS route server.
//!
//! This module handles loading and validating configuration from TOML files.
//!
//! # Configuration Sources (in order of priority)
//! 1. An explicit `--config <path>`
//! 2. `config.local.toml` - Local overrides (gitignored)
//! 3. `config.toml` - Main configuration file
//!
//! # Example
//! ```rust,ignore
//! let config = Config::load("config.toml")?;
//! println!("Server will listen on {}:{}", config.server.host, config.server.port);
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL for generating absolute route URLs
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Maximum request body size in bytes (media uploads go through here)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: 30,
            max_body_size: 20 * 1024 * 1024,
        }
    }
}

/// Authentication configuration for the `auth` and `admin` middleware
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Role required by the `admin` middleware
    #[serde(default = "default_admin_role")]
    pub admin_role: String,

    /// Accepted bearer tokens and the identities they map to
    #[serde(default)]
    pub credentials: Vec<CredentialConfig>,
}

fn default_admin_role() -> String {
    "admin".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            credentials: Vec::new(),
        }
    }
}

/// A single accepted token
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialConfig {
    /// User name attached to authenticated requests
    pub user: String,
    /// Secret token presented by the client
    pub token: String,
    /// Roles granted to the user
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Rate limiting configuration for the `throttle` middleware
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,
    /// Maximum requests per window
    pub requests_per_window: u32,
    /// Window duration in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_window: 60,
            window_seconds: 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Tries to load from:
    /// 1. `config.local.toml` (if exists)
    /// 2. `config.toml`
    ///
    /// # Errors
    /// Returns `ConfigError` if no configuration file is found
    pub fn load_default() -> Result<Self, ConfigError> {
        if Path::new("config.local.toml").exists() {
            return Self::load("config.local.toml");
        }

        if Path::new("config.toml").exists() {
            return Self::load("config.toml");
        }

        Err(ConfigError::ValidationError(
            "No configuration file found. Expected config.toml or config.local.toml".to_string(),
        ))
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.ends_with('/') {
            return Err(ConfigError::ValidationError(
                "base_url should not have a trailing slash".to_string(),
            ));
        }

        if self.server.request_timeout == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout must be at least 1 second".to_string(),
            ));
        }

        if self.rate_limit.requests_per_window == 0 || self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "requests_per_window and window_seconds must be greater than 0".to_string(),
            ));
        }

        // governor cannot express a replenish period below one nanosecond
        let period =
            Duration::from_secs(self.rate_limit.window_seconds) / self.rate_limit.requests_per_window;
        if self.rate_limit.enabled && period.is_zero() {
            return Err(ConfigError::ValidationError(
                "requests_per_window is too large for window_seconds".to_string(),
            ));
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of: {:?}",
                valid_formats
            )));
        }

        let mut tokens = HashSet::new();
        for credential in &self.auth.credentials {
            if credential.token.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "credential for user `{}` has an empty token",
                    credential.user
                )));
            }
            if !tokens.insert(credential.token.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "credential for user `{}` reuses a token",
                    credential.user
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 9000
        base_url = "https://cms.example.com"
        request_timeout = 15
        max_body_size = 1048576

        [auth]
        [[auth.credentials]]
        user = "alice"
        token = "alice-token"
        roles = ["admin"]

        [[auth.credentials]]
        user = "bob"
        token = "bob-token"

        [rate_limit]
        enabled = true
        requests_per_window = 10
        window_seconds = 60

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(SAMPLE).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.admin_role, "admin");
        assert_eq!(config.auth.credentials.len(), 2);
        assert_eq!(config.auth.credentials[0].roles, vec!["admin"]);
        assert!(config.auth.credentials[1].roles.is_empty());
        assert!(config.rate_limit.enabled);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_sections_default_when_missing() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.auth.credentials.is_empty());
        assert!(!config.rate_limit.enabled);
    }

    #[test]
    fn test_validation_failures() {
        let trailing_slash = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            base_url = "http://localhost/"
            request_timeout = 30
            max_body_size = 1024
        "#;
        assert!(matches!(
            Config::from_toml(trailing_slash),
            Err(ConfigError::ValidationError(_))
        ));

        let duplicate_tokens = r#"
            [[auth.credentials]]
            user = "a"
            token = "same"

            [[auth.credentials]]
            user = "b"
            token = "same"
        "#;
        assert!(matches!(
            Config::from_toml(duplicate_tokens),
            Err(ConfigError::ValidationError(_))
        ));

        let zero_window = r#"
            [rate_limit]
            enabled = true
            requests_per_window = 0
            window_seconds = 60
        "#;
        assert!(Config::from_toml(zero_window).is_err());
    }

    #[test]
    fn test_rate_limit_period_must_be_representable() {
        let sub_nanosecond = r#"
            [rate_limit]
            enabled = true
            requests_per_window = 4294967295
            window_seconds = 1
        "#;
        assert!(matches!(
            Config::from_toml(sub_nanosecond),
            Err(ConfigError::ValidationError(_))
        ));

        // Irrelevant while the limiter is off
        let disabled = sub_nanosecond.replace("enabled = true", "enabled = false");
        assert!(Config::from_toml(&disabled).is_ok());

        let tight = r#"
            [rate_limit]
            enabled = true
            requests_per_window = 1000000000
            window_seconds = 1
        "#;
        assert!(Config::from_toml(tight).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.base_url, "https://cms.example.com");
    }
}
