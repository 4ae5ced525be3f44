//! Configuration module for the relay gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use relay_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::realtime::RealtimeSettings;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 60;
pub const DEFAULT_RATE_LIMIT_BURST_SIZE: u32 = 10;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port)
/// - Hosted model API credentials and the chat model
/// - Realtime session settings sent upstream on every relay session
/// - Knowledge base location and booking store endpoint
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    /// API key for the realtime session and the chat pass-throughs
    pub openai_api_key: Option<String>,
    /// Base URL of the chat completions API
    pub openai_base_url: String,
    pub chat_model: String,

    pub realtime: RealtimeSettings,

    /// Directory with employees.json, company.json and faqs.json.
    /// Default: None (built-in data set)
    pub knowledge_base_dir: Option<PathBuf>,

    /// REST booking store base URL. Default: None (in-memory store)
    pub booking_store_url: Option<String>,
    pub booking_store_api_key: Option<String>,

    // Security settings
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (no CORS headers)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP on `/api` routes.
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

/// Zeroize secrets when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.booking_store_api_key {
            key.zeroize();
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            realtime: RealtimeSettings::default(),
            knowledge_base_dir: None,
            booking_store_url: None,
            booking_store_api_key: None,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: DEFAULT_RATE_LIMIT_RPS,
            rate_limit_burst_size: DEFAULT_RATE_LIMIT_BURST_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables (and `.env` values loaded by the binary) form the
    /// base; every value present in the YAML file overrides them.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The API key, if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Whether rate limiting is effectively disabled.
    pub fn rate_limit_disabled(&self) -> bool {
        self.rate_limit_requests_per_second >= 100_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::realtime::Voice;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("OPENAI_BASE_URL");
            env::remove_var("CHAT_MODEL");
            env::remove_var("REALTIME_URL");
            env::remove_var("REALTIME_MODEL");
            env::remove_var("REALTIME_VOICE");
            env::remove_var("REALTIME_INSTRUCTIONS");
            env::remove_var("VAD_THRESHOLD");
            env::remove_var("VAD_PREFIX_PADDING_MS");
            env::remove_var("VAD_SILENCE_DURATION_MS");
            env::remove_var("KNOWLEDGE_BASE_DIR");
            env::remove_var("BOOKING_STORE_URL");
            env::remove_var("BOOKING_STORE_API_KEY");
            env::remove_var("CORS_ALLOWED_ORIGINS");
            env::remove_var("RATE_LIMIT_REQUESTS_PER_SECOND");
            env::remove_var("RATE_LIMIT_BURST_SIZE");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.address(), "0.0.0.0:3001");
        assert!(config.api_key().is_none());
        assert_eq!(config.realtime, RealtimeSettings::default());
        assert_eq!(config.rate_limit_requests_per_second, 60);
        assert!(config.booking_store_url.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_values() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "8081");
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("REALTIME_VOICE", "shimmer");
            env::set_var("VAD_SILENCE_DURATION_MS", "900");
            env::set_var("BOOKING_STORE_URL", "http://localhost:7000");
        }

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.api_key(), Some("sk-env"));
        assert_eq!(config.realtime.voice, Voice::Shimmer);
        assert_eq!(config.realtime.vad.silence_duration_ms, 900);
        assert_eq!(config.realtime.vad.prefix_padding_ms, 300);
        assert_eq!(
            config.booking_store_url.as_deref(),
            Some("http://localhost:7000")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 8080

openai:
  api_key: "sk-yaml"

realtime:
  vad:
    threshold: 0.8
"#;

        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            env::set_var("HOST", "10.0.0.1");
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("VAD_THRESHOLD", "0.2");
            env::set_var("CHAT_MODEL", "env-model");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.api_key(), Some("sk-yaml"));
        assert_eq!(config.realtime.vad.threshold, 0.8);
        // ENV fills what YAML leaves out
        assert_eq!(config.chat_model, "env-model");
        assert_eq!(config.port, 8080);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let result = ServerConfig::from_file(Path::new("/nonexistent/config.yaml"));

        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_yaml() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");
        fs::write(&config_path, "invalid: yaml: [content").unwrap();

        let result = ServerConfig::from_file(&config_path);

        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_realtime_url() {
        cleanup_env_vars();
        unsafe {
            env::set_var("REALTIME_URL", "https://api.openai.com/v1/realtime");
        }

        let err = ServerConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "REALTIME_URL",
                ..
            }
        ));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_validation_rejects_missing_knowledge_dir() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        unsafe {
            env::set_var("KNOWLEDGE_BASE_DIR", missing.as_os_str());
        }

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("KNOWLEDGE_BASE_DIR"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_validation_rejects_zero_rate_limit() {
        cleanup_env_vars();
        unsafe {
            env::set_var("RATE_LIMIT_BURST_SIZE", "0");
        }

        assert!(ServerConfig::from_env().is_err());

        cleanup_env_vars();
    }

    #[test]
    fn test_empty_api_key_is_none() {
        let mut config = ServerConfig::default();
        config.openai_api_key = Some(String::new());
        assert!(config.api_key().is_none());
    }
}
