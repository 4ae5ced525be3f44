use serde::Deserialize;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///
/// openai:
///   api_key: "sk-..."
///   base_url: "https://api.openai.com/v1"
///   chat_model: "gpt-4o-mini"
///
/// realtime:
///   url: "wss://api.openai.com/v1/realtime"
///   model: "gpt-4o-realtime-preview"
///   voice: "alloy"
///   instructions: "You are the voice receptionist..."
///   vad:
///     threshold: 0.5
///     prefix_padding_ms: 300
///     silence_duration_ms: 500
///
/// knowledge:
///   dir: "./data"
///
/// bookings:
///   url: "https://bookings.example.com/api"
///   api_key: "bk-..."
///
/// security:
///   cors_allowed_origins: "https://app.example.com"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub openai: Option<OpenAIYaml>,
    pub realtime: Option<RealtimeYaml>,
    pub knowledge: Option<KnowledgeYaml>,
    pub bookings: Option<BookingsYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Hosted model API settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenAIYaml {
    /// Used for both the realtime session and the chat pass-throughs
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
}

/// Realtime session settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RealtimeYaml {
    pub url: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub instructions: Option<String>,
    pub vad: Option<VadYaml>,
}

/// Server VAD tuning from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VadYaml {
    /// Speech probability threshold (0.0 - 1.0)
    pub threshold: Option<f32>,
    pub prefix_padding_ms: Option<u32>,
    pub silence_duration_ms: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct KnowledgeYaml {
    /// Directory holding employees.json, company.json and faqs.json
    pub dir: Option<String>,
}

/// Booking store settings from YAML
///
/// Without a URL bookings are kept in memory.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BookingsYaml {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: YamlConfig = serde_yaml::from_str(&contents)?;

        Ok(config)
    }
}
