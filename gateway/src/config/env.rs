//! Environment variable loading.
//!
//! Every key is optional here; defaults are applied during the merge so that
//! YAML values can still take precedence over them.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use super::ConfigError;

/// Raw values read from the process environment
#[derive(Debug, Default, Clone)]
pub(super) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub chat_model: Option<String>,
    pub realtime_url: Option<String>,
    pub realtime_model: Option<String>,
    pub realtime_voice: Option<String>,
    pub realtime_instructions: Option<String>,
    pub vad_threshold: Option<f32>,
    pub vad_prefix_padding_ms: Option<u32>,
    pub vad_silence_duration_ms: Option<u32>,
    pub knowledge_base_dir: Option<String>,
    pub booking_store_url: Option<String>,
    pub booking_store_api_key: Option<String>,
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}

impl EnvConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            host: string_var("HOST"),
            port: parse_var("PORT")?,
            openai_api_key: string_var("OPENAI_API_KEY"),
            openai_base_url: string_var("OPENAI_BASE_URL"),
            chat_model: string_var("CHAT_MODEL"),
            realtime_url: string_var("REALTIME_URL"),
            realtime_model: string_var("REALTIME_MODEL"),
            realtime_voice: string_var("REALTIME_VOICE"),
            realtime_instructions: string_var("REALTIME_INSTRUCTIONS"),
            vad_threshold: parse_var("VAD_THRESHOLD")?,
            vad_prefix_padding_ms: parse_var("VAD_PREFIX_PADDING_MS")?,
            vad_silence_duration_ms: parse_var("VAD_SILENCE_DURATION_MS")?,
            knowledge_base_dir: string_var("KNOWLEDGE_BASE_DIR"),
            booking_store_url: string_var("BOOKING_STORE_URL"),
            booking_store_api_key: string_var("BOOKING_STORE_API_KEY"),
            cors_allowed_origins: string_var("CORS_ALLOWED_ORIGINS"),
            rate_limit_requests_per_second: parse_var("RATE_LIMIT_REQUESTS_PER_SECOND")?,
            rate_limit_burst_size: parse_var("RATE_LIMIT_BURST_SIZE")?,
        })
    }
}

/// Non-empty, trimmed value of `key`.
fn string_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    string_var(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                reason: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}
