//! Merging YAML and environment configurations.
//!
//! Priority per field: YAML > environment > default.

use std::path::PathBuf;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{
    ConfigError, DEFAULT_CHAT_MODEL, DEFAULT_HOST, DEFAULT_OPENAI_BASE_URL, DEFAULT_PORT,
    DEFAULT_RATE_LIMIT_BURST_SIZE, DEFAULT_RATE_LIMIT_RPS, ServerConfig,
};
use crate::core::realtime::{RealtimeSettings, VadSettings, Voice};

pub(super) fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, ConfigError> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();

    let server = yaml.server.unwrap_or_default();
    let openai = yaml.openai.unwrap_or_default();
    let realtime = yaml.realtime.unwrap_or_default();
    let vad = realtime.vad.clone().unwrap_or_default();
    let knowledge = yaml.knowledge.unwrap_or_default();
    let bookings = yaml.bookings.unwrap_or_default();
    let security = yaml.security.unwrap_or_default();

    let defaults = RealtimeSettings::default();
    let default_vad = VadSettings::default();

    let voice = realtime
        .voice
        .or(env.realtime_voice)
        .map(|v| Voice::from_str_or_default(&v))
        .unwrap_or(defaults.voice);

    let realtime_settings = RealtimeSettings {
        url: realtime.url.or(env.realtime_url).unwrap_or(defaults.url),
        model: realtime.model.or(env.realtime_model).unwrap_or(defaults.model),
        voice,
        instructions: realtime
            .instructions
            .or(env.realtime_instructions)
            .unwrap_or(defaults.instructions),
        modalities: defaults.modalities,
        vad: VadSettings {
            threshold: vad
                .threshold
                .or(env.vad_threshold)
                .unwrap_or(default_vad.threshold),
            prefix_padding_ms: vad
                .prefix_padding_ms
                .or(env.vad_prefix_padding_ms)
                .unwrap_or(default_vad.prefix_padding_ms),
            silence_duration_ms: vad
                .silence_duration_ms
                .or(env.vad_silence_duration_ms)
                .unwrap_or(default_vad.silence_duration_ms),
        },
    };

    Ok(ServerConfig {
        host: server
            .host
            .or(env.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: server.port.or(env.port).unwrap_or(DEFAULT_PORT),
        openai_api_key: openai.api_key.or(env.openai_api_key),
        openai_base_url: openai
            .base_url
            .or(env.openai_base_url)
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        chat_model: openai
            .chat_model
            .or(env.chat_model)
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        realtime: realtime_settings,
        knowledge_base_dir: knowledge
            .dir
            .or(env.knowledge_base_dir)
            .map(PathBuf::from),
        booking_store_url: bookings.url.or(env.booking_store_url),
        booking_store_api_key: bookings.api_key.or(env.booking_store_api_key),
        cors_allowed_origins: security
            .cors_allowed_origins
            .or(env.cors_allowed_origins),
        rate_limit_requests_per_second: security
            .rate_limit_requests_per_second
            .or(env.rate_limit_requests_per_second)
            .unwrap_or(DEFAULT_RATE_LIMIT_RPS),
        rate_limit_burst_size: security
            .rate_limit_burst_size
            .or(env.rate_limit_burst_size)
            .unwrap_or(DEFAULT_RATE_LIMIT_BURST_SIZE),
    })
}
