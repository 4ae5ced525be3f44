//! Configuration validation logic

use tracing::warn;

use super::{ConfigError, ServerConfig};
use crate::utils::{validate_http_url, validate_websocket_url};

/// Check a merged configuration before the server starts.
pub(super) fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_endpoints(config)?;
    validate_vad(config)?;
    validate_rate_limits(config)?;
    validate_knowledge_dir(config)?;
    Ok(())
}

fn validate_endpoints(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_websocket_url(&config.realtime.url).map_err(|e| ConfigError::Invalid {
        key: "REALTIME_URL",
        reason: e.to_string(),
    })?;

    validate_http_url(&config.openai_base_url).map_err(|e| ConfigError::Invalid {
        key: "OPENAI_BASE_URL",
        reason: e.to_string(),
    })?;

    if let Some(url) = &config.booking_store_url {
        validate_http_url(url).map_err(|e| ConfigError::Invalid {
            key: "BOOKING_STORE_URL",
            reason: e.to_string(),
        })?;
    }

    Ok(())
}

fn validate_vad(config: &ServerConfig) -> Result<(), ConfigError> {
    let threshold = config.realtime.vad.threshold;
    if !threshold.is_finite() {
        return Err(ConfigError::Invalid {
            key: "VAD_THRESHOLD",
            reason: format!("{threshold} is not a number between 0.0 and 1.0"),
        });
    }
    if !(0.0..=1.0).contains(&threshold) {
        warn!(threshold, "VAD threshold outside 0.0-1.0 will be clamped");
    }
    Ok(())
}

fn validate_rate_limits(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.rate_limit_requests_per_second == 0 {
        return Err(ConfigError::Invalid {
            key: "RATE_LIMIT_REQUESTS_PER_SECOND",
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.rate_limit_burst_size == 0 {
        return Err(ConfigError::Invalid {
            key: "RATE_LIMIT_BURST_SIZE",
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn validate_knowledge_dir(config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(dir) = &config.knowledge_base_dir
        && !dir.is_dir()
    {
        return Err(ConfigError::Invalid {
            key: "KNOWLEDGE_BASE_DIR",
            reason: format!("{} is not a directory", dir.display()),
        });
    }
    Ok(())
}
