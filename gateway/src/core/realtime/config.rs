//! Realtime session settings.
//!
//! [`RealtimeSettings`] is the `realtime` section of the server
//! configuration. It knows how to build the upstream dial URL and the one
//! `session.update` payload each relay session sends.

use serde::{Deserialize, Serialize};

use super::messages::{SessionConfig, TurnDetection};
use crate::core::tools::ToolDescriptor;

/// Realtime API WebSocket endpoint.
pub const DEFAULT_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview";

/// Wire name of the only audio format used in either direction.
pub const PCM16_FORMAT: &str = "pcm16";

pub const DEFAULT_INSTRUCTIONS: &str = "You are the voice receptionist for Brightpath \
    Technologies. Answer questions about the company, its people, services and FAQs \
    using the provided tools, and book meetings when the caller asks. Keep answers short.";

// =============================================================================
// Voices
// =============================================================================

/// Available voices for the realtime API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Sage,
    Shimmer,
    Verse,
}

impl Voice {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
            Self::Verse => "verse",
        }
    }

    /// Parse from string, falling back to the default voice.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "ash" => Self::Ash,
            "ballad" => Self::Ballad,
            "coral" => Self::Coral,
            "echo" => Self::Echo,
            "sage" => Self::Sage,
            "shimmer" => Self::Shimmer,
            "verse" => Self::Verse,
            _ => Self::Alloy,
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Modalities
// =============================================================================

/// Output modalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
}

impl Modality {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Server-side voice activity detection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VadSettings {
    /// Sensitivity, clamped to 0.0-1.0 when the session config is built
    pub threshold: f32,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
}

impl Default for VadSettings {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 500,
        }
    }
}

/// Everything needed to open and configure an upstream session.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeSettings {
    pub url: String,
    pub model: String,
    pub voice: Voice,
    pub instructions: String,
    pub modalities: Vec<Modality>,
    pub vad: VadSettings,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_REALTIME_URL.to_string(),
            model: DEFAULT_REALTIME_MODEL.to_string(),
            voice: Voice::default(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            modalities: vec![Modality::Text, Modality::Audio],
            vad: VadSettings::default(),
        }
    }
}

impl RealtimeSettings {
    /// Dial URL with the model query parameter.
    pub fn ws_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}model={}", self.url, separator, self.model)
    }

    /// The `session.update` payload advertising `tools`.
    pub fn session_config(&self, tools: &[ToolDescriptor]) -> SessionConfig {
        let threshold = if self.vad.threshold.is_nan() {
            VadSettings::default().threshold
        } else {
            self.vad.threshold.clamp(0.0, 1.0)
        };

        SessionConfig {
            modalities: self
                .modalities
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            instructions: self.instructions.clone(),
            voice: self.voice.as_str().to_string(),
            input_audio_format: PCM16_FORMAT.to_string(),
            output_audio_format: PCM16_FORMAT.to_string(),
            turn_detection: TurnDetection::ServerVad {
                threshold,
                prefix_padding_ms: self.vad.prefix_padding_ms,
                silence_duration_ms: self.vad.silence_duration_ms,
            },
            tools: tools.iter().map(ToolDescriptor::to_tool_def).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tools::TOOL_CATALOGUE;

    #[test]
    fn test_ws_url() {
        let settings = RealtimeSettings::default();
        assert_eq!(
            settings.ws_url(),
            "wss://api.openai.com/v1/realtime?model=gpt-4o-realtime-preview"
        );

        let settings = RealtimeSettings {
            url: "ws://localhost:9000/rt?debug=1".to_string(),
            model: "m".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.ws_url(), "ws://localhost:9000/rt?debug=1&model=m");
    }

    #[test]
    fn test_session_config_carries_every_tool() {
        let config = RealtimeSettings::default().session_config(TOOL_CATALOGUE);
        assert_eq!(config.tools.len(), TOOL_CATALOGUE.len());
        assert_eq!(config.input_audio_format, "pcm16");
        assert_eq!(config.output_audio_format, "pcm16");
        assert_eq!(config.modalities, vec!["text", "audio"]);
    }

    #[test]
    fn test_threshold_is_clamped() {
        let mut settings = RealtimeSettings::default();
        settings.vad.threshold = 1.7;
        let TurnDetection::ServerVad { threshold, .. } = settings.session_config(&[]).turn_detection;
        assert_eq!(threshold, 1.0);

        settings.vad.threshold = -0.2;
        let TurnDetection::ServerVad { threshold, .. } = settings.session_config(&[]).turn_detection;
        assert_eq!(threshold, 0.0);
    }

    #[test]
    fn test_voice_from_str() {
        assert_eq!(Voice::from_str_or_default("SHIMMER"), Voice::Shimmer);
        assert_eq!(Voice::from_str_or_default("unknown"), Voice::Alloy);
    }
}
