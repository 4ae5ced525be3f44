//! Realtime API WebSocket message types.
//!
//! Only the events the relay and the client pipeline act on are modelled.
//! Everything else still crosses the relay verbatim; it simply parses as
//! [`UpstreamEvent::Other`].
//!
//! Client events (sent upstream):
//! - session.update
//! - input_audio_buffer.append
//! - conversation.item.create
//! - response.create
//!
//! Server events (received from upstream):
//! - error
//! - input_audio_buffer.speech_started / speech_stopped
//! - response.created
//! - response.output_item.added
//! - response.audio.delta / response.audio.done
//! - response.function_call_arguments.done

use serde::{Deserialize, Serialize};

use crate::core::audio::{AudioFrame, CodecError};

// =============================================================================
// Session Configuration
// =============================================================================

/// Session configuration sent once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Response modalities (text, audio)
    pub modalities: Vec<String>,

    /// System instructions for the assistant
    pub instructions: String,

    /// Voice for audio output
    pub voice: String,

    pub input_audio_format: String,

    pub output_audio_format: String,

    pub turn_detection: TurnDetection,

    /// Tool definitions
    #[serde(default)]
    pub tools: Vec<ToolDef>,
}

/// Turn detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD
    #[serde(rename = "server_vad")]
    ServerVad {
        /// Activation threshold, 0.0-1.0
        threshold: f32,
        /// Audio kept before detected speech, in ms
        prefix_padding_ms: u32,
        /// Trailing silence that ends a turn, in ms
        silence_duration_ms: u32,
    },
}

/// Tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool type (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function name
    pub name: String,
    /// Function description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Function parameters JSON schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

// =============================================================================
// Conversation Items
// =============================================================================

/// Conversation item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Item type (message, function_call, function_call_output)
    #[serde(rename = "type")]
    pub item_type: String,
    /// Call ID for function call items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Function name for function call items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    /// Function output for function call results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ConversationItem {
    /// A `function_call_output` item answering `call_id`.
    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            item_type: "function_call_output".to_string(),
            call_id: Some(call_id.into()),
            output: Some(output.into()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Client Events (sent upstream)
// =============================================================================

/// Events sent to the realtime API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },

    /// Append audio to input buffer
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        /// Base64-encoded PCM16 audio
        audio: String,
    },

    /// Create a conversation item
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },

    /// Ask the model to continue generating
    #[serde(rename = "response.create")]
    ResponseCreate,
}

impl ClientEvent {
    /// Append event carrying one captured frame.
    pub fn audio_append(frame: &AudioFrame) -> Self {
        ClientEvent::InputAudioBufferAppend {
            audio: frame.to_transport(),
        }
    }

    /// The conversation item carrying a tool result.
    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: ConversationItem::function_call_output(call_id, output),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// Server Events (received from upstream)
// =============================================================================

/// Events received from the realtime API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum UpstreamEvent {
    /// Error occurred
    #[serde(rename = "error")]
    Error { error: ApiError },

    /// Speech detection started; the user is barging in
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted {
        #[serde(default)]
        audio_start_ms: Option<u64>,
    },

    /// Speech detection stopped
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped {
        #[serde(default)]
        audio_end_ms: Option<u64>,
    },

    #[serde(rename = "response.created")]
    ResponseCreated,

    /// Output item added to response
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded { item: ConversationItem },

    /// Audio data chunk
    #[serde(rename = "response.audio.delta")]
    AudioDelta {
        /// Base64-encoded PCM16 audio
        delta: String,
    },

    #[serde(rename = "response.audio.done")]
    AudioDone,

    /// Function call arguments complete
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone {
        call_id: String,
        /// Some servers only send the name on `response.output_item.added`
        #[serde(default)]
        name: Option<String>,
        /// JSON-encoded argument object
        #[serde(default)]
        arguments: String,
    },

    /// Any event the relay does not act on
    #[serde(other)]
    Other,
}

impl UpstreamEvent {
    /// Interpret an already-parsed JSON frame.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Decode the audio carried by an `AudioDelta` event.
    pub fn decode_audio_delta(delta: &str) -> Result<AudioFrame, CodecError> {
        AudioFrame::playback_from_transport(delta)
    }
}

/// API error information.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_create_serialization() {
        let json = ClientEvent::ResponseCreate.to_json().unwrap();
        assert_eq!(json, r#"{"type":"response.create"}"#);
    }

    #[test]
    fn test_function_call_output_serialization() {
        let event = ClientEvent::function_call_output("call_9", r#"{"success":true}"#);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "conversation.item.create",
                "item": {
                    "type": "function_call_output",
                    "call_id": "call_9",
                    "output": "{\"success\":true}"
                }
            })
        );
    }

    #[test]
    fn test_session_update_serialization() {
        let event = ClientEvent::SessionUpdate {
            session: SessionConfig {
                modalities: vec!["text".to_string(), "audio".to_string()],
                instructions: "Be brief".to_string(),
                voice: "alloy".to_string(),
                input_audio_format: "pcm16".to_string(),
                output_audio_format: "pcm16".to_string(),
                turn_detection: TurnDetection::ServerVad {
                    threshold: 0.5,
                    prefix_padding_ms: 300,
                    silence_duration_ms: 500,
                },
                tools: vec![],
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "session.update");
        assert_eq!(value["session"]["turn_detection"]["type"], "server_vad");
        assert_eq!(value["session"]["turn_detection"]["silence_duration_ms"], 500);
        assert_eq!(value["session"]["voice"], "alloy");
    }

    #[test]
    fn test_function_call_done_deserialization() {
        let event = UpstreamEvent::from_value(&json!({
            "type": "response.function_call_arguments.done",
            "response_id": "resp_1",
            "item_id": "item_1",
            "output_index": 0,
            "call_id": "call_1",
            "name": "getAllEmployees",
            "arguments": "{}"
        }))
        .unwrap();
        assert_eq!(
            event,
            UpstreamEvent::FunctionCallArgumentsDone {
                call_id: "call_1".to_string(),
                name: Some("getAllEmployees".to_string()),
                arguments: "{}".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_event_is_other() {
        let event = UpstreamEvent::from_value(&json!({
            "type": "rate_limits.updated",
            "rate_limits": []
        }))
        .unwrap();
        assert_eq!(event, UpstreamEvent::Other);
    }

    #[test]
    fn test_error_event_deserialization() {
        let event: UpstreamEvent = serde_json::from_str(
            r#"{"type":"error","error":{"type":"invalid_request_error","message":"Test error"}}"#,
        )
        .unwrap();
        match event {
            UpstreamEvent::Error { error } => assert_eq!(error.message, "Test error"),
            other => panic!("Wrong event type: {other:?}"),
        }
    }

    #[test]
    fn test_output_item_added_deserialization() {
        let event = UpstreamEvent::from_value(&json!({
            "type": "response.output_item.added",
            "response_id": "resp_1",
            "output_index": 0,
            "item": {"id": "item_1", "type": "function_call", "call_id": "call_1", "name": "searchFaqs", "status": "in_progress"}
        }))
        .unwrap();
        let UpstreamEvent::OutputItemAdded { item } = event else {
            panic!("Wrong event type");
        };
        assert_eq!(item.name.as_deref(), Some("searchFaqs"));
    }
}
