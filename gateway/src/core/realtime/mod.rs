//! Realtime API plumbing shared by the relay and the client pipeline.
//!
//! - `messages` - typed client and server events
//! - `config` - session settings and the `session.update` payload
//! - `transport` - socket pumps, [`Frame`] and [`ParsedFrame`]
//! - `connector` - dialing the upstream session

pub mod config;
pub mod connector;
pub mod messages;
pub mod transport;

pub use config::{
    DEFAULT_REALTIME_MODEL, DEFAULT_REALTIME_URL, Modality, PCM16_FORMAT, RealtimeSettings,
    VadSettings, Voice,
};
pub use connector::{OpenAIConnector, UpstreamConnector};
pub use messages::{
    ApiError, ClientEvent, ConversationItem, SessionConfig, ToolDef, TurnDetection,
    UpstreamEvent,
};
pub use transport::{
    FRAME_CHANNEL_CAPACITY, Frame, FrameLink, FrameLinkPeer, FrameRoute, ParsedFrame,
    WireMessage,
};
