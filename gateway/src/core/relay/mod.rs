//! Relay sessions.
//!
//! A relay session pairs one client WebSocket with one upstream realtime
//! session. Frames are forwarded verbatim in both directions; upstream
//! function calls are intercepted, executed by the
//! [`ToolDispatcher`](crate::core::tools::ToolDispatcher), and answered
//! upstream. Either side closing closes the other.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting --dial ok, session.update sent--> Active --either side closes--> Closing --> Closed
//!     |                                                                          ^
//!     +--------------------------------dial failed-------------------------------+
//! ```

mod session;

use thiserror::Error;

pub use session::{RelayOutcome, RelaySession};

/// Lifecycle state of a relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Client accepted, upstream dial in progress
    Connecting,
    /// Forwarding in both directions
    Active,
    /// One side is gone, the other is being closed
    Closing,
    /// Terminal
    Closed,
}

impl RelayState {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end a relay session.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream WebSocket could not be opened
    #[error("Upstream connection failed: {0}")]
    UpstreamDial(String),

    /// The upstream answered the handshake with an HTTP error
    #[error("Upstream rejected the handshake with HTTP {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A pump channel closed before a frame could be queued
    #[error("{0} connection closed")]
    ChannelClosed(&'static str),
}
