//! Realtime WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::realtime::realtime_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the Realtime WebSocket router
///
/// # Endpoint
///
/// `GET /realtime` - WebSocket upgrade into a relay session
///
/// # Protocol
///
/// Frames are relayed verbatim between the client and the upstream realtime
/// session. Clients send `input_audio_buffer.append` events and receive
/// `response.audio.delta` events (PCM16, 24kHz, mono, base64). Tool calls are
/// forwarded to the client like any other event, and the server answers them
/// upstream itself.
pub fn create_realtime_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/realtime", get(realtime_handler))
        .layer(TraceLayer::new_for_http())
}
