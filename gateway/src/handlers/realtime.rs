//! Realtime WebSocket handler
//!
//! Each upgrade on `/realtime` becomes one relay session: the client socket
//! is pumped, an upstream session is dialed, and frames flow both ways until
//! either side closes.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::realtime::{FrameLink, UpstreamConnector};
use crate::core::relay::RelaySession;
use crate::errors::AppError;
use crate::state::AppState;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Upgrade to a relay session.
///
/// Refused with 503 before upgrading when no upstream credentials are
/// configured.
pub async fn realtime_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(connector) = state.connector.clone() else {
        return AppError::MissingApiKey.into_response();
    };

    info!("Realtime WebSocket connection upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_relay_socket(socket, state, connector))
}

async fn handle_relay_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connector: Arc<dyn UpstreamConnector>,
) {
    let cancel = CancellationToken::new();
    let client = FrameLink::spawn(socket, cancel.clone(), "client");
    let session = RelaySession::new(state.session_config.clone(), state.dispatcher.clone());

    let outcome = session.run(client, connector.as_ref(), cancel).await;
    info!(
        session_id = %outcome.session_id,
        reached_active = outcome.reached_active,
        tool_calls = outcome.tool_calls,
        "Realtime WebSocket connection finished"
    );
}
