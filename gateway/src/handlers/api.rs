use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::debug;

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// Fallback for unmatched paths.
///
/// WebSocket upgrades are only served on `/realtime`; attempts anywhere else
/// get a distinct error so clients can tell a wrong path from a dead server.
pub async fn fallback(headers: HeaderMap) -> Response {
    let is_upgrade = headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));

    if is_upgrade {
        debug!("Rejected WebSocket upgrade on unknown path");
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "unknown upgrade path" })),
        )
            .into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
    }
}
