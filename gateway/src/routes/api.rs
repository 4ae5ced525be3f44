use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{ai, api, bookings};
use crate::state::AppState;
use std::sync::Arc;

/// Public routes that are never rate limited
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the `/api` router
///
/// Note: rate limiting is applied in main.rs where the configuration is known
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/generate", post(ai::generate))
        .route("/api/chat", post(ai::chat))
        .route("/api/bookings", post(bookings::create_booking))
        .layer(TraceLayer::new_for_http())
}
