//! Router assembly.
//!
//! `/` and `/realtime` are public; `/api/*` sits behind the rate limiter.
//! Anything else falls through to a 404, with a distinct error for
//! WebSocket upgrade attempts.

pub mod api;
pub mod realtime;

use std::sync::Arc;

use axum::Router;
use http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::handlers;
use crate::state::AppState;

/// Build the complete application router for `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let config = &state.config;

    // Rate limiting (disabled when rate >= 100000 for performance testing)
    let governor_layer = if config.rate_limit_disabled() {
        info!("Rate limiting disabled (rate >= 100000/s)");
        None
    } else {
        let governor_config = GovernorConfigBuilder::default()
            .per_second(config.rate_limit_requests_per_second as u64)
            .burst_size(config.rate_limit_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish();
        if governor_config.is_none() {
            warn!("Invalid rate limiter settings, rate limiting disabled");
        }
        governor_config.map(GovernorLayer::new)
    };

    let cors = cors_layer(config.cors_allowed_origins.as_deref());

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    let api_routes = api::create_api_router().layer(tower::util::option_layer(governor_layer));

    api::create_public_router()
        .merge(api_routes)
        .merge(realtime::create_realtime_router())
        .fallback(handlers::api::fallback)
        .with_state(state)
        .layer(cors)
        .layer(security_headers)
}

/// CORS from a comma-separated origin list, `"*"`, or nothing (same-origin).
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    match origins.map(str::trim) {
        Some("*") => base.allow_origin(Any).allow_credentials(false),
        Some(list) => {
            let origins: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            base.allow_origin(origins).allow_credentials(true)
        }
        None => {
            info!(
                "CORS not configured, defaulting to same-origin only. \
                 Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
            );
            base.allow_credentials(false)
        }
    }
}
