//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`  - Short link redirect (public)
//! - `GET  /health`  - Health check: database and cache (public)
//! - `/api/*`        - Link management API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Timeout** - Bounded request duration
//! - **Rate limiting** - Per-IP token bucket on `/api` only
//! - **Path normalization** - Trailing slash handling

use std::time::Duration;

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::timeout::TimeoutLayer;

/// Constructs the production router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   forwarded headers instead of the peer socket address
/// - `request_timeout` - upper bound on handling a single request
pub fn app_router(
    state: AppState,
    behind_proxy: bool,
    request_timeout: Duration,
) -> NormalizePath<Router> {
    let api_router = rate_limit::apply(
        api::routes::protected_routes(state.clone()),
        behind_proxy,
    );

    let router = public_routes(api_router)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// All routes with authentication but without rate limiting or timeouts.
///
/// Does not need connect info, so it can be served by in-process test clients.
pub fn service_router(state: AppState) -> Router {
    public_routes(api::routes::protected_routes(state.clone())).with_state(state)
}

fn public_routes(api_router: Router<AppState>) -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api_router)
}
