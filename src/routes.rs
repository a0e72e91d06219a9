//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`            - Index redirect or notice (public)
//! - `GET  /health`      - Health check (public)
//! - `/tokens*`, `/urls*` - REST API (Bearer token required)
//! - `GET  /{shortcut}`  - Shortcut redirect (public)
//!
//! # Middleware
//!
//! - **Tracing** - Request spans with latency
//! - **Access log** - One combined-log line per request
//! - **Authentication** - Bearer API key on API routes
//!
//! A known path called with an unsupported method answers with an
//! `invalid-method` error envelope.

use crate::api;
use crate::api::handlers::{
    health_handler, index_handler, method_not_allowed_handler, redirect_handler,
};
use crate::api::middleware::{access_log, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/{shortcut}", get(redirect_handler))
        .merge(api::routes::protected_routes(state.clone()))
        .method_not_allowed_fallback(method_not_allowed_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access_log::layer,
        ))
        .with_state(state)
        .layer(tracing::layer())
}
