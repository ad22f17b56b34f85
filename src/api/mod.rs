//! API module
//!
//! HTTP endpoints, middleware and the request rate limiter.

pub mod middleware;
pub mod rate_limit;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use routes::{create_router, AppState};

/// Build the application router
pub fn build_router(state: AppState, limiter: Arc<RateLimiter>) -> Router {
    // Axum layers run in reverse order: logging -> rate_limit -> handler
    let api_routes = create_router()
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::logging_middleware));

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
