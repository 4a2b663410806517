//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, collect, health, stats, status};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for event collection endpoints.
const COLLECT_MAX_CONCURRENT_REQUESTS: usize = 200;

/// Maximum concurrent requests for statistics and admin endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Liveness check
///
/// ## Collection (rate-limited)
/// - `POST /api/collect/borrow` - Record a borrow
/// - `POST /api/collect/return` - Record a return
/// - `POST /api/collect/login` - Record a login
///
/// ## Statistics
/// - `GET /api/stats/today` - Today's counters
/// - `GET /api/stats/hot-books?limit=N` - Borrow leaderboard
/// - `GET /api/stats/overview` - All-time totals
/// - `GET /api/stats/recent-days?days=N` - Per-day rollup
///
/// ## Operations
/// - `GET /api/status` - Service and store status
/// - `POST /api/admin/cleanup` - Run the retention sweep now
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let collect_routes = Router::new()
        .route("/borrow", post(collect::collect_borrow))
        .route("/return", post(collect::collect_return))
        .route("/login", post(collect::collect_login))
        .layer(ConcurrencyLimitLayer::new(COLLECT_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Statistics
        .route("/stats/today", get(stats::today))
        .route("/stats/hot-books", get(stats::hot_books))
        .route("/stats/overview", get(stats::overview))
        .route("/stats/recent-days", get(stats::recent_days))
        // Operations
        .route("/status", get(status::status))
        .route("/admin/cleanup", post(admin::cleanup))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS))
        // Collection routes (with their own concurrency limit)
        .nest("/collect", collect_routes);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
