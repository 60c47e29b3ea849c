use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes, middleware, and static serving.
pub fn create_router(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        // ── Instrumented request path ───────────────────────────
        .route("/graphql", get(handlers::graphql::graphql))
        // ── Scrape ──────────────────────────────────────────────
        .route("/metrics", get(handlers::metrics::scrape))
        // ── Workload control ────────────────────────────────────
        .route(
            "/api/workload/start",
            post(handlers::workload::start_workload),
        )
        .route(
            "/api/workload/stop",
            post(handlers::workload::stop_workload),
        )
        .route(
            "/api/workload/status",
            get(handlers::workload::workload_status),
        )
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Documentation page ──────────────────────────────────
        .fallback_service(ServeDir::new(static_dir))
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}
