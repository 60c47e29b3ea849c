use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::metrics::TEXT_FORMAT_CONTENT_TYPE;
use crate::AppState;

// ─── GET /metrics ────────────────────────────────────────────────
/// Scrape endpoint. Read-only: never creates series or resets values.
pub async fn scrape(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, TEXT_FORMAT_CONTENT_TYPE)],
        state.exporter.snapshot(),
    )
}
