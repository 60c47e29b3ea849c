pub mod graphql;
pub mod metrics;
pub mod workload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::MetricsError;

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    /// Failure of the request being served (business data, already recorded).
    Internal(String),
    /// Instrumentation call-site bug.
    Metrics(MetricsError),
    AlreadyRunning,
}

impl From<MetricsError> for AppError {
    fn from(e: MetricsError) -> Self {
        Self::Metrics(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::Metrics(e) => {
                tracing::error!(error = %e, "metrics recording failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Metrics recording failed".into(),
                )
            }
            Self::AlreadyRunning => {
                (StatusCode::CONFLICT, "Workload already running".into())
            }
        };

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
