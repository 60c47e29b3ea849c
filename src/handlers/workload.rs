use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::workload;
use crate::AppState;

use super::AppError;

#[derive(Debug, Serialize)]
pub struct WorkloadStatus {
    pub running: bool,
    pub message: String,
}

// ─── POST /api/workload/start ────────────────────────────────────

pub async fn start_workload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorkloadStatus>, AppError> {
    if !workload::start(&state).await {
        return Err(AppError::AlreadyRunning);
    }

    Ok(Json(WorkloadStatus {
        running: true,
        message: format!(
            "Started: one request every {}ms over {} operations",
            state.workload.interval_ms,
            state.workload.operations.len(),
        ),
    }))
}

// ─── POST /api/workload/stop ─────────────────────────────────────

pub async fn stop_workload(State(state): State<Arc<AppState>>) -> Json<WorkloadStatus> {
    let message = if workload::stop(&state).await {
        "Workload stopped"
    } else {
        "No workload is running"
    };

    Json(WorkloadStatus {
        running: false,
        message: message.into(),
    })
}

// ─── GET /api/workload/status ────────────────────────────────────

pub async fn workload_status(State(state): State<Arc<AppState>>) -> Json<WorkloadStatus> {
    let running = workload::is_running(&state).await;
    Json(WorkloadStatus {
        running,
        message: if running {
            "Workload in progress".into()
        } else {
            "Idle".into()
        },
    })
}
