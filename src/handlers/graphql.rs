use axum::{
    extract::{Query, State},
    Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::telemetry::{Outcome, RequestRecord};
use crate::AppState;

use super::AppError;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlParams {
    /// Missing or empty means `unknown`.
    #[serde(default)]
    pub operation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlData {
    pub operation: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlResponse {
    pub data: GraphqlData,
}

// ─── GET /graphql?operation=... ──────────────────────────────────

pub async fn graphql(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphqlParams>,
) -> Result<Json<GraphqlResponse>, AppError> {
    let operation = params
        .operation
        .filter(|op| !op.is_empty())
        .unwrap_or_else(|| "unknown".into());

    let data = execute(&state, &operation).await?;
    Ok(Json(GraphqlResponse { data }))
}

// ─── Simulated request path ──────────────────────────────────────

/// Run one simulated operation and record its outcome.
///
/// Shared by the HTTP handler and the workload generator. A simulated
/// failure is recorded as an `error` outcome before it is returned.
pub async fn execute(state: &AppState, operation: &str) -> Result<GraphqlData, AppError> {
    let t0 = Instant::now();
    let sim = &state.simulation;

    // ThreadRng is !Send; draw everything before the await.
    let (delay, failed) = {
        let mut rng = rand::thread_rng();
        let delay_ms = if sim.max_delay_ms > 0 {
            rng.gen_range(0..sim.max_delay_ms)
        } else {
            0
        };
        (Duration::from_millis(delay_ms), rng.gen_bool(sim.error_rate))
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let outcome = if failed {
        Outcome::Error {
            error_type: sim.error_type.clone(),
        }
    } else {
        Outcome::Success
    };

    let record = RequestRecord {
        operation: operation.to_owned(),
        outcome,
        duration: t0.elapsed(),
    };
    state.telemetry.record(&record)?;

    if failed {
        tracing::warn!(
            operation,
            error_type = %sim.error_type,
            elapsed_ms = record.duration.as_millis() as u64,
            "simulated graphql failure"
        );
        return Err(AppError::Internal("Internal server error".into()));
    }

    Ok(GraphqlData {
        operation: record.operation,
        status: "success",
    })
}
