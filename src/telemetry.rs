//! GraphQL request instrumentation.
//!
//! Declares the request metrics and turns one classified request into the
//! matching recorder calls.

use std::time::Duration;

use crate::error::Result;
use crate::metrics::{MetricDefinition, Recorder, Registry};

// ─── Metric names ────────────────────────────────────────────────

pub const REQUESTS_TOTAL: &str = "litmus_graphql_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "litmus_graphql_request_duration_seconds";
pub const ERRORS_TOTAL: &str = "litmus_graphql_errors_total";
pub const ACTIVE_SESSIONS: &str = "litmus_active_sessions";

/// Upper bounds (seconds) of the request duration histogram.
pub const DURATION_BUCKETS: [f64; 5] = [0.1, 0.5, 1.0, 2.0, 5.0];

/// Register the four GraphQL metrics. Fails on a name clash.
pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register(MetricDefinition::counter(
        REQUESTS_TOTAL,
        "Total GraphQL requests by operation and status",
        &["operation", "status"],
    ))?;
    registry.register(MetricDefinition::histogram(
        REQUEST_DURATION_SECONDS,
        "GraphQL request duration in seconds",
        &["operation"],
        &DURATION_BUCKETS,
    ))?;
    registry.register(MetricDefinition::counter(
        ERRORS_TOTAL,
        "Total GraphQL errors by operation",
        &["operation", "error_type"],
    ))?;
    registry.register(MetricDefinition::gauge(
        ACTIVE_SESSIONS,
        "Number of active user sessions",
        &[],
    ))?;
    Ok(())
}

// ─── Classified request ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error { error_type: String },
}

impl Outcome {
    /// Value of the `status` label.
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error { .. } => "error",
        }
    }
}

/// One finished (or failed) request as seen by the classifier.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub operation: String,
    pub outcome: Outcome,
    pub duration: Duration,
}

// ─── Recording ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct GraphqlTelemetry {
    recorder: Recorder,
}

impl GraphqlTelemetry {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    /// Duration first, then the request count, then the error count when the
    /// request failed.
    pub fn record(&self, req: &RequestRecord) -> Result<()> {
        let op = req.operation.as_str();

        self.recorder
            .observe_histogram(REQUEST_DURATION_SECONDS, &[op], req.duration.as_secs_f64())?;
        self.recorder.inc(REQUESTS_TOTAL, &[op, req.outcome.status()])?;

        if let Outcome::Error { error_type } = &req.outcome {
            self.recorder.inc(ERRORS_TOTAL, &[op, error_type.as_str()])?;
        }
        Ok(())
    }

    pub fn set_active_sessions(&self, value: f64) -> Result<()> {
        self.recorder.set_gauge(ACTIVE_SESSIONS, &[], value)
    }
}
