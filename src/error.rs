//! Error taxonomy for the metrics core.

use thiserror::Error;

use crate::metrics::MetricKind;

/// Shared result type for registry, store and recorder operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Every failure is raised synchronously to the caller and leaves all
/// accumulators untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("metric '{0}' is already registered")]
    DuplicateName(String),

    #[error("invalid metric definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("invalid buckets for '{name}': {reason}")]
    InvalidBuckets { name: String, reason: String },

    #[error("metric '{0}' is not registered")]
    UnknownMetric(String),

    #[error("metric '{name}' is a {actual}, not a {expected}")]
    WrongKind {
        name: String,
        expected: MetricKind,
        actual: MetricKind,
    },

    #[error("metric '{name}' expects {expected} label values, got {actual}")]
    LabelArity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("counter '{name}' cannot be incremented by {delta}")]
    InvalidDelta { name: String, delta: f64 },

    #[error("histogram '{name}' cannot observe {value}")]
    InvalidValue { name: String, value: f64 },
}
