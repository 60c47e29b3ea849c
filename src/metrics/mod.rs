pub mod accumulator;
pub mod exporter;
pub mod recorder;
pub mod registry;
pub mod store;

use std::fmt;

pub use exporter::{Exporter, TEXT_FORMAT_CONTENT_TYPE};
pub use recorder::Recorder;
pub use registry::{MetricHandle, Registry};
pub use store::SeriesStore;

/// The three accumulator shapes a metric can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Lower-case name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a metric, fixed at registration.
///
/// Label order matters: series keys are the label *values* in exactly this
/// order, so callers must pass values positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    /// Upper bounds for histograms, strictly increasing. `+Inf` is implicit.
    pub buckets: Vec<f64>,
}

impl MetricDefinition {
    pub fn counter(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricKind::Counter, label_names, Vec::new())
    }

    pub fn gauge(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricKind::Gauge, label_names, Vec::new())
    }

    pub fn histogram(name: &str, help: &str, label_names: &[&str], buckets: &[f64]) -> Self {
        Self::new(
            name,
            help,
            MetricKind::Histogram,
            label_names,
            buckets.to_vec(),
        )
    }

    fn new(
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
        buckets: Vec<f64>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            help: help.to_owned(),
            kind,
            label_names: label_names.iter().map(|l| (*l).to_owned()).collect(),
            buckets,
        }
    }
}
