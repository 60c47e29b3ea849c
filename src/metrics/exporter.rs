//! Prometheus text exposition (format 0.0.4).
//!
//! Metrics are written sorted by name and series sorted by their ordered
//! label values, so unchanged state always renders to identical bytes.

use std::sync::Arc;

use super::accumulator::Accumulator;
use super::{MetricDefinition, SeriesStore};

/// `Content-Type` for the scrape response.
pub const TEXT_FORMAT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Read-only view of the store that renders scrape text.
#[derive(Clone)]
pub struct Exporter {
    store: Arc<SeriesStore>,
}

impl Exporter {
    pub fn new(store: Arc<SeriesStore>) -> Self {
        Self { store }
    }

    /// Render every registered metric and each of its observed series.
    ///
    /// Each accumulator is read on its own, so values are consistent per
    /// series but not across series.
    pub fn snapshot(&self) -> String {
        let registry = self.store.registry();
        let mut metrics: Vec<_> = registry.iter().collect();
        metrics.sort_by(|a, b| a.1.name.cmp(&b.1.name));

        let mut out = String::new();
        for (handle, def) in metrics {
            out.push_str(&format!("# HELP {} {}\n", def.name, escape_help(&def.help)));
            out.push_str(&format!("# TYPE {} {}\n", def.name, def.kind));

            for (key, acc) in self.store.series(handle) {
                let labels = render_labels(&def.label_names, &key);
                match &*acc {
                    Accumulator::Counter(v) | Accumulator::Gauge(v) => {
                        out.push_str(&format!("{}{} {}\n", def.name, braced(&labels), format_value(v.load())));
                    }
                    Accumulator::Histogram(h) => render_histogram(&mut out, def, &labels, &h.snapshot()),
                }
            }
        }
        out
    }
}

fn render_histogram(
    out: &mut String,
    def: &MetricDefinition,
    labels: &str,
    snap: &super::accumulator::HistogramSnapshot,
) {
    let prefix = if labels.is_empty() {
        String::new()
    } else {
        format!("{labels},")
    };

    for (le, count) in &snap.buckets {
        out.push_str(&format!("{}_bucket{{{}le=\"{}\"}} {}\n", def.name, prefix, format_value(*le), count));
    }
    out.push_str(&format!("{}_bucket{{{}le=\"+Inf\"}} {}\n", def.name, prefix, snap.count));
    out.push_str(&format!("{}_sum{} {}\n", def.name, braced(labels), format_value(snap.sum)));
    out.push_str(&format!("{}_count{} {}\n", def.name, braced(labels), snap.count));
}

/// `k1="v1",k2="v2"` in declared label order.
fn render_labels(names: &[String], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn braced(labels: &str) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("{{{labels}}}")
    }
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Shortest round-trip decimal; Prometheus spellings for non-finite values.
fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        v.to_string()
    }
}
