use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::accumulator::Accumulator;
use super::{MetricHandle, MetricKind, Registry};
use crate::error::{MetricsError, Result};

/// Ordered label values. Label names are not part of the key.
pub type SeriesKey = Vec<String>;

// ─── Public types ────────────────────────────────────────────────

/// Owns every accumulator, one map per registered metric.
///
/// The map lock is held only to look up or insert an `Arc<Accumulator>`;
/// updates then go straight to the accumulator, so recording on one series
/// never waits on another.
pub struct SeriesStore {
    registry: Arc<Registry>,
    families: Vec<Family>,
}

/// All series of one metric.
struct Family {
    kind: MetricKind,
    bounds: Arc<[f64]>,
    series: RwLock<HashMap<SeriesKey, Arc<Accumulator>>>,
}

// ─── SeriesStore impl ────────────────────────────────────────────

impl SeriesStore {
    /// Unlabelled metrics get their single series up front so they are
    /// exported before the first update.
    pub fn new(registry: Arc<Registry>) -> Self {
        let families = registry
            .iter()
            .map(|(_, def)| {
                let bounds: Arc<[f64]> = Arc::from(def.buckets.as_slice());
                let mut series = HashMap::new();
                if def.label_names.is_empty() {
                    series.insert(Vec::new(), Arc::new(Accumulator::new(def.kind, &bounds)));
                }
                Family {
                    kind: def.kind,
                    bounds,
                    series: RwLock::new(series),
                }
            })
            .collect();

        Self { registry, families }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Return the accumulator for `label_values`, creating it on first use.
    ///
    /// Concurrent callers racing on a new key all receive the same instance:
    /// the insert re-checks under the write lock and the first writer wins.
    pub(crate) fn get_or_create(
        &self,
        handle: MetricHandle,
        label_values: &[&str],
    ) -> Result<Arc<Accumulator>> {
        let (Some(def), Some(family)) = (
            self.registry.get(handle),
            self.families.get(handle.index()),
        ) else {
            return Err(MetricsError::UnknownMetric(format!(
                "handle #{}",
                handle.index()
            )));
        };
        if label_values.len() != def.label_names.len() {
            return Err(MetricsError::LabelArity {
                name: def.name.clone(),
                expected: def.label_names.len(),
                actual: label_values.len(),
            });
        }

        let key: SeriesKey = label_values.iter().map(|v| (*v).to_owned()).collect();

        if let Some(existing) = family.series.read().get(&key) {
            return Ok(Arc::clone(existing));
        }

        let mut series = family.series.write();
        let acc = series
            .entry(key)
            .or_insert_with(|| Arc::new(Accumulator::new(family.kind, &family.bounds)));
        Ok(Arc::clone(acc))
    }

    /// Existing series of one metric, sorted by key. Never creates anything.
    ///
    /// The read lock is released before the caller touches any accumulator.
    pub(crate) fn series(&self, handle: MetricHandle) -> Vec<(SeriesKey, Arc<Accumulator>)> {
        let Some(family) = self.families.get(handle.index()) else {
            return Vec::new();
        };
        let mut out: Vec<_> = family
            .series
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Number of live series for one metric.
    pub(crate) fn series_count(&self, handle: MetricHandle) -> usize {
        self.families
            .get(handle.index())
            .map_or(0, |f| f.series.read().len())
    }
}
