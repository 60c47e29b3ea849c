use std::sync::Arc;

use super::accumulator::Accumulator;
use super::{MetricHandle, MetricKind, SeriesStore};
use crate::error::{MetricsError, Result};

/// Name-addressed update API over the series store.
///
/// Every operation validates fully before touching the store, so a failed
/// call never creates a series or changes a value.
#[derive(Clone)]
pub struct Recorder {
    store: Arc<SeriesStore>,
}

impl Recorder {
    pub fn new(store: Arc<SeriesStore>) -> Self {
        Self { store }
    }

    /// Add `delta` (finite, `>= 0`) to a counter series.
    pub fn increment_counter(&self, name: &str, label_values: &[&str], delta: f64) -> Result<()> {
        let handle = self.resolve(name, MetricKind::Counter)?;
        if !delta.is_finite() || delta < 0.0 {
            return Err(MetricsError::InvalidDelta {
                name: name.to_owned(),
                delta,
            });
        }

        match &*self.store.get_or_create(handle, label_values)? {
            Accumulator::Counter(cell) => {
                cell.fetch_add(delta);
                Ok(())
            }
            other => Err(kind_mismatch(name, MetricKind::Counter, other)),
        }
    }

    /// Shorthand for `increment_counter(name, label_values, 1.0)`.
    pub fn inc(&self, name: &str, label_values: &[&str]) -> Result<()> {
        self.increment_counter(name, label_values, 1.0)
    }

    pub fn observe_histogram(&self, name: &str, label_values: &[&str], value: f64) -> Result<()> {
        let handle = self.resolve(name, MetricKind::Histogram)?;
        if value.is_nan() {
            return Err(MetricsError::InvalidValue {
                name: name.to_owned(),
                value,
            });
        }

        match &*self.store.get_or_create(handle, label_values)? {
            Accumulator::Histogram(hist) => {
                hist.observe(value);
                Ok(())
            }
            other => Err(kind_mismatch(name, MetricKind::Histogram, other)),
        }
    }

    /// Last write wins.
    pub fn set_gauge(&self, name: &str, label_values: &[&str], value: f64) -> Result<()> {
        let handle = self.resolve(name, MetricKind::Gauge)?;

        match &*self.store.get_or_create(handle, label_values)? {
            Accumulator::Gauge(cell) => {
                cell.store(value);
                Ok(())
            }
            other => Err(kind_mismatch(name, MetricKind::Gauge, other)),
        }
    }

    fn resolve(&self, name: &str, expected: MetricKind) -> Result<MetricHandle> {
        let registry = self.store.registry();
        let handle = registry.resolve(name)?;
        let actual = registry.definition(handle).kind;
        if actual != expected {
            return Err(MetricsError::WrongKind {
                name: name.to_owned(),
                expected,
                actual,
            });
        }
        Ok(handle)
    }
}

/// The store built an accumulator that disagrees with the definition.
fn kind_mismatch(name: &str, expected: MetricKind, acc: &Accumulator) -> MetricsError {
    MetricsError::WrongKind {
        name: name.to_owned(),
        expected,
        actual: acc.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::accumulator::HistogramSnapshot;
    use crate::metrics::{MetricDefinition, Registry};

    fn recorder() -> (Recorder, Arc<SeriesStore>) {
        let mut reg = Registry::new();
        reg.register(MetricDefinition::counter("requests_total", "h", &["operation"]))
            .unwrap();
        reg.register(MetricDefinition::histogram(
            "duration_seconds",
            "h",
            &["operation"],
            &[0.1, 0.5, 1.0, 2.0, 5.0],
        ))
        .unwrap();
        reg.register(MetricDefinition::gauge("sessions", "h", &[])).unwrap();
        let store = Arc::new(SeriesStore::new(Arc::new(reg)));
        (Recorder::new(Arc::clone(&store)), store)
    }

    fn value(store: &SeriesStore, name: &str, labels: &[&str]) -> f64 {
        let handle = store.registry().resolve(name).unwrap();
        match &*store.get_or_create(handle, labels).unwrap() {
            Accumulator::Counter(c) | Accumulator::Gauge(c) => c.load(),
            Accumulator::Histogram(_) => panic!("not scalar"),
        }
    }

    fn histogram(store: &SeriesStore, name: &str, labels: &[&str]) -> HistogramSnapshot {
        let handle = store.registry().resolve(name).unwrap();
        match &*store.get_or_create(handle, labels).unwrap() {
            Accumulator::Histogram(h) => h.snapshot(),
            _ => panic!("not a histogram"),
        }
    }

    #[test]
    fn concurrent_increments_sum_exactly() {
        let (rec, store) = recorder();
        std::thread::scope(|s| {
            for t in 0..8u32 {
                let rec = rec.clone();
                s.spawn(move || {
                    for _ in 0..500 {
                        rec.increment_counter("requests_total", &["listX"], f64::from(t))
                            .unwrap();
                    }
                });
            }
        });
        // 500 * (0 + 1 + ... + 7)
        assert_eq!(value(&store, "requests_total", &["listX"]), 14_000.0);
    }

    #[test]
    fn histogram_matches_worked_example() {
        let (rec, store) = recorder();
        for v in [0.05, 0.3, 1.5] {
            rec.observe_histogram("duration_seconds", &["q"], v).unwrap();
        }
        let snap = histogram(&store, "duration_seconds", &["q"]);
        let counts: Vec<u64> = snap.buckets.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![1, 2, 2, 3, 3]);
        assert_eq!(snap.count, 3);
        assert!((snap.sum - 1.85).abs() < 1e-9);
    }

    #[test]
    fn concurrent_observations_keep_buckets_consistent() {
        let (rec, store) = recorder();
        let samples = [0.05, 0.2, 0.7, 1.5, 3.0, 9.0];
        std::thread::scope(|s| {
            for _ in 0..6 {
                let rec = rec.clone();
                s.spawn(move || {
                    for v in samples {
                        rec.observe_histogram("duration_seconds", &["q"], v).unwrap();
                    }
                });
            }
        });

        let snap = histogram(&store, "duration_seconds", &["q"]);
        for (bound, count) in &snap.buckets {
            let expected = samples.iter().filter(|v| *v <= bound).count() as u64 * 6;
            assert_eq!(*count, expected, "le={bound}");
        }
        assert!(snap.buckets.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(snap.count, 36);
    }

    #[test]
    fn wrong_kind_leaves_state_untouched() {
        let (rec, store) = recorder();
        rec.observe_histogram("duration_seconds", &["q"], 0.3).unwrap();
        let before = histogram(&store, "duration_seconds", &["q"]);

        let err = rec.inc("duration_seconds", &["q"]).unwrap_err();
        assert_eq!(
            err,
            MetricsError::WrongKind {
                name: "duration_seconds".into(),
                expected: MetricKind::Counter,
                actual: MetricKind::Histogram,
            }
        );
        assert!(rec.set_gauge("requests_total", &["q"], 1.0).is_err());
        assert!(rec.observe_histogram("sessions", &[], 1.0).is_err());

        assert_eq!(histogram(&store, "duration_seconds", &["q"]), before);
    }

    #[test]
    fn usage_errors_create_no_series() {
        let (rec, store) = recorder();
        let handle = store.registry().resolve("requests_total").unwrap();

        assert!(matches!(
            rec.increment_counter("requests_total", &["a"], -1.0),
            Err(MetricsError::InvalidDelta { .. })
        ));
        assert!(matches!(
            rec.increment_counter("requests_total", &["a"], f64::NAN),
            Err(MetricsError::InvalidDelta { .. })
        ));
        assert!(matches!(
            rec.inc("requests_total", &[]),
            Err(MetricsError::LabelArity { .. })
        ));
        assert_eq!(
            rec.inc("missing_total", &[]).unwrap_err(),
            MetricsError::UnknownMetric("missing_total".into())
        );
        assert!(matches!(
            rec.observe_histogram("duration_seconds", &["a"], f64::NAN),
            Err(MetricsError::InvalidValue { .. })
        ));
        assert_eq!(store.series_count(handle), 0);
    }

    #[test]
    fn gauge_is_last_write_wins() {
        let (rec, store) = recorder();
        rec.set_gauge("sessions", &[], 42.0).unwrap();
        rec.set_gauge("sessions", &[], -7.5).unwrap();
        assert_eq!(value(&store, "sessions", &[]), -7.5);
    }

    #[test]
    fn mismatched_accumulator_reports_its_own_kind() {
        let gauge = Accumulator::new(MetricKind::Gauge, &Arc::from(Vec::<f64>::new()));
        assert_eq!(
            kind_mismatch("requests_total", MetricKind::Counter, &gauge),
            MetricsError::WrongKind {
                name: "requests_total".into(),
                expected: MetricKind::Counter,
                actual: MetricKind::Gauge,
            }
        );
    }

    #[test]
    fn zero_delta_is_allowed() {
        let (rec, store) = recorder();
        rec.increment_counter("requests_total", &["a"], 0.0).unwrap();
        assert_eq!(value(&store, "requests_total", &["a"]), 0.0);
    }
}
