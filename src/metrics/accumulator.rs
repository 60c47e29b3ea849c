use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::MetricKind;

// ─── Atomic float cell ───────────────────────────────────────────

/// `f64` stored as raw bits in an `AtomicU64`.
#[derive(Debug, Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }

    /// CAS loop; concurrent adds are never lost.
    pub fn fetch_add(&self, delta: f64) -> f64 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(prev) => return f64::from_bits(prev),
                Err(actual) => current = actual,
            }
        }
    }
}

// ─── Histogram accumulator ───────────────────────────────────────

/// Cumulative bucket counts plus running sum and count.
///
/// All three parts change under one lock so a reader never sees a sample
/// counted in some buckets but not others.
#[derive(Debug)]
pub struct Histogram {
    bounds: Arc<[f64]>,
    state: Mutex<HistogramState>,
}

#[derive(Debug, Clone)]
struct HistogramState {
    /// `cumulative[i]` counts samples `<= bounds[i]`.
    cumulative: Vec<u64>,
    sum: f64,
    count: u64,
}

/// Point-in-time copy of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` in ascending bound order.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    /// Also the value of the implicit `+Inf` bucket.
    pub count: u64,
}

impl Histogram {
    pub fn new(bounds: Arc<[f64]>) -> Self {
        let state = HistogramState {
            cumulative: vec![0; bounds.len()],
            sum: 0.0,
            count: 0,
        };
        Self {
            bounds,
            state: Mutex::new(state),
        }
    }

    pub fn observe(&self, value: f64) {
        // Bounds are sorted, so every bucket from the first bound >= value on
        // receives the sample.
        let first = self.bounds.partition_point(|b| *b < value);

        let mut state = self.state.lock();
        for c in &mut state.cumulative[first..] {
            *c += 1;
        }
        state.sum += value;
        state.count += 1;
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let state = self.state.lock().clone();
        HistogramSnapshot {
            buckets: self.bounds.iter().copied().zip(state.cumulative).collect(),
            sum: state.sum,
            count: state.count,
        }
    }
}

// ─── Accumulator ─────────────────────────────────────────────────

/// Live state for one series. Created once, then only mutated in place.
#[derive(Debug)]
pub enum Accumulator {
    Counter(AtomicF64),
    Gauge(AtomicF64),
    Histogram(Histogram),
}

impl Accumulator {
    /// Zero-initialised accumulator for a metric of `kind`.
    pub fn new(kind: MetricKind, bounds: &Arc<[f64]>) -> Self {
        match kind {
            MetricKind::Counter => Accumulator::Counter(AtomicF64::default()),
            MetricKind::Gauge => Accumulator::Gauge(AtomicF64::default()),
            MetricKind::Histogram => Accumulator::Histogram(Histogram::new(Arc::clone(bounds))),
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Accumulator::Counter(_) => MetricKind::Counter,
            Accumulator::Gauge(_) => MetricKind::Gauge,
            Accumulator::Histogram(_) => MetricKind::Histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_f64_adds_from_many_threads() {
        let cell = AtomicF64::new(0.0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1_000 {
                        cell.fetch_add(0.5);
                    }
                });
            }
        });
        assert_eq!(cell.load(), 4_000.0);
    }

    #[test]
    fn histogram_boundary_is_inclusive() {
        let h = Histogram::new(Arc::from(vec![1.0, 2.0]));
        h.observe(1.0);
        h.observe(2.5);
        let snap = h.snapshot();
        assert_eq!(snap.buckets, vec![(1.0, 1), (2.0, 1)]);
        assert_eq!(snap.count, 2);
        assert_eq!(snap.sum, 3.5);
    }

    #[test]
    fn histogram_without_bounds_only_counts() {
        let h = Histogram::new(Arc::from(Vec::<f64>::new()));
        h.observe(-3.0);
        let snap = h.snapshot();
        assert!(snap.buckets.is_empty());
        assert_eq!((snap.sum, snap.count), (-3.0, 1));
    }
}
