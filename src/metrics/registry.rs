use std::collections::HashMap;

use super::{MetricDefinition, MetricKind};
use crate::error::{MetricsError, Result};

// ─── Public types ────────────────────────────────────────────────

/// Opaque index into the registry, resolved once per recorder call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricHandle(usize);

impl MetricHandle {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Append-only set of metric definitions.
///
/// Registration takes `&mut self`, so it only happens while the registry is
/// still exclusively owned during startup. Once wrapped in an `Arc` it is
/// read-only and lookups need no locking.
#[derive(Debug, Default)]
pub struct Registry {
    definitions: Vec<MetricDefinition>,
    by_name: HashMap<String, MetricHandle>,
}

// ─── Registry impl ───────────────────────────────────────────────

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a definition.
    pub fn register(&mut self, definition: MetricDefinition) -> Result<MetricHandle> {
        if self.by_name.contains_key(&definition.name) {
            return Err(MetricsError::DuplicateName(definition.name));
        }
        validate(&definition)?;

        let handle = MetricHandle(self.definitions.len());
        self.by_name.insert(definition.name.clone(), handle);
        self.definitions.push(definition);
        Ok(handle)
    }

    pub fn resolve(&self, name: &str) -> Result<MetricHandle> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| MetricsError::UnknownMetric(name.to_owned()))
    }

    /// `None` for a handle issued by a different registry.
    pub fn get(&self, handle: MetricHandle) -> Option<&MetricDefinition> {
        self.definitions.get(handle.index())
    }

    /// Only for handles this registry just resolved.
    pub(crate) fn definition(&self, handle: MetricHandle) -> &MetricDefinition {
        &self.definitions[handle.index()]
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricHandle, &MetricDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (MetricHandle(i), d))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// ─── Validation ──────────────────────────────────────────────────

fn validate(def: &MetricDefinition) -> Result<()> {
    let invalid = |reason: String| MetricsError::InvalidDefinition {
        name: def.name.clone(),
        reason,
    };

    if !is_valid_name(&def.name, true) {
        return Err(invalid("metric name must match [a-zA-Z_:][a-zA-Z0-9_:]*".into()));
    }

    for (i, label) in def.label_names.iter().enumerate() {
        if !is_valid_name(label, false) || label.starts_with("__") {
            return Err(invalid(format!("invalid label name '{label}'")));
        }
        if def.label_names[..i].contains(label) {
            return Err(invalid(format!("duplicate label name '{label}'")));
        }
        if def.kind == MetricKind::Histogram && label == "le" {
            return Err(invalid("'le' is reserved for histogram buckets".into()));
        }
    }

    if def.kind == MetricKind::Histogram {
        validate_buckets(def)?;
    } else if !def.buckets.is_empty() {
        return Err(invalid(format!("a {} cannot declare buckets", def.kind)));
    }

    Ok(())
}

fn validate_buckets(def: &MetricDefinition) -> Result<()> {
    let invalid = |reason: &str| MetricsError::InvalidBuckets {
        name: def.name.clone(),
        reason: reason.to_owned(),
    };

    if def.buckets.iter().any(|b| !b.is_finite()) {
        return Err(invalid("bounds must be finite (+Inf is implicit)"));
    }
    if def.buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err(invalid("bounds must be strictly increasing"));
    }
    Ok(())
}

/// Prometheus naming rules. Colons are only legal in metric names.
fn is_valid_name(name: &str, allow_colon: bool) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let head_ok = first.is_ascii_alphabetic() || first == '_' || (allow_colon && first == ':');
    head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || (allow_colon && c == ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = Registry::new();
        reg.register(MetricDefinition::counter("requests_total", "h", &["operation"]))
            .unwrap();
        let err = reg
            .register(MetricDefinition::gauge("requests_total", "h", &[]))
            .unwrap_err();
        assert_eq!(err, MetricsError::DuplicateName("requests_total".into()));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.definition(reg.resolve("requests_total").unwrap()).kind, MetricKind::Counter);
    }

    #[test]
    fn resolve_unknown_metric() {
        let reg = Registry::new();
        assert_eq!(
            reg.resolve("nope").unwrap_err(),
            MetricsError::UnknownMetric("nope".into())
        );
    }

    #[test]
    fn buckets_must_increase_strictly() {
        let mut reg = Registry::new();
        for bad in [&[0.5, 0.5][..], &[1.0, 0.1][..], &[0.1, f64::INFINITY][..], &[f64::NAN][..]] {
            let err = reg
                .register(MetricDefinition::histogram("d", "h", &[], bad))
                .unwrap_err();
            assert!(matches!(err, MetricsError::InvalidBuckets { .. }), "{bad:?}");
        }
        assert!(reg.is_empty());
        reg.register(MetricDefinition::histogram("d", "h", &[], &[]))
            .unwrap();
    }

    #[test]
    fn bad_names_and_labels() {
        let mut reg = Registry::new();
        let cases = [
            MetricDefinition::counter("", "h", &[]),
            MetricDefinition::counter("1abc", "h", &[]),
            MetricDefinition::counter("ok", "h", &["a:b"]),
            MetricDefinition::counter("ok", "h", &["a", "a"]),
            MetricDefinition::counter("ok", "h", &["__reserved"]),
            MetricDefinition::histogram("ok", "h", &["le"], &[1.0]),
        ];
        for def in cases {
            assert!(matches!(
                reg.register(def),
                Err(MetricsError::InvalidDefinition { .. })
            ));
        }

        let mut gauge = MetricDefinition::gauge("g", "h", &[]);
        gauge.buckets = vec![1.0];
        assert!(reg.register(gauge).is_err());
        assert!(reg.register(MetricDefinition::counter("ns:sub_total", "h", &["le"])).is_ok());
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut reg = Registry::new();
        let b = reg.register(MetricDefinition::gauge("b", "h", &[])).unwrap();
        let a = reg.register(MetricDefinition::gauge("a", "h", &[])).unwrap();
        let order: Vec<_> = reg.iter().map(|(h, d)| (h, d.name.as_str())).collect();
        assert_eq!(order, vec![(b, "b"), (a, "a")]);
    }
}
