//! Point-in-time copies of the exported counters.

use rundebug_core::{MetricsSink, Registry, Sample};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Counters keyed by their full path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    counters: BTreeMap<String, u64>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every exported counter of `registry`.
    pub fn capture(registry: &Registry) -> Self {
        let mut snapshot = Self::new();
        registry.export(&mut snapshot);
        snapshot
    }

    pub fn get(&self, path: &str) -> Option<u64> {
        self.counters.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.counters
            .into_iter()
            .map(|(name, value)| Sample { name, value })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl MetricsSink for Snapshot {
    fn record_counter(&mut self, path: &str, value: u64) {
        self.counters.insert(path.to_string(), value);
    }
}

/// One `path value` line per counter.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, value) in self.iter() {
            writeln!(f, "{} {}", path, value)?;
        }
        Ok(())
    }
}

/// Value of a requested metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Uint64(u64),
    /// No counter is exported under the requested path.
    #[default]
    Bad,
}

impl Value {
    pub fn uint64(self) -> Option<u64> {
        match self {
            Value::Uint64(v) => Some(v),
            Value::Bad => None,
        }
    }
}

/// A metric requested by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl MetricSample {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Bad,
        }
    }
}

/// Fill in each sample's value from one capture of `registry`.
///
/// Paths that are not exported, including those of internal settings, read
/// as [`Value::Bad`].
pub fn read(registry: &Registry, samples: &mut [MetricSample]) {
    let snapshot = Snapshot::capture(registry);
    for sample in samples.iter_mut() {
        sample.value = snapshot.get(&sample.name).map_or(Value::Bad, Value::Uint64);
    }
}
