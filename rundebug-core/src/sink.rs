//! The seam between the registry and whatever aggregates metrics.

use serde::{Deserialize, Serialize};

/// Accepts named unsigned 64-bit counters.
pub trait MetricsSink {
    fn record_counter(&mut self, path: &str, value: u64);
}

/// One exported counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Full path, e.g. `/rundebug/non-default-behavior/http2client:events`
    pub name: String,
    pub value: u64,
}

impl MetricsSink for Vec<Sample> {
    fn record_counter(&mut self, path: &str, value: u64) {
        self.push(Sample {
            name: path.to_string(),
            value,
        });
    }
}
