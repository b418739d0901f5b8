//! Metrics export for rundebug counters
//!
//! The core registry hands its counters to any [`MetricsSink`]. This crate
//! provides two sinks on top of that seam.
//!
//! # Features
//!
//! - **Snapshot** - counters keyed by path, read like a runtime metrics API
//! - **Prometheus** - a collector exposing every counter under one labelled family
//! - **Text export** - Prometheus exposition format for a `/metrics` style endpoint
//!
//! # Quick Start
//!
//! ```
//! use rundebug_metrics::*;
//! use rundebug_config::StaticSource;
//! use rundebug_core::Registry;
//! use std::sync::Arc;
//!
//! let settings = Arc::new(Registry::new(Arc::new(StaticSource::default())));
//! settings.register("http2client").unwrap().inc_non_default();
//!
//! let snapshot = Snapshot::capture(&settings);
//! assert_eq!(snapshot.get("/rundebug/non-default-behavior/http2client:events"), Some(1));
//!
//! let prom = prometheus::Registry::new();
//! NonDefaultCollector::new(settings).unwrap().register_with(&prom).unwrap();
//! assert!(export_metrics_from_registry(&prom).contains("setting=\"http2client\""));
//! ```

pub mod collector;
pub mod snapshot;

pub use collector::*;
pub use prometheus;
pub use rundebug_core::{MetricsSink, Sample};
pub use snapshot::*;

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};
use rundebug_log::{error, warn};

/// Global default registry
static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();

    // process_collector reads procfs
    #[cfg(target_os = "linux")]
    {
        if let Err(e) = registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        )) {
            warn!(target: "rundebug::metrics", "Failed to register process collector: {}", e);
        }
    }

    registry
});

/// Get the default Prometheus registry
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

/// Export everything in the default registry as Prometheus text format
pub fn export_metrics() -> String {
    export_metrics_from_registry(&DEFAULT_REGISTRY)
}

/// Export metrics from a specific registry
///
/// # Examples
///
/// ```
/// use rundebug_metrics::*;
/// use prometheus::Registry;
///
/// let registry = Registry::new();
/// let metrics = export_metrics_from_registry(&registry);
/// assert!(metrics.is_empty());
/// ```
pub fn export_metrics_from_registry(registry: &Registry) -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(target: "rundebug::metrics", "Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer)
        .unwrap_or_else(|_| String::from("# Error converting metrics to UTF-8\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        // Other tests may register into it concurrently.
        let _ = default_registry().gather();
    }

    #[test]
    fn test_export_metrics() {
        let metrics = export_metrics();
        assert!(metrics.contains("# HELP") || metrics.is_empty());
    }

    #[test]
    fn test_export_empty_registry() {
        assert_eq!(export_metrics_from_registry(&Registry::new()), "");
    }
}
