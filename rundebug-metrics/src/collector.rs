//! Prometheus collector over a settings registry.
//!
//! Counter paths contain `/` and `:`, which Prometheus names cannot, so every
//! exported setting becomes one series of a single counter family labelled by
//! setting name:
//!
//! ```text
//! rundebug_non_default_behavior_events_total{setting="http2client"} 3
//! ```

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntCounterVec, Opts};
use rundebug_core::Registry;
use rundebug_log::warn;
use std::fmt;
use std::sync::Arc;

/// Label carrying the setting name.
pub const SETTING_LABEL: &str = "setting";

const HELP: &str = "Uses of non-default settings values";

/// Reads the registry's counters on every scrape.
pub struct NonDefaultCollector {
    settings: Arc<Registry>,
    opts: Opts,
    // Only consulted for `desc()`; series are rebuilt in `collect()`.
    template: IntCounterVec,
}

impl NonDefaultCollector {
    pub fn new(settings: Arc<Registry>) -> prometheus::Result<Self> {
        let opts = Opts::new(metric_name(settings.namespace()), HELP);
        let template = IntCounterVec::new(opts.clone(), &[SETTING_LABEL])?;
        Ok(Self {
            settings,
            opts,
            template,
        })
    }

    /// Name of the exposed counter family.
    pub fn metric_name(&self) -> &str {
        &self.opts.name
    }

    /// Register with the default Prometheus registry.
    pub fn register(self) -> prometheus::Result<()> {
        self.register_with(crate::default_registry())
    }

    /// Register with a specific Prometheus registry.
    pub fn register_with(self, registry: &prometheus::Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self))
    }
}

impl fmt::Debug for NonDefaultCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonDefaultCollector")
            .field("metric", &self.opts.name)
            .field("settings", &self.settings.len())
            .finish()
    }
}

impl Collector for NonDefaultCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.template.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let vec = match IntCounterVec::new(self.opts.clone(), &[SETTING_LABEL]) {
            Ok(vec) => vec,
            Err(e) => {
                warn!(target: "rundebug::metrics", "Failed to build counter family: {}", e);
                return Vec::new();
            }
        };

        for setting in self.settings.exported() {
            vec.with_label_values(&[setting.name()])
                .inc_by(setting.non_default_count());
        }
        vec.collect()
    }
}

/// Prometheus-safe family name for `namespace`.
pub fn metric_name(namespace: &str) -> String {
    let mut name: String = namespace
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name.push_str("_non_default_behavior_events_total");
    name
}
