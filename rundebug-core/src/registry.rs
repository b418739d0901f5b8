//! Process-wide collection of settings.
//!
//! Startup code owns a [`Registry`]; subsystems register the settings they
//! consult and keep the returned handles. The registry is also the single
//! export point for the non-default counters.

use crate::error::{FlagError, Result};
use crate::setting::Setting;
use crate::sink::{MetricsSink, Sample};
use parking_lot::RwLock;
use rundebug_config::{
    DEFAULT_BISECT_KEY, DEFAULT_NAMESPACE, RunDebugConfig, SettingsSource, Validate,
    strip_internal,
};
use rundebug_log::{debug, trace};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of settings sharing one settings source.
#[derive(Debug)]
pub struct Registry {
    source: Arc<dyn SettingsSource>,
    namespace: String,
    bisect_key: String,
    /// Keyed by lookup name, without the internal marker.
    settings: RwLock<BTreeMap<String, Arc<Setting>>>,
}

fn reuse(existing: &Arc<Setting>, requested: &str) -> Result<Arc<Setting>> {
    if existing.full_name() == requested {
        Ok(existing.clone())
    } else {
        Err(FlagError::Conflict {
            requested: requested.to_string(),
            registered: existing.full_name().to_string(),
        })
    }
}

impl Registry {
    pub fn new(source: Arc<dyn SettingsSource>) -> Self {
        Self {
            source,
            namespace: DEFAULT_NAMESPACE.to_string(),
            bisect_key: DEFAULT_BISECT_KEY.to_string(),
            settings: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a registry from configuration and register its known settings.
    pub fn from_config(config: &RunDebugConfig) -> Result<Self> {
        config.validate()?;
        let registry = Self::new(config.source())
            .with_namespace(&config.namespace)
            .with_bisect_key(&config.bisect_key);

        for name in &config.known {
            registry.register(name.as_str())?;
        }
        Ok(registry)
    }

    /// Set the first segment of counter paths.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the key carrying the bisect directive for settings registered
    /// from now on.
    pub fn with_bisect_key(mut self, key: impl Into<String>) -> Self {
        self.bisect_key = key.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn bisect_key(&self) -> &str {
        &self.bisect_key
    }

    pub fn source(&self) -> &Arc<dyn SettingsSource> {
        &self.source
    }

    /// Current settings string.
    pub fn snapshot(&self) -> Arc<str> {
        self.source.snapshot()
    }

    /// Register `name`, or return the existing handle if it is already known.
    ///
    /// The counter of a setting starts at zero on first registration and is
    /// never reset. `foo` and `#foo` share a key, so registering one after the
    /// other fails with [`FlagError::Conflict`].
    pub fn register(&self, name: impl Into<String>) -> Result<Arc<Setting>> {
        let name = name.into();
        let key = strip_internal(&name).0;
        if let Some(existing) = self.settings.read().get(key) {
            return reuse(existing, &name);
        }

        let mut settings = self.settings.write();
        if let Some(existing) = settings.get(key) {
            return reuse(existing, &name);
        }

        let setting = Arc::new(
            Setting::new(name.as_str(), self.source.clone())?
                .with_bisect_key(self.bisect_key.clone()),
        );
        settings.insert(setting.name().to_string(), setting.clone());
        debug!(target: "rundebug::registry", "registered setting {}", setting.full_name());
        Ok(setting)
    }

    /// Look up a registered setting. A leading `#` is ignored.
    pub fn get(&self, name: &str) -> Option<Arc<Setting>> {
        self.settings.read().get(strip_internal(name).0).cloned()
    }

    /// All registered settings, ordered by name.
    pub fn settings(&self) -> Vec<Arc<Setting>> {
        self.settings.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.settings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.read().is_empty()
    }

    /// Path under which `name`'s counter is exported.
    pub fn metric_path(&self, name: &str) -> String {
        format!("/{}/non-default-behavior/{}:events", self.namespace, name)
    }

    /// Settings whose counters are exported: everything but internal ones.
    pub fn exported(&self) -> Vec<Arc<Setting>> {
        self.settings
            .read()
            .values()
            .filter(|s| !s.is_internal())
            .cloned()
            .collect()
    }

    /// Hand every exported counter to `sink`.
    ///
    /// Counters are read atomically one by one; each value is exact as of
    /// its read.
    pub fn export<S: MetricsSink + ?Sized>(&self, sink: &mut S) {
        let exported = self.exported();
        for setting in &exported {
            sink.record_counter(
                &self.metric_path(setting.name()),
                setting.non_default_count(),
            );
        }
        trace!(target: "rundebug::registry", "exported {} counters", exported.len());
    }

    /// Exported counters as a list.
    pub fn samples(&self) -> Vec<Sample> {
        let mut samples = Vec::new();
        self.export(&mut samples);
        samples
    }
}
