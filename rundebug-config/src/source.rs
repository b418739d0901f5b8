//! Where the settings string comes from.
//!
//! A [`SettingsSource`] hands out whole-string snapshots. Every lookup asks
//! for a fresh snapshot, so a value changed by a test harness is observed on
//! the next read and a read never sees half of an update.

use parking_lot::RwLock;
use std::env;
use std::fmt;
use std::sync::Arc;

/// A provider of the raw comma-separated settings string.
pub trait SettingsSource: Send + Sync + fmt::Debug {
    /// The current settings string. Missing means empty.
    fn snapshot(&self) -> Arc<str>;
}

fn empty() -> Arc<str> {
    Arc::from("")
}

/// Reads one environment variable on every snapshot.
#[derive(Debug, Clone)]
pub struct EnvSource {
    var: String,
}

impl EnvSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable being read.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(crate::DEFAULT_ENV_VAR)
    }
}

impl SettingsSource for EnvSource {
    fn snapshot(&self) -> Arc<str> {
        // Non-UTF-8 bytes cannot match any key, so a lossy view is harmless.
        match env::var_os(&self.var) {
            Some(raw) => Arc::from(raw.to_string_lossy().as_ref()),
            None => empty(),
        }
    }
}

/// An in-memory settings string that can be swapped at runtime.
///
/// Used by tests and by embedders that receive settings from somewhere other
/// than the process environment.
#[derive(Debug)]
pub struct StaticSource {
    inner: RwLock<Arc<str>>,
}

impl StaticSource {
    pub fn new(settings: impl AsRef<str>) -> Self {
        Self {
            inner: RwLock::new(Arc::from(settings.as_ref())),
        }
    }

    /// Replace the settings string.
    pub fn set(&self, settings: impl AsRef<str>) {
        *self.inner.write() = Arc::from(settings.as_ref());
    }

    /// Reset to the empty string.
    pub fn clear(&self) {
        *self.inner.write() = empty();
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new("")
    }
}

impl SettingsSource for StaticSource {
    fn snapshot(&self) -> Arc<str> {
        self.inner.read().clone()
    }
}

/// A source layered over build-time defaults.
///
/// The snapshot is `"<primary>,<defaults>"`. Because lookup takes the first
/// matching entry, anything set in the primary source overrides the default.
#[derive(Debug, Clone)]
pub struct LayeredSource {
    primary: Arc<dyn SettingsSource>,
    defaults: Arc<str>,
}

impl LayeredSource {
    pub fn new(primary: Arc<dyn SettingsSource>, defaults: impl AsRef<str>) -> Self {
        Self {
            primary,
            defaults: Arc::from(defaults.as_ref()),
        }
    }

    pub fn defaults(&self) -> &str {
        &self.defaults
    }
}

impl SettingsSource for LayeredSource {
    fn snapshot(&self) -> Arc<str> {
        let primary = self.primary.snapshot();
        if self.defaults.is_empty() {
            return primary;
        }
        if primary.is_empty() {
            return self.defaults.clone();
        }
        Arc::from(format!("{},{}", primary, self.defaults))
    }
}
