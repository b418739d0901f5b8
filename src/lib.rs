// rundebug - runtime debug settings for Rust programs
//
// Flat `name=value` settings read from one environment variable, counters for
// uses of non-default values, and a bisect protocol for locating the check
// responsible for a behavior change.

// Re-export core functionality
pub use rundebug_core::*;

pub use rundebug_config::{
    ConfigError, EnvSource, LayeredSource, RunDebugConfig, SettingsSource, StaticSource,
};

pub use rundebug_config;
pub use rundebug_log;

#[cfg(feature = "metrics")]
pub use rundebug_metrics;

/// Registry reading the process environment with default configuration.
///
/// Equivalent to `Registry::new(Arc::new(EnvSource::default()))`.
pub fn env_registry() -> Registry {
    Registry::new(std::sync::Arc::new(EnvSource::default()))
}

/// Convenient imports for consuming code.
pub mod prelude {
    pub use crate::{CallSite, Outcome, Registry, RunDebugConfig, Setting, StaticSource};
}
