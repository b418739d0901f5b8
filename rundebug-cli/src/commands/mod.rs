//! CLI command implementations.

pub mod check;
pub mod demo;
pub mod get;
pub mod list;
pub mod metrics;

use crate::error::CliResult;
use rundebug_config::RunDebugConfig;
use rundebug_core::Registry;
use std::sync::Arc;

/// State shared by the commands that read settings.
pub struct Context {
    pub config: RunDebugConfig,
    pub registry: Arc<Registry>,
}

impl Context {
    pub fn new(config: RunDebugConfig) -> CliResult<Self> {
        let registry = Arc::new(Registry::from_config(&config)?);
        Ok(Self { config, registry })
    }
}
