//! Error types for the rundebug CLI.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// IO error
    Io(std::io::Error),

    /// Configuration could not be loaded or is invalid
    Config(String),

    /// A setting name was rejected
    Setting(String),

    /// A bisect pattern did not parse
    InvalidPattern(String),

    /// Metrics could not be exported
    Metrics(String),

    /// JSON output could not be produced
    Json(String),

    /// The demo program hit its buggy behavior
    Bug(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Setting(msg) => write!(f, "Setting error: {}", msg),
            CliError::InvalidPattern(msg) => write!(f, "Invalid pattern: {}", msg),
            CliError::Metrics(msg) => write!(f, "Metrics error: {}", msg),
            CliError::Json(msg) => write!(f, "JSON error: {}", msg),
            CliError::Bug(msg) => write!(f, "Buggy behavior: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<rundebug_config::ConfigError> for CliError {
    fn from(e: rundebug_config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<rundebug_core::FlagError> for CliError {
    fn from(e: rundebug_core::FlagError) -> Self {
        match e {
            rundebug_core::FlagError::Config(e) => e.into(),
            other => CliError::Setting(other.to_string()),
        }
    }
}

impl From<rundebug_core::BisectError> for CliError {
    fn from(e: rundebug_core::BisectError) -> Self {
        CliError::InvalidPattern(e.to_string())
    }
}

impl From<rundebug_metrics::prometheus::Error> for CliError {
    fn from(e: rundebug_metrics::prometheus::Error) -> Self {
        CliError::Metrics(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e.to_string())
    }
}
