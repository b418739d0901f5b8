// Environment variable loading for configuration overrides

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Reads prefixed environment variables, e.g. `RUNDEBUG_CONFIG_NAMESPACE`.
///
/// Keys come back lowercased with the prefix and the joining underscore
/// removed, so `RUNDEBUG_CONFIG_BISECT_KEY` is returned as `bisect_key`.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load every variable under the prefix (or all variables without one).
    pub fn load(&self) -> Result<HashMap<String, String>> {
        let mut config = HashMap::new();

        for (key, value) in env::vars_os() {
            let (Some(key), Some(value)) = (key.to_str(), value.to_str()) else {
                continue;
            };
            match self.prefix {
                Some(ref prefix) => {
                    if let Some(rest) = key.strip_prefix(prefix.as_str())
                        && let Some(rest) = rest.strip_prefix('_')
                        && !rest.is_empty()
                    {
                        config.insert(rest.to_lowercase(), value.to_string());
                    }
                }
                None => {
                    config.insert(key.to_lowercase(), value.to_string());
                }
            }
        }

        Ok(config)
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(crate::CONFIG_ENV_PREFIX.to_string()))
    }
}
