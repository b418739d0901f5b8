// Configuration and settings sources for rundebug

pub mod env;
pub mod error;
pub mod loader;
pub mod source;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use source::{EnvSource, LayeredSource, SettingsSource, StaticSource};
pub use validation::{ConfigValidator, INTERNAL_PREFIX, Validate, is_valid_key, strip_internal};

use rundebug_log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Variable holding the settings string unless configured otherwise.
pub const DEFAULT_ENV_VAR: &str = "RUNDEBUG";

/// First path segment of exported counters.
pub const DEFAULT_NAMESPACE: &str = "rundebug";

/// Reserved key carrying the bisect directive.
pub const DEFAULT_BISECT_KEY: &str = "bisect";

/// Prefix for variables that override [`RunDebugConfig`] fields.
pub const CONFIG_ENV_PREFIX: &str = "RUNDEBUG_CONFIG";

/// Process-level configuration of the settings mechanism itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDebugConfig {
    /// Environment variable holding the settings string
    pub env_var: String,

    /// Namespace of exported counter paths
    pub namespace: String,

    /// Settings key whose value is the bisect directive
    pub bisect_key: String,

    /// Build-time defaults, a settings string consulted after the environment
    pub defaults: String,

    /// Settings registered at startup so their counters exist before first use
    pub known: Vec<String>,
}

impl Default for RunDebugConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_ENV_VAR.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            bisect_key: DEFAULT_BISECT_KEY.to_string(),
            defaults: String::new(),
            known: Vec::new(),
        }
    }
}

impl RunDebugConfig {
    /// Load from a `.toml`, `.json` or `.env` file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        let config: Self = serde_json::from_value(normalize_known(value))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        config.validate()?;
        debug!("loaded rundebug config from {}", path.display());
        Ok(config)
    }

    /// Defaults overridden by `RUNDEBUG_CONFIG_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env(&EnvLoader::default())
    }

    /// Apply overrides read by `loader` and validate the result.
    pub fn with_env(mut self, loader: &EnvLoader) -> Result<Self> {
        for (key, value) in loader.load()? {
            match key.as_str() {
                "env_var" => self.env_var = value,
                "namespace" => self.namespace = value,
                "bisect_key" => self.bisect_key = value,
                "defaults" => self.defaults = value,
                "known" => self.known = split_list(&value),
                _ => {}
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Load `.env` style variables into the process environment first.
    ///
    /// A missing default `.env` file is not an error; an explicit path is.
    pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Ok(())
    }

    /// The settings source described by this configuration.
    pub fn source(&self) -> Arc<dyn SettingsSource> {
        let env: Arc<dyn SettingsSource> = Arc::new(EnvSource::new(&self.env_var));
        if self.defaults.is_empty() {
            env
        } else {
            Arc::new(LayeredSource::new(env, &self.defaults))
        }
    }
}

impl Validate for RunDebugConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::env_var_name(&self.env_var, "env_var")?;
        ConfigValidator::path_segment(&self.namespace, "namespace")?;
        ConfigValidator::not_empty(&self.bisect_key, "bisect_key")?;
        ConfigValidator::setting_name(&self.bisect_key, "bisect_key")?;
        if self.bisect_key.starts_with(INTERNAL_PREFIX) {
            return Err(ConfigError::ValidationError(
                "bisect_key cannot be an internal name".to_string(),
            ));
        }
        for name in &self.known {
            ConfigValidator::setting_name(name, "known")?;
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `.env` files can only carry strings, so `known` arrives comma-joined.
fn normalize_known(mut value: serde_json::Value) -> serde_json::Value {
    if let Some(known) = value.get_mut("known")
        && let Some(list) = known.as_str().map(split_list)
    {
        *known = serde_json::Value::from(list);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunDebugConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.env_var, "RUNDEBUG");
        assert_eq!(config.namespace, "rundebug");
        assert_eq!(config.bisect_key, "bisect");
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        let config = RunDebugConfig {
            namespace: "a/b".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_internal_bisect_key_rejected() {
        let config = RunDebugConfig {
            bisect_key: "#bisect".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, ,b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_normalize_known_from_string() {
        let value = serde_json::json!({"known": "http2client,panicnil"});
        let value = normalize_known(value);
        assert_eq!(value["known"], serde_json::json!(["http2client", "panicnil"]));
    }

    #[test]
    fn test_source_without_defaults_reads_env_only() {
        let config = RunDebugConfig {
            env_var: "RUNDEBUG_LIB_UNSET_1234".to_string(),
            ..Default::default()
        };
        assert_eq!(&*config.source().snapshot(), "");

        let layered = RunDebugConfig {
            env_var: "RUNDEBUG_LIB_UNSET_1234".to_string(),
            defaults: "panicnil=1".to_string(),
            ..Default::default()
        };
        assert_eq!(&*layered.source().snapshot(), "panicnil=1");
    }
}
