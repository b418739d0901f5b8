// Configuration validation

use crate::{ConfigError, Result};

/// Prefix marking a setting as internal: never exported as a metric.
pub const INTERNAL_PREFIX: char = '#';

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Whether `key` can appear on the left of `=` in a settings string.
///
/// Separators would make the key unreachable by lookup, and `#` is reserved
/// for the internal marker and inline bisect rules.
pub fn is_valid_key(key: &str) -> bool {
    !key.contains([',', '=', '#'])
}

/// Strip the internal marker, if present.
pub fn strip_internal(name: &str) -> (&str, bool) {
    match name.strip_prefix(INTERNAL_PREFIX) {
        Some(rest) => (rest, true),
        None => (name, false),
    }
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate a setting name, allowing the internal marker
    pub fn setting_name(value: &str, field: &str) -> Result<()> {
        let (key, internal) = strip_internal(value);
        if key.is_empty() && !internal {
            return Err(ConfigError::ValidationError(format!("{} cannot be empty", field)));
        }
        if !is_valid_key(key) {
            return Err(ConfigError::ValidationError(format!(
                "{} must not contain ',', '=' or '#': {:?}",
                field, value
            )));
        }
        Ok(())
    }

    /// Validate an environment variable name
    pub fn env_var_name(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        if value.contains(['=', '\0']) {
            return Err(ConfigError::ValidationError(format!(
                "{} is not a valid environment variable name",
                field
            )));
        }
        Ok(())
    }

    /// Validate a metric path segment
    pub fn path_segment(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        if value.contains(['/', ':']) || value.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "{} must not contain '/', ':' or whitespace",
                field
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
    }

    #[test]
    fn test_setting_name_validation() {
        assert!(ConfigValidator::setting_name("http2client", "name").is_ok());
        assert!(ConfigValidator::setting_name("#buggy", "name").is_ok());
        assert!(ConfigValidator::setting_name("a,b", "name").is_err());
        assert!(ConfigValidator::setting_name("a=b", "name").is_err());
        assert!(ConfigValidator::setting_name("##twice", "name").is_err());
        assert!(ConfigValidator::setting_name("", "name").is_err());
        assert!(ConfigValidator::setting_name("#", "name").is_ok());
    }

    #[test]
    fn test_strip_internal() {
        assert_eq!(strip_internal("#foo"), ("foo", true));
        assert_eq!(strip_internal("foo"), ("foo", false));
        assert_eq!(strip_internal("#"), ("", true));
    }

    #[test]
    fn test_env_var_name_validation() {
        assert!(ConfigValidator::env_var_name("RUNDEBUG", "env_var").is_ok());
        assert!(ConfigValidator::env_var_name("", "env_var").is_err());
        assert!(ConfigValidator::env_var_name("A=B", "env_var").is_err());
    }

    #[test]
    fn test_path_segment_validation() {
        assert!(ConfigValidator::path_segment("godebug", "namespace").is_ok());
        assert!(ConfigValidator::path_segment("a/b", "namespace").is_err());
        assert!(ConfigValidator::path_segment("a:b", "namespace").is_err());
        assert!(ConfigValidator::path_segment("a b", "namespace").is_err());
    }
}
