//! Integration tests for rundebug-config

use rundebug_config::*;
use std::env;
use std::io::Write;
use std::sync::Arc;

#[test]
fn test_env_source_observes_changes() {
    let source = EnvSource::new("RUNDEBUG_IT_ENV_SOURCE");

    unsafe {
        env::set_var("RUNDEBUG_IT_ENV_SOURCE", "foo=bar");
    }
    assert_eq!(&*source.snapshot(), "foo=bar");

    unsafe {
        env::set_var("RUNDEBUG_IT_ENV_SOURCE", "foo=baz");
    }
    assert_eq!(&*source.snapshot(), "foo=baz");

    unsafe {
        env::remove_var("RUNDEBUG_IT_ENV_SOURCE");
    }
    assert_eq!(&*source.snapshot(), "");
}

#[test]
fn test_config_with_env_overrides() {
    unsafe {
        env::set_var("RUNDEBUG_IT_CFG_NAMESPACE", "godebug");
        env::set_var("RUNDEBUG_IT_CFG_KNOWN", "http2client, panicnil");
        env::set_var("RUNDEBUG_IT_CFG_UNRELATED", "ignored");
    }

    let loader = EnvLoader::new(Some("RUNDEBUG_IT_CFG".to_string()));
    let config = RunDebugConfig::default().with_env(&loader).unwrap();

    assert_eq!(config.namespace, "godebug");
    assert_eq!(config.known, vec!["http2client", "panicnil"]);
    assert_eq!(config.env_var, "RUNDEBUG");

    unsafe {
        env::remove_var("RUNDEBUG_IT_CFG_NAMESPACE");
        env::remove_var("RUNDEBUG_IT_CFG_KNOWN");
        env::remove_var("RUNDEBUG_IT_CFG_UNRELATED");
    }
}

#[test]
fn test_config_with_invalid_env_override() {
    unsafe {
        env::set_var("RUNDEBUG_IT_BAD_NAMESPACE", "has/slash");
    }

    let loader = EnvLoader::new(Some("RUNDEBUG_IT_BAD".to_string()));
    let result = RunDebugConfig::default().with_env(&loader);
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));

    unsafe {
        env::remove_var("RUNDEBUG_IT_BAD_NAMESPACE");
    }
}

#[test]
fn test_config_from_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r##"
env_var = "GODEBUG"
namespace = "godebug"
defaults = "panicnil=1,http2client=0"
known = ["http2client", "#buggy"]
"##
    )
    .unwrap();

    let config = RunDebugConfig::from_file(file.path()).unwrap();
    assert_eq!(config.env_var, "GODEBUG");
    assert_eq!(config.defaults, "panicnil=1,http2client=0");
    assert_eq!(config.known, vec!["http2client", "#buggy"]);
    assert_eq!(config.bisect_key, "bisect");
}

#[test]
fn test_config_from_env_file() {
    let mut file = tempfile::Builder::new().suffix(".env").tempfile().unwrap();
    writeln!(file, "NAMESPACE=godebug\nKNOWN=a,b\n# comment").unwrap();

    let config = RunDebugConfig::from_file(file.path()).unwrap();
    assert_eq!(config.namespace, "godebug");
    assert_eq!(config.known, vec!["a", "b"]);
}

#[test]
fn test_config_from_file_rejects_bad_names() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    writeln!(file, r#"{{"known": ["a=b"]}}"#).unwrap();

    assert!(matches!(
        RunDebugConfig::from_file(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_config_from_missing_file() {
    let result = RunDebugConfig::from_file("/nonexistent/rundebug.toml");
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_layered_config_source_prefers_env() {
    let config = RunDebugConfig {
        env_var: "RUNDEBUG_IT_LAYERED".to_string(),
        defaults: "panicnil=1".to_string(),
        ..Default::default()
    };

    unsafe {
        env::set_var("RUNDEBUG_IT_LAYERED", "panicnil=0");
    }
    assert_eq!(&*config.source().snapshot(), "panicnil=0,panicnil=1");

    unsafe {
        env::remove_var("RUNDEBUG_IT_LAYERED");
    }
}

#[test]
fn test_static_source_shared_between_threads() {
    let source = Arc::new(StaticSource::new("a=1"));
    let writer = {
        let source = source.clone();
        std::thread::spawn(move || {
            for i in 0..200 {
                source.set(format!("a={i},b={i}"));
            }
        })
    };

    for _ in 0..200 {
        let snap = source.snapshot();
        if snap.as_ref() != "a=1" {
            let (a, b) = snap.split_once(',').unwrap();
            assert_eq!(&a[2..], &b[2..]);
        }
    }
    writer.join().unwrap();
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::ParseError("bad token".to_string());
    assert!(format!("{}", err).contains("bad token"));
}
