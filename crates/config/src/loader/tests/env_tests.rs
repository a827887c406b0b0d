//! Environment variable tests for the configuration loader.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::ExposeSecret;
use serial_test::serial;

use super::{cleared_env, env_with};
use crate::loader::builder::ConfigLoader;
use crate::loader::env::env_var_or_none;
use crate::loader::error::ConfigError;

#[test]
#[serial]
fn test_env_populates_all_fields() {
    temp_env::with_vars(
        env_with(&[
            ("COVERAGE_API_URL", "https://coverage.example.com/api"),
            ("COVERAGE_API_TOKEN", "env-token"),
            ("COVERAGE_SKIP_VERIFY", "true"),
            ("COVERAGE_TIMEOUT", "45"),
            ("COVERAGE_MAX_RETRIES", "1"),
            ("COVERAGE_POLL_INTERVAL_MS", "750"),
            ("COVERAGE_DOWNLOAD_DIR", "/var/tmp/exports"),
        ]),
        || {
            let config = ConfigLoader::new().from_env().unwrap().build().unwrap();

            assert_eq!(config.connection.base_url, "https://coverage.example.com/api");
            assert_eq!(
                config.connection.api_token.as_ref().unwrap().expose_secret(),
                "env-token"
            );
            assert!(config.connection.skip_verify);
            assert_eq!(config.connection.timeout, Duration::from_secs(45));
            assert_eq!(config.connection.max_retries, 1);
            assert_eq!(config.export.poll_interval, Duration::from_millis(750));
            assert_eq!(config.export.download_dir, PathBuf::from("/var/tmp/exports"));
        },
    );
}

#[test]
#[serial]
fn test_builder_values_override_env() {
    temp_env::with_vars(
        env_with(&[
            ("COVERAGE_API_URL", "https://from-env.example.com"),
            ("COVERAGE_POLL_INTERVAL_MS", "750"),
        ]),
        || {
            let config = ConfigLoader::new()
                .with_base_url("https://from-cli.example.com".to_string())
                .from_env()
                .unwrap()
                .build()
                .unwrap();

            assert_eq!(config.connection.base_url, "https://from-cli.example.com");
            assert_eq!(config.export.poll_interval, Duration::from_millis(750));
        },
    );
}

#[test]
#[serial]
fn test_empty_env_vars_ignored() {
    temp_env::with_vars(
        env_with(&[
            ("COVERAGE_API_URL", "http://localhost:8080"),
            ("COVERAGE_API_TOKEN", ""),
            ("COVERAGE_TIMEOUT", "   "),
        ]),
        || {
            let config = ConfigLoader::new().from_env().unwrap().build().unwrap();
            assert!(config.connection.api_token.is_none());
            assert_eq!(config.connection.timeout, Duration::from_secs(30));
        },
    );
}

#[test]
#[serial]
fn test_invalid_numeric_env_var() {
    temp_env::with_vars(
        env_with(&[
            ("COVERAGE_API_URL", "http://localhost:8080"),
            ("COVERAGE_POLL_INTERVAL_MS", "soon"),
        ]),
        || {
            let result = ConfigLoader::new().from_env();
            match result {
                Err(ConfigError::InvalidValue { var, .. }) => {
                    assert_eq!(var, "COVERAGE_POLL_INTERVAL_MS")
                }
                other => panic!("Expected InvalidValue, got {:?}", other),
            }
        },
    );
}

#[test]
#[serial]
fn test_invalid_bool_env_var() {
    temp_env::with_vars(env_with(&[("COVERAGE_SKIP_VERIFY", "maybe")]), || {
        assert!(matches!(
            ConfigLoader::new().from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));
    });
}

#[test]
#[serial]
fn test_missing_base_url_from_env() {
    temp_env::with_vars(cleared_env(), || {
        let result = ConfigLoader::new().from_env().unwrap().build();
        assert!(matches!(result, Err(ConfigError::MissingBaseUrl)));
    });
}

#[test]
#[serial]
fn test_env_var_or_none_trims() {
    temp_env::with_var("COVERAGE_TEST_TRIM", Some("  value  "), || {
        assert_eq!(env_var_or_none("COVERAGE_TEST_TRIM"), Some("value".to_string()));
    });
    temp_env::with_var("COVERAGE_TEST_TRIM", None::<&str>, || {
        assert_eq!(env_var_or_none("COVERAGE_TEST_TRIM"), None);
    });
}
