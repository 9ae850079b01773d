//! Loading configuration files from disk.

use kontakt_config::{ConfigError, ConfigLoader, LogFormat, ENV_PREFIX, MODE_VAR};
use kontakt_core::DeploymentMode;
use std::io::Write;

fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_toml_file_then_env_overrides() {
    let file = write_file(
        ".toml",
        r#"
            environment = "production"

            [server]
            http_addr = "0.0.0.0:8000"
            shutdown_timeout_secs = 5

            [telemetry.logging]
            level = "info"
            format = "json"
        "#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_vars([("KONTAKT__SERVER__SHUTDOWN_TIMEOUT_SECS", "10")])
        .with_env_prefix(ENV_PREFIX)
        .with_mode_var(MODE_VAR)
        .load()
        .unwrap();

    assert_eq!(config.environment, DeploymentMode::Production);
    assert_eq!(config.server.http_addr, "0.0.0.0:8000");
    assert_eq!(config.server.shutdown_timeout_secs, 10);
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn test_json_file() {
    let file = write_file(
        ".json",
        r#"{ "server": { "request_timeout_ms": 250 }, "telemetry": { "metrics": { "enabled": false } } }"#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_vars(Vec::<(String, String)>::new())
        .load()
        .unwrap();

    assert_eq!(config.server.request_timeout_ms, 250);
    assert_eq!(config.environment, DeploymentMode::Development);
}

#[test]
fn test_unknown_extension_rejected() {
    let file = write_file(".yaml", "server: {}");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_malformed_toml_rejected() {
    let file = write_file(".toml", "[server\nhttp_addr = ");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_optional_file_present() {
    let file = write_file(".toml", "[server]\ndocs_enabled = false\n");
    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load_unvalidated();
    assert!(!config.server.docs_enabled);
}
