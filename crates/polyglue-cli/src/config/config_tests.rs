#![allow(non_snake_case)]

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

// Config parsing tests

#[test]
fn from_toml___full_config___parses_every_key() {
    let toml = r#"
api_base_url = "https://chat.example.com/api"
session_start_method = "rtm.connect"
log_level = "debug"
worker_threads = 2
http_timeout_ms = 2500
ws_poll_interval_ms = 20

[data]
team = "T1"
"#;

    let config = from_toml(toml).unwrap();

    assert_eq!(config.api_base_url, "https://chat.example.com/api");
    assert_eq!(config.session_start_url(), "https://chat.example.com/api/rtm.connect");
    assert_eq!(config.worker_threads, Some(2));
    assert_eq!(config.http_timeout_ms, 2500);
    assert_eq!(config.ws_poll_interval_ms, 20);
    assert_eq!(config.get::<String>("team").as_deref(), Some("T1"));
}

#[test]
fn from_toml___empty___uses_defaults() {
    let config = from_toml("").unwrap();

    assert_eq!(config, ClientConfig::default());
}

#[test]
fn from_toml___wrong_type___returns_error() {
    let result = from_toml("http_timeout_ms = \"soon\"");

    assert!(result.is_err());
}

// resolve tests

#[test]
fn resolve___no_file___uses_defaults_with_override() {
    let config = resolve(None, Some("warn")).unwrap();

    assert_eq!(config.log_level, "warn");
    assert_eq!(config.api_base_url, ClientConfig::default().api_base_url);
}

#[test]
fn resolve___bad_log_level___fails_validation() {
    let result = resolve(None, Some("loud"));

    assert!(result.is_err());
}

#[test]
fn resolve___file___loads_and_validates() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "api_base_url = \"http://localhost:9000/api\"").unwrap();

    let config = resolve(file.path().to_str(), None).unwrap();

    assert_eq!(config.api_url("users.info"), "http://localhost:9000/api/users.info");
}

#[test]
fn resolve___invalid_file_contents___fails_validation() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ws_poll_interval_ms = 0").unwrap();

    let result = resolve(file.path().to_str(), None);

    assert!(result.is_err());
}

#[test]
fn load___missing_file___reports_path() {
    let result = load("/nonexistent/polyglue.toml");

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("polyglue.toml"));
}

#[test]
fn log_level___configured___parses() {
    let config = from_toml("log_level = \"trace\"").unwrap();

    assert_eq!(log_level(&config).unwrap(), LogLevel::Trace);
}
