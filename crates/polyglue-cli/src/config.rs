//! Client configuration files

use anyhow::{Context, Result};
use polyglue_core::{ClientConfig, LogLevel};
use std::path::Path;

/// Load a client configuration from a TOML file
pub fn load(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config: {:?}", path.as_ref()))?;

    from_toml(&content)
}

/// Parse a client configuration; missing keys take their defaults
pub fn from_toml(content: &str) -> Result<ClientConfig> {
    toml::from_str(content).context("Failed to parse config")
}

/// The configuration a command runs with
///
/// Starts from the file when one is given, applies the log level override
/// and validates the result.
pub fn resolve(path: Option<&str>, log_level: Option<&str>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => load(path)?,
        None => ClientConfig::default(),
    };

    if let Some(level) = log_level {
        config.log_level = level.to_string();
    }

    config.validate()?;
    Ok(config)
}

/// The configured log level
pub fn log_level(config: &ClientConfig) -> Result<LogLevel> {
    Ok(config.log_level.parse()?)
}

/// Check command implementation
pub fn check(path: &str) -> Result<()> {
    println!("Checking config: {}", path);

    let config = load(path)?;
    config.validate()?;

    println!("✓ API: {}", config.api_base_url);
    println!("✓ Session start: {}", config.session_start_url());
    println!("✓ Log level: {}", log_level(&config)?);
    println!(
        "✓ HTTP timeout: {}ms, socket poll: {}ms",
        config.http_timeout_ms, config.ws_poll_interval_ms
    );
    println!("\nConfig is valid!");

    Ok(())
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
