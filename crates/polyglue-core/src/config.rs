//! Client configuration types

use crate::{GlueError, GlueResult};
use serde::{Deserialize, Serialize};

/// Configuration for a chat client and the I/O runtime it runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service's HTTP API (no trailing slash)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// API method that starts a real-time session and returns the socket URL
    #[serde(default = "default_session_start_method")]
    pub session_start_method: String,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Number of async worker threads (default: number of CPU cores)
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Timeout applied to each HTTP request, in milliseconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,

    /// How often the socket worker checks for outbound frames, in milliseconds
    #[serde(default = "default_ws_poll_interval")]
    pub ws_poll_interval_ms: u64,

    /// Free-form application data
    #[serde(default)]
    pub data: serde_json::Value,
}

fn default_api_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_session_start_method() -> String {
    "rtm.start".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_timeout() -> u64 {
    10_000
}

fn default_ws_poll_interval() -> u64 {
    50
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_start_method: default_session_start_method(),
            log_level: default_log_level(),
            worker_threads: None,
            http_timeout_ms: default_http_timeout(),
            ws_poll_interval_ms: default_ws_poll_interval(),
            data: serde_json::Value::Null,
        }
    }
}

impl ClientConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Set the API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the number of worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> GlueResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(GlueError::Config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        if self.session_start_method.is_empty() {
            return Err(GlueError::Config(
                "session_start_method must not be empty".to_string(),
            ));
        }
        if self.log_level.parse::<crate::LogLevel>().is_err() {
            return Err(GlueError::Config(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.ws_poll_interval_ms == 0 {
            return Err(GlueError::Config(
                "ws_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// URL of an API method
    pub fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), method)
    }

    /// URL of the session-start endpoint
    pub fn session_start_url(&self) -> String {
        self.api_url(&self.session_start_method)
    }

    /// Get a typed value from the configuration data
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the configuration data
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), serde_json::Error> {
        if !self.data.is_object() {
            self.data = serde_json::json!({});
        }
        if let Some(obj) = self.data.as_object_mut() {
            obj.insert(key.to_string(), serde_json::to_value(value)?);
        }
        Ok(())
    }
}
