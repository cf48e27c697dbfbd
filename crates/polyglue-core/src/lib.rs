//! polyglue-core - Core error, state and configuration types
//!
//! This crate provides the foundational types shared by every polyglue crate:
//! - [`GlueError`] for reflection and connection errors
//! - [`ConnectionState`] for the client session state machine
//! - [`ClientConfig`] for client and runtime configuration
//! - [`LogLevel`] for log filtering across language boundaries

mod config;
mod error;
mod state;

pub use config::ClientConfig;
pub use error::{GlueError, GlueResult};
pub use state::ConnectionState;

/// Log levels shared with host log sinks
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = GlueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(GlueError::Config(format!("unknown log level '{}'", other))),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ClientConfig, ConnectionState, GlueError, GlueResult, LogLevel};
}
