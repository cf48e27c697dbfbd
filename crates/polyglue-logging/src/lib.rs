//! polyglue-logging - Tracing to host log sink bridge
//!
//! This crate provides:
//! - [`HostLoggingLayer`] tracing layer that forwards events to a host sink
//! - [`LogSink`] and [`LogSinkManager`] for the embedding language's logger
//! - [`ReloadHandle`] for changing the level filter at run time

mod layer;
mod reload;
mod sink;

pub use layer::{HostLoggingLayer, init_logging, init_logging_with_level};
pub use polyglue_core::LogLevel;
pub use reload::{ReloadHandle, set_log_level};
pub use sink::{LogSink, LogSinkManager, stderr_sink};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{HostLoggingLayer, LogLevel, LogSink, LogSinkManager, init_logging};
}
