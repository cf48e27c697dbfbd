//! Host log sink management

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use polyglue_core::LogLevel;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Receives `(level, target, message)` for every enabled event
///
/// Hosts in other languages wrap their own logger in one of these.
pub type LogSink = Arc<dyn Fn(LogLevel, &str, &str) + Send + Sync>;

static SINK_MANAGER: OnceCell<LogSinkManager> = OnceCell::new();

/// Holds the current sink and the minimum level it receives
pub struct LogSinkManager {
    sink: RwLock<Option<LogSink>>,
    level: AtomicU8,
}

impl LogSinkManager {
    pub fn new() -> Self {
        Self {
            sink: RwLock::new(None),
            level: AtomicU8::new(LogLevel::Info as u8),
        }
    }

    /// The process-wide manager used by [`crate::init_logging`]
    pub fn global() -> &'static LogSinkManager {
        SINK_MANAGER.get_or_init(LogSinkManager::new)
    }

    pub fn set_sink(&self, sink: LogSink) {
        *self.sink.write() = Some(sink);
    }

    pub fn clear_sink(&self) {
        *self.sink.write() = None;
    }

    pub fn has_sink(&self) -> bool {
        self.sink.read().is_some()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::SeqCst))
    }

    /// `Off` is never enabled, even when the threshold is `Off`
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.level()
    }

    /// Forward to the sink if one is set and `level` is enabled
    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if !self.is_enabled(level) {
            return;
        }

        // Clone out so the sink runs without the lock; a sink may log itself.
        let sink = self.sink.read().clone();
        if let Some(sink) = sink {
            sink(level, target, message);
        }
    }
}

impl Default for LogSinkManager {
    fn default() -> Self {
        Self::new()
    }
}

/// A sink writing `LEVEL target: message` lines to stderr
pub fn stderr_sink() -> LogSink {
    Arc::new(|level: LogLevel, target: &str, message: &str| {
        eprintln!("{} {}: {}", level, target, message);
    })
}
