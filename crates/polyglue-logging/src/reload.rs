//! Run-time log level changes

use crate::sink::LogSinkManager;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use polyglue_core::{GlueError, GlueResult, LogLevel};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::reload;

type FilterHandle = reload::Handle<LevelFilter, tracing_subscriber::Registry>;

/// Handle for swapping the level filter installed by [`crate::init_logging`]
pub struct ReloadHandle {
    handle: Mutex<Option<FilterHandle>>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    pub fn set_handle(&self, handle: FilterHandle) {
        *self.handle.lock() = Some(handle);
    }

    pub fn is_installed(&self) -> bool {
        self.handle.lock().is_some()
    }

    pub fn reload_level(&self, level: LogLevel) -> GlueResult<()> {
        let guard = self.handle.lock();
        let handle = guard
            .as_ref()
            .ok_or_else(|| GlueError::Config("logging is not initialized".to_string()))?;
        handle
            .reload(Self::filter_for(level))
            .map_err(|e| GlueError::Internal(format!("failed to reload log filter: {}", e)))
    }

    pub(crate) fn filter_for(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Change the level seen by the host sink and the installed filter
///
/// The sink threshold always changes; the filter only once
/// [`crate::init_logging`] has run.
pub fn set_log_level(level: LogLevel) {
    LogSinkManager::global().set_level(level);
    let reload = ReloadHandle::global();
    if reload.is_installed()
        && let Err(e) = reload.reload_level(level)
    {
        tracing::warn!(error = %e, "log filter not updated");
    }
}
