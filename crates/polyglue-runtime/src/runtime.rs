//! Tokio runtime management

use crate::shutdown::{ShutdownHandle, ShutdownSignal};
use polyglue_core::{ClientConfig, GlueError, GlueResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};

const WORKER_POLL: Duration = Duration::from_millis(10);

/// Configuration for the async runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (None = number of CPU cores)
    pub worker_threads: Option<usize>,
    /// Name prefix for worker threads
    pub thread_name: String,
    /// Maximum blocking threads; each open socket holds one
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "polyglue-worker".to_string(),
            max_blocking_threads: 64,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runtime settings carried by a client configuration
    pub fn from_client_config(config: &ClientConfig) -> Self {
        Self {
            worker_threads: config.worker_threads,
            ..Self::default()
        }
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn with_max_blocking_threads(mut self, threads: usize) -> Self {
        self.max_blocking_threads = threads;
        self
    }
}

/// Owns the Tokio runtime that transports deliver callbacks from
pub struct AsyncRuntime {
    runtime: Arc<Runtime>,
    shutdown_handle: ShutdownHandle,
    workers: Workers,
    config: RuntimeConfig,
}

impl AsyncRuntime {
    pub fn new(config: RuntimeConfig) -> GlueResult<Self> {
        let mut builder = Builder::new_multi_thread();

        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads);
        }

        builder
            .thread_name(&config.thread_name)
            .max_blocking_threads(config.max_blocking_threads.max(1))
            .enable_io()
            .enable_time();

        let runtime = builder
            .build()
            .map_err(|e| GlueError::Runtime(format!("failed to create runtime: {}", e)))?;

        let workers = Workers {
            handle: runtime.handle().clone(),
            count: Arc::new(AtomicUsize::new(0)),
        };

        Ok(Self {
            runtime: Arc::new(runtime),
            shutdown_handle: ShutdownHandle::new(),
            workers,
            config,
        })
    }

    pub fn with_defaults() -> GlueResult<Self> {
        Self::new(RuntimeConfig::default())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown_handle.signal()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown_handle.clone()
    }

    /// Trigger shutdown when the process receives Ctrl-C
    pub fn shutdown_on_ctrl_c(&self) {
        let handle = self.shutdown_handle.clone();
        self.runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received Ctrl-C");
                handle.trigger();
            }
        });
    }

    /// Block on a future from a sync context
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        self.runtime.block_on(future)
    }

    pub fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(future)
    }

    /// Run a long-lived blocking worker
    ///
    /// Workers are counted so [`AsyncRuntime::shutdown`] can wait for them.
    pub fn spawn_worker<F, R>(&self, func: F) -> tokio::task::JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.workers.spawn(func)
    }

    /// Workers still running
    pub fn active_workers(&self) -> usize {
        self.workers.active()
    }

    pub(crate) fn workers(&self) -> Workers {
        self.workers.clone()
    }

    /// Signal shutdown and wait up to `timeout` for workers to finish
    ///
    /// Returns the number of workers still running when the wait ended.
    /// Must not be called from inside the runtime.
    pub fn shutdown(&self, timeout: Duration) -> GlueResult<usize> {
        tracing::info!(?timeout, "initiating runtime shutdown");

        self.shutdown_handle.trigger();

        let workers = self.workers.clone();
        let remaining = self.runtime.block_on(async move {
            let deadline = Instant::now() + timeout;
            loop {
                let active = workers.active();
                if active == 0 || Instant::now() >= deadline {
                    return active;
                }
                tokio::time::sleep(WORKER_POLL).await;
            }
        });

        if remaining > 0 {
            tracing::warn!(remaining, "runtime shutdown timed out with workers still running");
        } else {
            tracing::info!("runtime shutdown complete");
        }
        Ok(remaining)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_handle.is_triggered()
    }
}

impl Drop for AsyncRuntime {
    fn drop(&mut self) {
        self.shutdown_handle.trigger();
    }
}

/// Spawns counted blocking workers on a runtime
#[derive(Clone)]
pub(crate) struct Workers {
    handle: tokio::runtime::Handle,
    count: Arc<AtomicUsize>,
}

impl Workers {
    pub(crate) fn spawn<F, R>(&self, func: F) -> tokio::task::JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let guard = WorkerGuard::enter(self.count.clone());
        self.handle.spawn_blocking(move || {
            let _guard = guard;
            func()
        })
    }

    fn active(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

struct WorkerGuard(Arc<AtomicUsize>);

impl WorkerGuard {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
