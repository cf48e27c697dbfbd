//! Connect command implementation
//!
//! Runs one chat session with a handler that logs every event, and returns
//! once the session closes, fails, or the process receives Ctrl-C.

use anyhow::Result;
use polyglue_client::{ChatError, ChatEvent, ChatHandler, Client, EventDispatcher, Hello, Message};
use polyglue_core::{ConnectionState, GlueError};
use polyglue_logging::{LogSinkManager, init_logging_with_level, stderr_sink};
use polyglue_runtime::{AsyncRuntime, IoRuntime, RuntimeConfig, ShutdownHandle};
use std::sync::Arc;
use std::time::Duration;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Logs the session and signals `done` when it ends
pub struct LoggingHandler {
    done: ShutdownHandle,
}

impl LoggingHandler {
    pub fn new(done: ShutdownHandle) -> Self {
        Self { done }
    }
}

impl ChatHandler for LoggingHandler {
    fn on_event(&self, _client: &Client, event: &ChatEvent) {
        tracing::debug!(
            kind = %event.kind,
            user = event.user_id().unwrap_or("-"),
            channel = event.channel_id().unwrap_or("-"),
            "event"
        );
    }

    fn on_hello(&self, client: &Client, _hello: &Hello) {
        tracing::info!(self_id = ?client.self_id(), "hello received");
    }

    fn on_message(&self, _client: &Client, message: &Message) {
        tracing::info!(
            channel = message.channel_id().unwrap_or("-"),
            user = message.user_id().unwrap_or("-"),
            text = message.text.as_deref().unwrap_or(""),
            "message"
        );
    }

    fn on_chat_error(&self, _client: &Client, error: &ChatError) {
        tracing::warn!(code = ?error.code, msg = ?error.msg, "service error");
    }

    fn on_connected(&self, _client: &Client) {
        tracing::info!("socket open, listening for events");
    }

    fn on_closed(&self, _client: &Client) {
        tracing::info!("session closed");
        self.done.trigger();
    }

    fn on_failure(&self, _client: &Client, error: &GlueError) {
        tracing::error!(error = %error, "session failed");
        self.done.trigger();
    }
}

pub fn run(token: String, config_path: Option<String>, log_level: Option<String>) -> Result<()> {
    let config = crate::config::resolve(config_path.as_deref(), log_level.as_deref())?;

    LogSinkManager::global().set_sink(stderr_sink());
    init_logging_with_level(crate::config::log_level(&config)?);

    let runtime = AsyncRuntime::new(RuntimeConfig::from_client_config(&config))?;
    let io = IoRuntime::networked(&runtime, &config)?;
    runtime.shutdown_on_ctrl_c();

    let dispatcher = EventDispatcher::new(LoggingHandler::new(runtime.shutdown_handle()))?;
    let client = Client::new(config);
    client.connect(&io, token, Arc::new(dispatcher))?;

    let mut ended = runtime.shutdown_signal();
    runtime.block_on(ended.wait());

    if client.state() == ConnectionState::SocketOpen
        && let Err(e) = client.close()
    {
        tracing::warn!(error = %e, "close on shutdown failed");
    }

    let remaining = runtime.shutdown(SHUTDOWN_TIMEOUT)?;
    if remaining > 0 {
        eprintln!("{} socket worker(s) did not stop in time", remaining);
    }

    let state = client.state();
    println!("Session ended: {}", state);
    if state == ConnectionState::Failed {
        anyhow::bail!("session failed");
    }

    Ok(())
}
