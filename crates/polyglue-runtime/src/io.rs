//! The transport pair a chat client runs on

use crate::net::{ReqwestHttpTransport, TungsteniteWsTransport};
use crate::runtime::AsyncRuntime;
use polyglue_core::{ClientConfig, GlueResult};
use polyglue_transport::{HttpTransport, WsTransport};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// HTTP and WebSocket transports, cheap to clone
#[derive(Clone)]
pub struct IoRuntime {
    http: Arc<dyn HttpTransport>,
    ws: Arc<dyn WsTransport>,
}

impl IoRuntime {
    /// Wrap any transport implementations, e.g. the in-memory mocks
    pub fn new(http: Arc<dyn HttpTransport>, ws: Arc<dyn WsTransport>) -> Self {
        Self { http, ws }
    }

    /// Network transports driven by `runtime`
    ///
    /// HTTP requests run as Tokio tasks; each WebSocket gets a blocking worker
    /// that exits when the runtime shuts down.
    pub fn networked(runtime: &AsyncRuntime, config: &ClientConfig) -> GlueResult<Self> {
        config.validate()?;

        let http = ReqwestHttpTransport::new(
            runtime.handle(),
            Duration::from_millis(config.http_timeout_ms),
        )?;
        let ws = TungsteniteWsTransport::new(
            runtime,
            Duration::from_millis(config.ws_poll_interval_ms),
        )
        .with_handshake_timeout(Duration::from_millis(config.http_timeout_ms));

        tracing::debug!(
            http_timeout_ms = config.http_timeout_ms,
            ws_poll_interval_ms = config.ws_poll_interval_ms,
            "networked I/O runtime ready"
        );

        Ok(Self::new(Arc::new(http), Arc::new(ws)))
    }

    pub fn http(&self) -> &Arc<dyn HttpTransport> {
        &self.http
    }

    pub fn ws(&self) -> &Arc<dyn WsTransport> {
        &self.ws
    }
}

impl fmt::Debug for IoRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoRuntime").finish_non_exhaustive()
    }
}
