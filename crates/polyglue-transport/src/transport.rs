//! Callback-driven transport seams
//!
//! Transports never block their caller. Results arrive later through a
//! listener, on whatever thread the implementation uses for I/O. Callbacks
//! for one connection are delivered in the order the transport observed them.

use crate::http::{HttpRequest, HttpResponse};
use polyglue_core::{GlueError, GlueResult};
use std::sync::Arc;

/// A WebSocket frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    pub fn text(text: impl Into<String>) -> Self {
        WsMessage::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(text) => Some(text),
            WsMessage::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            WsMessage::Text(text) => text.len(),
            WsMessage::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receives the outcome of one HTTP request
pub trait HttpListener: Send + Sync {
    fn on_http_response(&self, request: &HttpRequest, result: GlueResult<HttpResponse>);
}

/// Issues HTTP requests
pub trait HttpTransport: Send + Sync {
    /// Start `request`; `listener` is called exactly once with the outcome
    fn request(&self, request: HttpRequest, listener: Arc<dyn HttpListener>);
}

/// An open WebSocket
pub trait WebSocket: Send + Sync {
    fn send(&self, message: WsMessage) -> GlueResult<()>;

    /// Ask the peer to close; completion is reported through
    /// [`WsListener::on_ws_close`]
    fn close(&self) -> GlueResult<()>;
}

/// Receives WebSocket lifecycle events
///
/// After `on_ws_close` or `on_ws_error` no further callbacks arrive.
pub trait WsListener: Send + Sync {
    fn on_ws_connected(&self, socket: Arc<dyn WebSocket>);

    fn on_ws_message(&self, message: WsMessage);

    fn on_ws_close(&self);

    fn on_ws_error(&self, error: GlueError);
}

/// Opens WebSockets
pub trait WsTransport: Send + Sync {
    /// Start connecting to `url`; the outcome goes to `listener`
    fn open(&self, url: &str, listener: Arc<dyn WsListener>);
}
