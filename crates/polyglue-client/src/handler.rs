//! The callbacks a client invokes

use crate::client::Client;
use polyglue_core::GlueError;
use polyglue_transport::{HttpRequest, HttpResponse, WsMessage};
use std::sync::Arc;

/// Receives a session's lifecycle and traffic
///
/// Callbacks run on the transport's thread with no client lock held, so they
/// may call back into the [`Client`] (for example to send). Each session gets
/// exactly one terminal notification: `on_ws_close`, `on_ws_error`, or an
/// error through `on_http_response` when the session never started.
pub trait ProtocolHandler: Send + Sync {
    /// The socket is open and sends are legal
    fn on_ws_connected(&self, client: &Client);

    /// An inbound frame; `event_id` is the id of the last event sent
    fn on_ws_message(&self, client: &Client, message: &WsMessage, event_id: u64);

    fn on_ws_close(&self, client: &Client);

    fn on_ws_error(&self, client: &Client, error: &GlueError);

    /// Outcome of the session-start call when it failed, or of any
    /// [`Client::request`]
    fn on_http_response(
        &self,
        client: &Client,
        request: &HttpRequest,
        response: Result<&HttpResponse, &GlueError>,
    );
}

/// A handler shared between the caller and the client
pub type SharedHandler = Arc<dyn ProtocolHandler>;
