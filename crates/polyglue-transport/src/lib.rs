//! polyglue-transport - Transport seams and wire formats
//!
//! This crate provides:
//! - [`HttpTransport`] and [`WsTransport`] callback traits the client drives
//! - [`HttpRequest`] / [`HttpResponse`] envelopes and [`WsMessage`] frames
//! - [`SessionInfo`] parsing for the session-start call
//! - [`Codec`] trait and [`JsonCodec`] for event frames
//! - [`mock`] transports for tests

mod codec;
mod http;
pub mod mock;
mod session;
mod transport;

pub use codec::{Codec, CodecError, JsonCodec};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{SelfInfo, SessionInfo};
pub use transport::{HttpListener, HttpTransport, WebSocket, WsListener, WsMessage, WsTransport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Codec, HttpListener, HttpMethod, HttpRequest, HttpResponse, HttpTransport, JsonCodec,
        SessionInfo, WebSocket, WsListener, WsMessage, WsTransport,
    };
}
