//! Network transports

mod http;
mod ws;

pub use http::ReqwestHttpTransport;
pub use ws::TungsteniteWsTransport;
