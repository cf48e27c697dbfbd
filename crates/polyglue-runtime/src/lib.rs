//! polyglue-runtime - Tokio runtime and networked transports
//!
//! This crate provides:
//! - [`AsyncRuntime`] for managing the Tokio runtime the transports run on
//! - [`IoRuntime`], the pair of transports handed to a chat client
//! - [`ReqwestHttpTransport`] and [`TungsteniteWsTransport`] network implementations
//! - Graceful shutdown support with broadcast signals

mod io;
mod net;
mod runtime;
mod shutdown;

pub use io::IoRuntime;
pub use net::{ReqwestHttpTransport, TungsteniteWsTransport};
pub use runtime::{AsyncRuntime, RuntimeConfig};
pub use shutdown::{ShutdownHandle, ShutdownSignal};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{AsyncRuntime, IoRuntime, RuntimeConfig, ShutdownHandle, ShutdownSignal};
}
