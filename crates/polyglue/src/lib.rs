//! # polyglue
//!
//! Reflective class descriptors and an asynchronous chat client, built to be
//! driven from other languages.
//!
//! polyglue provides:
//! - Class descriptors, a name-keyed registry and reflective adapters
//! - `#[derive(Reflect)]` to publish native types as classes
//! - A callback-driven chat client over HTTP and WebSocket transports
//! - Logging callbacks to a host language sink
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! polyglue = "0.3"
//! ```
//!
//! ## Publishing a class
//!
//! ```ignore
//! use polyglue::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Reflect)]
//! #[reflect(name = "shop.Item", crate = "polyglue::reflect")]
//! pub struct Item {
//!     #[reflect(param)]
//!     pub sku: String,
//!     pub price: i64,
//! }
//!
//! let registry = Registry::new();
//! registry.register_class::<Item>()?;
//! let adapter = registry.adapter("shop.Item")?;
//! let mut item = adapter.construct(vec![Value::new("A-1".to_string())])?;
//! adapter.set_field(&mut item, "price", Value::new(250_i64))?;
//! ```
//!
//! ## Running a chat session
//!
//! ```ignore
//! use polyglue::prelude::*;
//!
//! struct Greeter;
//!
//! impl ChatHandler for Greeter {
//!     fn on_hello(&self, client: &Client, _hello: &Hello) {
//!         tracing::info!(user = ?client.self_id(), "connected");
//!     }
//! }
//!
//! let runtime = AsyncRuntime::with_defaults()?;
//! let io = IoRuntime::networked(&runtime, &ClientConfig::default())?;
//! let client = Client::with_defaults();
//! client.connect(&io, token, Arc::new(EventDispatcher::new(Greeter)?))?;
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`polyglue_core`] - Errors, connection states and configuration
//! - [`polyglue_reflect`] - Descriptors, registry and adapters
//! - [`polyglue_macros`] - `#[derive(Reflect)]`
//! - [`polyglue_transport`] - Transport traits, envelopes and mocks
//! - [`polyglue_runtime`] - Tokio runtime and network transports
//! - [`polyglue_logging`] - Tracing bridge to host log sinks
//! - [`polyglue_client`] - The chat client and its event classes

// Re-export core types
pub use polyglue_core::{ClientConfig, ConnectionState, GlueError, GlueResult, LogLevel};

// Reflection, reachable as `polyglue::reflect` for `#[reflect(crate = ...)]`
pub use polyglue_reflect as reflect;
pub use polyglue_reflect::{
    ClassAdapter, ClassDescriptor, Instance, Reflectable, Registry, TypeTag, Typed, Value,
};

// The derive shares its name with the trait, as serde's derives do
pub use polyglue_macros::Reflect;
pub use polyglue_reflect::Reflect;

pub use polyglue_transport as transport;
pub use polyglue_transport::{HttpRequest, HttpResponse, WsMessage};

pub use polyglue_runtime::{AsyncRuntime, IoRuntime, RuntimeConfig, ShutdownHandle};

pub use polyglue_logging::{LogSink, LogSinkManager, init_logging, set_log_level};

pub use polyglue_client::{
    Channel, ChatError, ChatEvent, ChatHandler, Client, Edited, EventDispatcher, Hello, Message,
    ProtocolHandler, SharedHandler, User,
};

// Re-export common dependencies that embedders need
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use polyglue::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::{
        AsyncRuntime, Channel, ChatHandler, ClassAdapter, Client, ClientConfig, ConnectionState,
        EventDispatcher, GlueError, GlueResult, Hello, Instance, IoRuntime, Message, Reflect,
        Reflectable, Registry, TypeTag, Value,
    };

    pub use std::sync::Arc;
}
