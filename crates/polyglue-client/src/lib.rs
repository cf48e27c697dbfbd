//! polyglue-client - Asynchronous chat client
//!
//! This crate provides:
//! - [`Client`], the connection state machine for one chat session
//! - [`ProtocolHandler`], the callbacks the client invokes
//! - Reflectable chat classes ([`ChatEvent`], [`Message`], [`Channel`], ...)
//! - [`EventDispatcher`], which decodes frames into events for a [`ChatHandler`]
//!
//! # Example
//!
//! ```ignore
//! use polyglue_client::prelude::*;
//!
//! struct Echo;
//!
//! impl ChatHandler for Echo {
//!     fn on_message(&self, client: &Client, message: &Message) {
//!         if let (Some(channel), Some(text)) = (message.channel_ref(client), &message.text) {
//!             let _ = channel.send(text);
//!         }
//!     }
//! }
//!
//! let runtime = AsyncRuntime::with_defaults()?;
//! let io = IoRuntime::networked(&runtime, &ClientConfig::default())?;
//! let client = Client::with_defaults();
//! client.connect(&io, token, Arc::new(EventDispatcher::new(Echo)?))?;
//! ```

mod client;
mod dispatch;
mod event;
mod handler;

pub use client::Client;
pub use dispatch::{ChatHandler, EventDispatcher};
pub use event::{
    ChatError, ChatEvent, Channel, Edited, Hello, Message, User, register_classes, registry,
};
pub use handler::{ProtocolHandler, SharedHandler};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ChatError, ChatEvent, ChatHandler, Channel, Client, Edited, EventDispatcher, Hello,
        Message, ProtocolHandler, SharedHandler, User,
    };
    pub use polyglue_core::{ClientConfig, ConnectionState, GlueError, GlueResult};
    pub use polyglue_runtime::{AsyncRuntime, IoRuntime};
    pub use std::sync::Arc;
}
