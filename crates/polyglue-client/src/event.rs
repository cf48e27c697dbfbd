//! Reflectable chat classes
//!
//! Event classes mirror the service's JSON frames field for field, so the
//! dispatcher can fill them with the generic JSON loader. Every subclass
//! repeats the base fields; the registry checks that it does.
//!
//! `user` and `channel` arrive either as an id string or as a full object
//! (`team_join`, `channel_created`), so both are kept as raw JSON and read
//! through [`ChatEvent::user_id`] and [`ChatEvent::channel_id`].

use crate::client::Client;
use polyglue_core::GlueResult;
use polyglue_macros::Reflect;
use polyglue_reflect::Registry;
use serde_json::Value as JsonValue;

/// Any frame from the service
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(name = "chat.event.ChatEvent")]
pub struct ChatEvent {
    #[reflect(rename = "type")]
    pub kind: String,
    pub user: Option<JsonValue>,
    pub channel: Option<JsonValue>,
    pub ts: Option<String>,
}

/// First frame after the socket opens
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(name = "chat.event.Hello", extends = "chat.event.ChatEvent")]
pub struct Hello {
    #[reflect(rename = "type")]
    pub kind: String,
    pub user: Option<JsonValue>,
    pub channel: Option<JsonValue>,
    pub ts: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(name = "chat.event.Message", extends = "chat.event.ChatEvent")]
pub struct Message {
    #[reflect(rename = "type")]
    pub kind: String,
    pub user: Option<JsonValue>,
    pub channel: Option<JsonValue>,
    pub ts: Option<String>,
    pub text: Option<String>,
    pub subtype: Option<String>,
    pub hidden: Option<bool>,
    pub edited: Option<Edited>,
}

/// Who last edited a message, and when
#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[reflect(name = "chat.event.Edited")]
pub struct Edited {
    pub user: Option<String>,
    pub ts: Option<String>,
}

/// An `error` frame; `code` and `msg` come from its nested `error` object
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(name = "chat.event.ChatError", extends = "chat.event.ChatEvent")]
pub struct ChatError {
    #[reflect(rename = "type")]
    pub kind: String,
    pub user: Option<JsonValue>,
    pub channel: Option<JsonValue>,
    pub ts: Option<String>,
    pub code: Option<i64>,
    pub msg: Option<String>,
}

macro_rules! base_view {
    ($($class:ident),*) => {
        $(impl $class {
            /// The fields every event carries
            pub fn base(&self) -> ChatEvent {
                ChatEvent {
                    kind: self.kind.clone(),
                    user: self.user.clone(),
                    channel: self.channel.clone(),
                    ts: self.ts.clone(),
                }
            }

            pub fn user_id(&self) -> Option<&str> {
                reference_id(self.user.as_ref())
            }

            pub fn channel_id(&self) -> Option<&str> {
                reference_id(self.channel.as_ref())
            }

            /// The channel the event happened in, bound to `client`
            pub fn channel_ref(&self, client: &Client) -> Option<Channel> {
                self.channel_id().map(|id| client.channel(id))
            }
        })*
    };
}

base_view!(ChatEvent, Hello, Message, ChatError);

/// An id given either directly or as the `id` of an object
fn reference_id(value: Option<&JsonValue>) -> Option<&str> {
    match value? {
        JsonValue::String(id) => Some(id.as_str()),
        JsonValue::Object(object) => object.get("id").and_then(JsonValue::as_str),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[reflect(name = "chat.User")]
pub struct User {
    #[reflect(param)]
    pub id: String,
    pub name: Option<String>,
}

impl User {
    pub fn new(id: String) -> Self {
        Self { id, name: None }
    }
}

/// A channel reference bound to the client that sends into it
#[derive(Debug, Clone, Reflect)]
#[reflect(name = "chat.Channel")]
#[reflect(method(name = "send", call = "Channel::send_thunk"))]
pub struct Channel {
    #[reflect(param)]
    pub client: Client,
    #[reflect(param)]
    pub id: String,
}

impl Channel {
    pub fn new(client: Client, id: String) -> Self {
        Self { client, id }
    }

    /// Post `text` to the channel; returns the event id
    pub fn send(&self, text: &str) -> GlueResult<u64> {
        self.client.send_event(serde_json::json!({
            "type": "message",
            "channel": self.id,
            "text": text,
        }))
    }

    fn send_thunk(
        object: &mut dyn polyglue_reflect::Reflect,
        args: Vec<polyglue_reflect::Value>,
    ) -> GlueResult<polyglue_reflect::Value> {
        let channel = polyglue_reflect::receiver::<Channel>(object, "send")?;
        let mut args = polyglue_reflect::Args::new("send", args);
        let text = args.take::<String>()?;
        let id = channel.send(&text)?;
        Ok(polyglue_reflect::Value::new(i64::try_from(id).unwrap_or(i64::MAX)))
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.client.same_session(&other.client)
    }
}

/// Register every chat class, bases before subclasses
pub fn register_classes(registry: &Registry) -> GlueResult<()> {
    registry.register_class::<ChatEvent>()?;
    registry.register_class::<Hello>()?;
    registry.register_class::<Edited>()?;
    registry.register_class::<Message>()?;
    registry.register_class::<ChatError>()?;
    registry.register_class::<User>()?;
    registry.register_class::<Channel>()?;
    registry.register_class::<Client>()?;
    Ok(())
}

/// The global registry with the chat classes registered exactly once
pub fn registry() -> GlueResult<&'static Registry> {
    static REGISTERED: once_cell::sync::OnceCell<()> = once_cell::sync::OnceCell::new();
    REGISTERED.get_or_try_init(|| register_classes(Registry::global()))?;
    Ok(Registry::global())
}
