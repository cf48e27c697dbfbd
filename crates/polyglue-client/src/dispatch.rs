//! Decoding inbound frames into chat events

use crate::client::Client;
use crate::event::{ChatError, ChatEvent, Hello, Message, registry};
use crate::handler::ProtocolHandler;
use polyglue_core::{GlueError, GlueResult};
use polyglue_reflect::{Instance, Registry, json};
use polyglue_transport::{HttpRequest, HttpResponse, JsonCodec, WsMessage};
use serde_json::{Map, Value as JsonValue};

/// Typed chat callbacks
///
/// The per-event hooks fall back to [`ChatHandler::on_event`], so a handler
/// can override only what it cares about.
#[allow(unused_variables)]
pub trait ChatHandler: Send + Sync {
    /// Any event without a more specific hook
    fn on_event(&self, client: &Client, event: &ChatEvent) {}

    fn on_hello(&self, client: &Client, hello: &Hello) {
        self.on_event(client, &hello.base());
    }

    fn on_message(&self, client: &Client, message: &Message) {
        self.on_event(client, &message.base());
    }

    fn on_chat_error(&self, client: &Client, error: &ChatError) {
        self.on_event(client, &error.base());
    }

    fn on_connected(&self, client: &Client) {}

    fn on_closed(&self, client: &Client) {}

    fn on_failure(&self, client: &Client, error: &GlueError) {}

    fn on_api_response(
        &self,
        client: &Client,
        request: &HttpRequest,
        response: Result<&HttpResponse, &GlueError>,
    ) {
    }
}

/// Class constructed for a frame's `type`
fn class_for(kind: Option<&str>) -> &'static str {
    match kind {
        Some("hello") => "chat.event.Hello",
        Some("message") => "chat.event.Message",
        Some("error") => "chat.event.ChatError",
        _ => "chat.event.ChatEvent",
    }
}

/// A [`ProtocolHandler`] that turns text frames into chat events
///
/// Frames are decoded as JSON objects, the event class is chosen from the
/// `type` key and constructed through the registry, and the instance is
/// filled by the JSON loader before dispatch. Undecodable frames are logged
/// and dropped.
pub struct EventDispatcher<H> {
    handler: H,
    registry: &'static Registry,
    codec: JsonCodec,
}

impl<H: ChatHandler> EventDispatcher<H> {
    /// Dispatch through the global registry
    pub fn new(handler: H) -> GlueResult<Self> {
        Ok(Self::with_registry(handler, registry()?))
    }

    /// Dispatch through `registry`, which must hold the chat classes
    pub fn with_registry(handler: H, registry: &'static Registry) -> Self {
        Self {
            handler,
            registry,
            codec: JsonCodec::new(),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Decode one text frame into an event instance
    pub fn decode(&self, text: &str) -> GlueResult<Instance> {
        let mut payload = self.codec.decode_object(text)?;
        let class = class_for(payload.get("type").and_then(JsonValue::as_str));
        if class == "chat.event.ChatError" {
            hoist_error_details(&mut payload);
        }

        let adapter = self.registry.adapter(class)?;
        json::construct_from(&adapter, Vec::new(), &JsonValue::Object(payload))
    }

    fn dispatch(&self, client: &Client, instance: &Instance) {
        if let Some(hello) = instance.downcast_ref::<Hello>() {
            self.handler.on_hello(client, hello);
        } else if let Some(message) = instance.downcast_ref::<Message>() {
            self.handler.on_message(client, message);
        } else if let Some(error) = instance.downcast_ref::<ChatError>() {
            self.handler.on_chat_error(client, error);
        } else if let Some(event) = instance.downcast_ref::<ChatEvent>() {
            self.handler.on_event(client, event);
        } else {
            tracing::warn!(class = instance.class_name(), "no hook for event class");
        }
    }
}

/// `{"type":"error","error":{"code":1,"msg":"..."}}` carries its details
/// one level down; lift them next to the base fields
fn hoist_error_details(payload: &mut Map<String, JsonValue>) {
    if let Some(JsonValue::Object(details)) = payload.remove("error") {
        for key in ["code", "msg"] {
            if let Some(value) = details.get(key) {
                payload.entry(key).or_insert_with(|| value.clone());
            }
        }
    }
}

impl<H: ChatHandler> ProtocolHandler for EventDispatcher<H> {
    fn on_ws_connected(&self, client: &Client) {
        self.handler.on_connected(client);
    }

    fn on_ws_message(&self, client: &Client, message: &WsMessage, event_id: u64) {
        let Some(text) = message.as_text() else {
            tracing::debug!(len = message.len(), "binary frame ignored");
            return;
        };

        match self.decode(text) {
            Ok(instance) => {
                tracing::trace!(class = instance.class_name(), event_id, "event decoded");
                self.dispatch(client, &instance);
            }
            Err(e) => tracing::warn!(error = %e, "undecodable frame dropped"),
        }
    }

    fn on_ws_close(&self, client: &Client) {
        self.handler.on_closed(client);
    }

    fn on_ws_error(&self, client: &Client, error: &GlueError) {
        self.handler.on_failure(client, error);
    }

    fn on_http_response(
        &self,
        client: &Client,
        request: &HttpRequest,
        response: Result<&HttpResponse, &GlueError>,
    ) {
        // A failed session start ends the session before any socket exists.
        if let Err(error) = response
            && request.url == client.config().session_start_url()
            && client.failed_to_start()
        {
            self.handler.on_failure(client, error);
            return;
        }
        self.handler.on_api_response(client, request, response);
    }
}
