//! Connection state machine for one chat session
//!
//! Every transition happens inside a call from the caller or a callback from
//! the transports; nothing here blocks or awaits. The session state sits
//! behind one mutex, and handler callbacks always run after it is released.

use crate::event::{Channel, User};
use crate::handler::SharedHandler;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use polyglue_core::{ClientConfig, ConnectionState, GlueError, GlueResult};
use polyglue_reflect::{
    ClassDescriptor, Reflect, Reflectable, TypeTag, Typed, Value, receiver,
};
use polyglue_runtime::IoRuntime;
use polyglue_transport::{
    HttpListener, HttpRequest, HttpResponse, JsonCodec, SessionInfo, WebSocket, WsListener,
    WsMessage,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub(crate) const CLIENT_CLASS: &str = "chat.Client";

/// A chat client handle
///
/// Cloning is cheap; clones drive the same session. One client manages
/// exactly one session for its lifetime.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    codec: JsonCodec,
    session: Mutex<Session>,
}

#[derive(Default)]
struct Session {
    state: ConnectionState,
    token: String,
    handler: Option<SharedHandler>,
    runtime: Option<IoRuntime>,
    event_id: u64,
    socket: Option<Arc<dyn WebSocket>>,
    socket_requested: bool,
    info: Option<SessionInfo>,
}

impl Session {
    fn transition(&mut self, to: ConnectionState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "illegal transition {} -> {}",
            self.state,
            to
        );
        tracing::debug!(from = %self.state, to = %to, "client state transition");
        self.state = to;
    }

    fn require(&self, expected: ConnectionState) -> GlueResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(invalid_state(expected.to_string(), self.state))
        }
    }

    /// Move to `Failed`, dropping the socket; returns the handler to notify
    fn fail(&mut self) -> Option<SharedHandler> {
        self.transition(ConnectionState::Failed);
        self.socket = None;
        self.handler.clone()
    }
}

fn invalid_state(expected: impl Into<String>, actual: ConnectionState) -> GlueError {
    GlueError::InvalidState {
        expected: expected.into(),
        actual: actual.to_string(),
    }
}

/// Which call an HTTP response belongs to
enum Route {
    SessionStart,
    Api,
}

struct ResponseListener {
    client: Client,
    route: Route,
}

impl HttpListener for ResponseListener {
    fn on_http_response(&self, request: &HttpRequest, result: GlueResult<HttpResponse>) {
        match self.route {
            Route::SessionStart => self.client.on_session_started(request, result),
            Route::Api => self.client.on_api_response(request, result),
        }
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                codec: JsonCodec::new(),
                session: Mutex::new(Session::default()),
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.session.lock().state
    }

    /// Id of the last event sent; 0 before the first send
    pub fn event_id(&self) -> u64 {
        self.inner.session.lock().event_id
    }

    pub fn token(&self) -> String {
        self.inner.session.lock().token.clone()
    }

    /// Session details, once the session-start call succeeded
    pub fn session(&self) -> Option<SessionInfo> {
        self.inner.session.lock().info.clone()
    }

    /// Id of the authenticated user, once known
    pub fn self_id(&self) -> Option<String> {
        self.inner
            .session
            .lock()
            .info
            .as_ref()
            .map(|info| info.self_info.id.clone())
    }

    /// Whether the session failed before it ever started
    ///
    /// Every other failure happens after the session-start call succeeded,
    /// so only this one leaves the client `Failed` without session details.
    pub fn failed_to_start(&self) -> bool {
        let session = self.inner.session.lock();
        session.state == ConnectionState::Failed && session.info.is_none()
    }

    /// Whether both handles drive the same session
    pub fn same_session(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Start the session
    ///
    /// Posts the token to the session-start endpoint; the outcome arrives
    /// through `handler`. Only fails synchronously when the client is not
    /// `Idle`.
    pub fn connect(
        &self,
        runtime: &IoRuntime,
        token: impl Into<String>,
        handler: SharedHandler,
    ) -> GlueResult<()> {
        let token = token.into();
        let request = HttpRequest::post(self.inner.config.session_start_url())
            .with_form([("token", token.as_str())]);

        {
            let mut session = self.inner.session.lock();
            session.require(ConnectionState::Idle)?;
            session.transition(ConnectionState::Connecting);
            session.token = token;
            session.handler = Some(handler);
            session.runtime = Some(runtime.clone());
        }

        tracing::info!(url = %request.url, "starting session");
        runtime.http().request(
            request,
            Arc::new(ResponseListener {
                client: self.clone(),
                route: Route::SessionStart,
            }),
        );
        Ok(())
    }

    /// Open the session's socket
    ///
    /// Called automatically once the session starts; legal only while
    /// `Authenticated` and before the socket was requested.
    pub fn ws_connect(&self, url: &str) -> GlueResult<()> {
        let runtime = {
            let mut session = self.inner.session.lock();
            session.require(ConnectionState::Authenticated)?;
            if session.socket_requested {
                return Err(invalid_state(
                    "Authenticated without a pending socket",
                    session.state,
                ));
            }
            session.socket_requested = true;
            session.runtime.clone()
        };

        let runtime = runtime
            .ok_or_else(|| GlueError::Internal("authenticated client has no runtime".to_string()))?;
        tracing::info!(url, "opening socket");
        runtime.ws().open(url, Arc::new(self.clone()));
        Ok(())
    }

    /// Send a frame; returns the event id assigned to it
    ///
    /// Legal only while `SocketOpen`. Ids are issued in send order. A failed
    /// send fails the session and is also reported through `on_ws_error`.
    pub fn ws_send(&self, message: WsMessage) -> GlueResult<u64> {
        self.send_with(|_| Ok(message))
    }

    pub fn ws_send_text(&self, text: impl Into<String>) -> GlueResult<u64> {
        self.ws_send(WsMessage::text(text))
    }

    /// Send a JSON object event, stamping `"id"` with its event id
    pub fn send_event(&self, event: serde_json::Value) -> GlueResult<u64> {
        let serde_json::Value::Object(mut fields) = event else {
            return Err(GlueError::Serialization(
                "events must be JSON objects".to_string(),
            ));
        };
        let codec = &self.inner.codec;
        self.send_with(move |id| {
            fields.insert("id".to_string(), serde_json::Value::from(id));
            let text = codec.encode_string(&fields)?;
            Ok(WsMessage::Text(text))
        })
    }

    /// Send while holding the session lock so ids follow send order
    fn send_with(&self, frame: impl FnOnce(u64) -> GlueResult<WsMessage>) -> GlueResult<u64> {
        let failure = {
            let mut session = self.inner.session.lock();
            if !session.state.can_send() {
                return Err(invalid_state(
                    ConnectionState::SocketOpen.to_string(),
                    session.state,
                ));
            }
            let socket = session
                .socket
                .clone()
                .ok_or_else(|| GlueError::Internal("open session has no socket".to_string()))?;

            let next = session.event_id + 1;
            let message = frame(next)?;
            match socket.send(message) {
                Ok(()) => {
                    session.event_id = next;
                    tracing::trace!(event_id = next, "frame sent");
                    return Ok(next);
                }
                Err(e) => (e, session.fail()),
            }
        };

        let (error, handler) = failure;
        tracing::error!(error = %error, "send failed, session failed");
        if let Some(handler) = handler {
            handler.on_ws_error(self, &error);
        }
        Err(error)
    }

    /// Ask the socket to close
    ///
    /// `SocketOpen` becomes `Closing`; the transport's close callback
    /// completes the session.
    pub fn close(&self) -> GlueResult<()> {
        let socket = {
            let mut session = self.inner.session.lock();
            session.require(ConnectionState::SocketOpen)?;
            session.transition(ConnectionState::Closing);
            session.socket.clone()
        };

        tracing::info!("closing socket");
        let Some(socket) = socket else {
            return Ok(());
        };
        if let Err(error) = socket.close() {
            let handler = {
                let mut session = self.inner.session.lock();
                if session.state.is_terminal() {
                    None
                } else {
                    session.fail()
                }
            };
            tracing::error!(error = %error, "close failed, session failed");
            if let Some(handler) = handler {
                handler.on_ws_error(self, &error);
            }
            return Err(error);
        }
        Ok(())
    }

    /// Call an API method with the session token
    ///
    /// The response goes to `on_http_response`. Legal once `connect` was
    /// called and until the session ends.
    pub fn request<K, V>(
        &self,
        method: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> GlueResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (token, runtime) = {
            let session = self.inner.session.lock();
            if session.state == ConnectionState::Idle || session.state.is_terminal() {
                return Err(invalid_state("an active session", session.state));
            }
            (session.token.clone(), session.runtime.clone())
        };
        let runtime = runtime
            .ok_or_else(|| GlueError::Internal("active client has no runtime".to_string()))?;

        let mut form: Vec<(String, String)> = vec![("token".to_string(), token)];
        form.extend(
            params
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
        );
        let request = HttpRequest::post(self.inner.config.api_url(method)).with_form(form);

        tracing::debug!(method, "API request");
        runtime.http().request(
            request,
            Arc::new(ResponseListener {
                client: self.clone(),
                route: Route::Api,
            }),
        );
        Ok(())
    }

    /// A channel reference bound to this client
    pub fn channel(&self, id: impl Into<String>) -> Channel {
        Channel::new(self.clone(), id.into())
    }

    pub fn user(&self, id: impl Into<String>) -> User {
        User::new(id.into())
    }

    fn on_session_started(&self, request: &HttpRequest, result: GlueResult<HttpResponse>) {
        let outcome = result.and_then(|response| {
            SessionInfo::from_response(&response).map(|info| (response, info))
        });

        let notify = {
            let mut session = self.inner.session.lock();
            if session.state != ConnectionState::Connecting {
                tracing::warn!(state = %session.state, "late session-start response ignored");
                return;
            }
            match &outcome {
                Ok((_, info)) => {
                    session.transition(ConnectionState::Authenticated);
                    session.info = Some(info.clone());
                    None
                }
                Err(_) => session.fail(),
            }
        };

        match outcome {
            Ok((_, info)) => {
                tracing::info!(self_id = %info.self_info.id, "session started");
                if let Err(e) = self.ws_connect(&info.url) {
                    tracing::warn!(error = %e, "socket not opened");
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "session start failed");
                if let Some(handler) = notify {
                    handler.on_http_response(self, request, Err(&error));
                }
            }
        }
    }

    fn on_api_response(&self, request: &HttpRequest, result: GlueResult<HttpResponse>) {
        let handler = self.inner.session.lock().handler.clone();
        match handler {
            Some(handler) => handler.on_http_response(self, request, result.as_ref()),
            None => tracing::warn!(url = %request.url, "API response with no handler dropped"),
        }
    }
}

impl WsListener for Client {
    fn on_ws_connected(&self, socket: Arc<dyn WebSocket>) {
        let handler = {
            let mut session = self.inner.session.lock();
            if session.state != ConnectionState::Authenticated {
                tracing::warn!(
                    state = %session.state,
                    "socket opened outside Authenticated, closing it"
                );
                drop(session);
                let _ = socket.close();
                return;
            }
            session.transition(ConnectionState::SocketOpen);
            session.socket = Some(socket);
            session.handler.clone()
        };

        tracing::info!("socket open");
        if let Some(handler) = handler {
            handler.on_ws_connected(self);
        }
    }

    fn on_ws_message(&self, message: WsMessage) {
        let (handler, event_id) = {
            let session = self.inner.session.lock();
            if !session.state.accepts_inbound() {
                tracing::warn!(state = %session.state, "inbound frame dropped");
                return;
            }
            (session.handler.clone(), session.event_id)
        };

        if let Some(handler) = handler {
            handler.on_ws_message(self, &message, event_id);
        }
    }

    fn on_ws_close(&self) {
        enum Outcome {
            Closed(Option<SharedHandler>),
            Failed(Option<SharedHandler>),
        }

        let outcome = {
            let mut session = self.inner.session.lock();
            match session.state {
                ConnectionState::SocketOpen | ConnectionState::Closing => {
                    session.transition(ConnectionState::Closed);
                    session.socket = None;
                    Outcome::Closed(session.handler.clone())
                }
                state if state.is_terminal() => {
                    tracing::warn!(state = %state, "close after session end ignored");
                    return;
                }
                _ => Outcome::Failed(session.fail()),
            }
        };

        match outcome {
            Outcome::Closed(handler) => {
                tracing::info!("socket closed");
                if let Some(handler) = handler {
                    handler.on_ws_close(self);
                }
            }
            Outcome::Failed(handler) => {
                let error = GlueError::Transport("socket closed before it opened".to_string());
                tracing::error!(error = %error, "session failed");
                if let Some(handler) = handler {
                    handler.on_ws_error(self, &error);
                }
            }
        }
    }

    fn on_ws_error(&self, error: GlueError) {
        let handler = {
            let mut session = self.inner.session.lock();
            if session.state.is_terminal() {
                tracing::warn!(
                    state = %session.state,
                    error = %error,
                    "error after session end ignored"
                );
                return;
            }
            session.fail()
        };

        tracing::error!(error = %error, "session failed");
        if let Some(handler) = handler {
            handler.on_ws_error(self, &error);
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.inner.session.lock();
        f.debug_struct("Client")
            .field("state", &session.state)
            .field("event_id", &session.event_id)
            .finish_non_exhaustive()
    }
}

// Reflection: fields `token` and `eventId` are writable only while Idle.

impl Client {
    fn construct(_args: Vec<Value>) -> GlueResult<Box<dyn Reflect>> {
        Ok(Box::new(Client::with_defaults()))
    }

    fn close_thunk(object: &mut dyn Reflect, _args: Vec<Value>) -> GlueResult<Value> {
        receiver::<Client>(object, "close")?.close()?;
        Ok(Value::new(()))
    }

    fn send_thunk(object: &mut dyn Reflect, args: Vec<Value>) -> GlueResult<Value> {
        let client = receiver::<Client>(object, "wsSend")?;
        let mut args = polyglue_reflect::Args::new("wsSend", args);
        let text = args.take::<String>()?;
        let id = client.ws_send_text(text)?;
        Ok(Value::new(reflect_id(id)))
    }

    fn state_thunk(object: &mut dyn Reflect, _args: Vec<Value>) -> GlueResult<Value> {
        let client = receiver::<Client>(object, "state")?;
        Ok(Value::new(client.state().to_string()))
    }
}

fn reflect_id(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

impl Reflect for Client {
    fn class(&self) -> &'static ClassDescriptor {
        Self::describe()
    }

    fn get_field(&self, name: &str) -> GlueResult<Value> {
        match name {
            "token" => Ok(Value::new(self.token())),
            "eventId" => Ok(Value::new(reflect_id(self.event_id()))),
            _ => Err(GlueError::UnknownField {
                class: CLIENT_CLASS.to_string(),
                field: name.to_string(),
            }),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> GlueResult<()> {
        let mut session = self.inner.session.lock();
        match name {
            "token" => {
                let token = value.take::<String>(name)?;
                session.require(ConnectionState::Idle)?;
                session.token = token;
                Ok(())
            }
            "eventId" => {
                let raw = value.take::<i64>(name)?;
                let id = u64::try_from(raw).map_err(|_| GlueError::TypeMismatch {
                    target: name.to_string(),
                    expected: "non-negative int".to_string(),
                    actual: raw.to_string(),
                })?;
                session.require(ConnectionState::Idle)?;
                session.event_id = id;
                Ok(())
            }
            _ => Err(GlueError::UnknownField {
                class: CLIENT_CLASS.to_string(),
                field: name.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl Reflectable for Client {
    fn describe() -> &'static ClassDescriptor {
        static DESCRIPTOR: OnceCell<ClassDescriptor> = OnceCell::new();
        DESCRIPTOR.get_or_init(|| {
            ClassDescriptor::builder(CLIENT_CLASS)
                .field("token", TypeTag::String)
                .field("eventId", TypeTag::Int)
                .method("close", Client::close_thunk)
                .method("wsSend", Client::send_thunk)
                .method("state", Client::state_thunk)
                .constructor(Client::construct)
                .finish()
        })
    }
}

impl Typed for Client {
    fn type_tag() -> TypeTag {
        TypeTag::class(CLIENT_CLASS)
    }
}
