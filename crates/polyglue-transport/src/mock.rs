//! In-memory transports for tests and offline demos
//!
//! Nothing happens until the test drives it: requests wait in a queue until
//! [`MockHttpTransport::complete_next`] answers them, and socket listeners
//! are fired by hand.

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{HttpListener, HttpTransport, WebSocket, WsListener, WsMessage, WsTransport};
use parking_lot::Mutex;
use polyglue_core::{GlueError, GlueResult};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records requests and answers them on demand
#[derive(Default)]
pub struct MockHttpTransport {
    history: Mutex<Vec<HttpRequest>>,
    pending: Mutex<VecDeque<(HttpRequest, Arc<dyn HttpListener>)>>,
}

impl MockHttpTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every request issued so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.history.lock().clone()
    }

    /// Requests not yet answered
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Answer the oldest pending request
    ///
    /// Returns false when nothing is pending. The listener runs on the
    /// calling thread with no mock lock held.
    pub fn complete_next(&self, result: GlueResult<HttpResponse>) -> bool {
        let next = self.pending.lock().pop_front();
        match next {
            Some((request, listener)) => {
                listener.on_http_response(&request, result);
                true
            }
            None => false,
        }
    }
}

impl HttpTransport for MockHttpTransport {
    fn request(&self, request: HttpRequest, listener: Arc<dyn HttpListener>) {
        self.history.lock().push(request.clone());
        self.pending.lock().push_back((request, listener));
    }
}

/// Records open attempts and hands back their listeners
#[derive(Default)]
pub struct MockWsTransport {
    opened: Mutex<Vec<(String, Arc<dyn WsListener>)>>,
}

impl MockWsTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// URLs passed to `open`, oldest first
    pub fn urls(&self) -> Vec<String> {
        self.opened.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Listener of the most recent `open`
    pub fn last_listener(&self) -> Option<Arc<dyn WsListener>> {
        self.opened.lock().last().map(|(_, listener)| listener.clone())
    }
}

impl WsTransport for MockWsTransport {
    fn open(&self, url: &str, listener: Arc<dyn WsListener>) {
        self.opened.lock().push((url.to_string(), listener));
    }
}

/// A socket that records outbound frames
#[derive(Default)]
pub struct MockSocket {
    sent: Mutex<Vec<WsMessage>>,
    closed: AtomicBool,
    broken: AtomicBool,
}

impl MockSocket {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<WsMessage> {
        self.sent.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Make every later `send` fail with a transport error
    pub fn break_pipe(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

impl WebSocket for MockSocket {
    fn send(&self, message: WsMessage) -> GlueResult<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(GlueError::Transport("broken pipe".to_string()));
        }
        if self.is_closed() {
            return Err(GlueError::Transport("socket is closed".to_string()));
        }
        self.sent.lock().push(message);
        Ok(())
    }

    fn close(&self) -> GlueResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
