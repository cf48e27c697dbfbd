//! WebSocket transport over tungstenite
//!
//! Each socket is owned by one blocking worker. The worker alternates between
//! draining the outbound queue and a read bounded by the poll interval, so
//! sends and shutdown are noticed within one interval.

use crate::runtime::{AsyncRuntime, Workers};
use crate::shutdown::ShutdownSignal;
use once_cell::sync::OnceCell;
use polyglue_core::{GlueError, GlueResult};
use polyglue_transport::{WebSocket, WsListener, WsMessage, WsTransport};
use rustls::pki_types::ServerName;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;
use tungstenite::Message;
use url::{Host, Url};

static TLS_CONFIG: OnceCell<Arc<rustls::ClientConfig>> = OnceCell::new();

/// Bound on connecting plus the TLS and upgrade handshakes
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

trait ReadWrite: Read + Write + Send {}
impl<T: Read + Write + Send> ReadWrite for T {}

type Socket = tungstenite::WebSocket<Box<dyn ReadWrite>>;

enum Outbound {
    Frame(WsMessage),
    Close,
}

/// Opens `ws://` and `wss://` sockets on blocking runtime workers
pub struct TungsteniteWsTransport {
    workers: Workers,
    shutdown: ShutdownSignal,
    timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy)]
struct Timeouts {
    handshake: Duration,
    poll: Duration,
}

impl TungsteniteWsTransport {
    pub fn new(runtime: &AsyncRuntime, poll_interval: Duration) -> Self {
        Self {
            workers: runtime.workers(),
            shutdown: runtime.shutdown_signal(),
            timeouts: Timeouts {
                handshake: DEFAULT_HANDSHAKE_TIMEOUT,
                poll: poll_interval,
            },
        }
    }

    /// Give up on a server that does not finish the handshake in `timeout`
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.handshake = timeout;
        self
    }
}

impl WsTransport for TungsteniteWsTransport {
    fn open(&self, url: &str, listener: Arc<dyn WsListener>) {
        let url = url.to_string();
        let shutdown = self.shutdown.clone();
        let timeouts = self.timeouts;

        self.workers
            .spawn(move || run_socket(&url, listener, shutdown, timeouts));
    }
}

/// Handle given to the listener; frames are queued for the worker
struct QueuedSocket {
    outbound: Sender<Outbound>,
}

impl WebSocket for QueuedSocket {
    fn send(&self, message: WsMessage) -> GlueResult<()> {
        self.outbound
            .send(Outbound::Frame(message))
            .map_err(|_| GlueError::Transport("socket is closed".to_string()))
    }

    fn close(&self) -> GlueResult<()> {
        self.outbound
            .send(Outbound::Close)
            .map_err(|_| GlueError::Transport("socket is closed".to_string()))
    }
}

fn run_socket(
    url: &str,
    listener: Arc<dyn WsListener>,
    shutdown: ShutdownSignal,
    timeouts: Timeouts,
) {
    let mut socket = match connect(url, timeouts) {
        Ok(socket) => socket,
        Err(e) => {
            tracing::error!(url, error = %e, "WebSocket connect failed");
            listener.on_ws_error(e);
            return;
        }
    };
    tracing::info!(url, "WebSocket open");

    let (outbound, queue) = mpsc::channel();
    listener.on_ws_connected(Arc::new(QueuedSocket { outbound }));

    let mut closing = false;
    loop {
        if !closing && shutdown.is_triggered() {
            tracing::debug!(url, "closing WebSocket for shutdown");
            closing = true;
            begin_close(&mut socket);
        }

        if let Err(e) = drain_outbound(&mut socket, &queue, &mut closing) {
            listener.on_ws_error(e);
            return;
        }

        match socket.read() {
            Ok(Message::Text(text)) => listener.on_ws_message(WsMessage::Text(text)),
            Ok(Message::Binary(bytes)) => listener.on_ws_message(WsMessage::Binary(bytes)),
            Ok(_) => {}
            Err(tungstenite::Error::Io(e)) if is_poll_timeout(&e) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                tracing::info!(url, "WebSocket closed");
                listener.on_ws_close();
                return;
            }
            Err(e) => {
                tracing::error!(url, error = %e, "WebSocket read failed");
                listener.on_ws_error(GlueError::Transport(format!("WebSocket read failed: {}", e)));
                return;
            }
        }
    }
}

fn drain_outbound(
    socket: &mut Socket,
    queue: &Receiver<Outbound>,
    closing: &mut bool,
) -> GlueResult<()> {
    loop {
        match queue.try_recv() {
            Ok(Outbound::Frame(_)) if *closing => {
                tracing::warn!("dropping outbound frame on closing socket");
            }
            Ok(Outbound::Frame(message)) => {
                let frame = match message {
                    WsMessage::Text(text) => Message::Text(text),
                    WsMessage::Binary(bytes) => Message::Binary(bytes),
                };
                socket
                    .send(frame)
                    .map_err(|e| GlueError::Transport(format!("WebSocket send failed: {}", e)))?;
            }
            Ok(Outbound::Close) | Err(TryRecvError::Disconnected) if !*closing => {
                *closing = true;
                begin_close(socket);
            }
            Ok(Outbound::Close) => {}
            Err(TryRecvError::Disconnected) | Err(TryRecvError::Empty) => return Ok(()),
        }
    }
}

fn begin_close(socket: &mut Socket) {
    if let Err(e) = socket.close(None) {
        tracing::debug!(error = %e, "close frame not sent");
    }
}

fn is_poll_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn connect(url: &str, timeouts: Timeouts) -> GlueResult<Socket> {
    let parsed = Url::parse(url)
        .map_err(|e| GlueError::Transport(format!("invalid WebSocket URL '{}': {}", url, e)))?;
    let use_tls = match parsed.scheme() {
        "ws" => false,
        "wss" => true,
        other => {
            return Err(GlueError::Transport(format!(
                "unsupported WebSocket scheme '{}'",
                other
            )));
        }
    };
    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => {
            return Err(GlueError::Transport(format!(
                "WebSocket URL '{}' has no host",
                url
            )));
        }
    };
    let addrs = parsed
        .socket_addrs(|| None)
        .map_err(|e| GlueError::Transport(format!("cannot resolve '{}': {}", host, e)))?;

    let tcp = connect_any(&addrs, timeouts.handshake)
        .map_err(|e| GlueError::Transport(format!("cannot connect to '{}': {}", host, e)))?;
    let _ = tcp.set_nodelay(true);
    let control = tcp
        .try_clone()
        .map_err(|e| GlueError::Transport(format!("socket setup failed: {}", e)))?;
    set_timeouts(&control, Some(timeouts.handshake), Some(timeouts.handshake))?;

    let stream: Box<dyn ReadWrite> = if use_tls {
        Box::new(connect_tls(tcp, &host)?)
    } else {
        Box::new(tcp)
    };

    let (socket, response) = tungstenite::client(url, stream)
        .map_err(|e| GlueError::Transport(format!("WebSocket handshake failed: {}", e)))?;
    tracing::debug!(status = response.status().as_u16(), "WebSocket handshake complete");

    // The read loop treats the read timeout as its poll tick.
    set_timeouts(&control, Some(timeouts.poll), Some(timeouts.handshake))?;

    Ok(socket)
}

/// First address that accepts a connection within `timeout`
fn connect_any(addrs: &[SocketAddr], timeout: Duration) -> io::Result<TcpStream> {
    let mut last = io::Error::new(io::ErrorKind::NotFound, "no addresses resolved");
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last = e,
        }
    }
    Err(last)
}

fn set_timeouts(
    tcp: &TcpStream,
    read: Option<Duration>,
    write: Option<Duration>,
) -> GlueResult<()> {
    tcp.set_read_timeout(read)
        .and_then(|()| tcp.set_write_timeout(write))
        .map_err(|e| GlueError::Transport(format!("socket setup failed: {}", e)))
}

fn connect_tls(
    tcp: TcpStream,
    host: &str,
) -> GlueResult<rustls::StreamOwned<rustls::ClientConnection, TcpStream>> {
    let config = TLS_CONFIG
        .get_or_init(|| {
            let mut roots = rustls::RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            Arc::new(
                rustls::ClientConfig::builder()
                    .with_root_certificates(roots)
                    .with_no_client_auth(),
            )
        })
        .clone();

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| GlueError::Transport(format!("invalid server name '{}': {}", host, e)))?;
    let connection = rustls::ClientConnection::new(config, server_name)
        .map_err(|e| GlueError::Transport(format!("TLS setup failed: {}", e)))?;

    let mut stream = rustls::StreamOwned::new(connection, tcp);
    stream
        .flush()
        .map_err(|e| GlueError::Transport(format!("TLS handshake failed: {}", e)))?;
    Ok(stream)
}
