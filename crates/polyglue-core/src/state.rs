//! Connection lifecycle state machine

use serde::{Deserialize, Serialize};

/// States of one logical client session
///
/// State transitions:
/// ```text
/// Idle → Connecting → Authenticated → SocketOpen → Closing → Closed
///                                          │                   ↑
///                                          └───────────────────┘ (remote close)
///        Any non-terminal state → Failed (on error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Created, `connect` not yet called
    #[default]
    Idle,
    /// Session-start request in flight
    Connecting,
    /// Session granted, WebSocket handshake in flight
    Authenticated,
    /// Socket open, sends are legal
    SocketOpen,
    /// Local close requested, waiting for the transport to confirm
    Closing,
    /// Socket closed
    Closed,
    /// Session failed
    Failed,
}

impl ConnectionState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Idle, Connecting)
                | (Connecting, Authenticated)
                | (Authenticated, SocketOpen)
                | (SocketOpen, Closing)
                | (SocketOpen, Closed)
                | (Closing, Closed)
                | (Idle, Failed)
                | (Connecting, Failed)
                | (Authenticated, Failed)
                | (SocketOpen, Failed)
                | (Closing, Failed)
        )
    }

    /// Check if outbound socket sends are legal in this state
    pub fn can_send(&self) -> bool {
        matches!(self, ConnectionState::SocketOpen)
    }

    /// Check if inbound socket messages are still delivered in this state
    pub fn accepts_inbound(&self) -> bool {
        matches!(self, ConnectionState::SocketOpen | ConnectionState::Closing)
    }

    /// Check if the session is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "Idle"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Authenticated => write!(f, "Authenticated"),
            ConnectionState::SocketOpen => write!(f, "SocketOpen"),
            ConnectionState::Closing => write!(f, "Closing"),
            ConnectionState::Closed => write!(f, "Closed"),
            ConnectionState::Failed => write!(f, "Failed"),
        }
    }
}
