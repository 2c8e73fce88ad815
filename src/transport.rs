//! Abstract outbound transport and the wire-visible event types.
//!
//! The transport owns connections; the core only addresses them through
//! opaque [`ConnectionId`] handles. Inbound events arrive with the identity
//! already resolved by the external auth layer, so nothing in the core reads
//! implicit per-request state.

use crate::session::{PlayerId, SessionId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Opaque reference to one live transport connection.
pub type ConnectionId = String;

/// Inbound client events, validated and tagged at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A connection was established for an authenticated identity.
    Connect {
        /// Identity resolved by the auth layer.
        identity: PlayerId,
        /// The new connection.
        connection: ConnectionId,
    },
    /// The player asks to enter the matchmaking queue.
    JoinQueue {
        /// Identity resolved by the auth layer.
        identity: PlayerId,
        /// Connection to notify on.
        connection: ConnectionId,
    },
    /// The player submits a move in a session.
    MakeMove {
        /// Identity resolved by the auth layer.
        identity: PlayerId,
        /// Session the move targets.
        session_id: SessionId,
        /// Cell index (0-8).
        position: usize,
    },
    /// The player's connection closed.
    Disconnect {
        /// Identity resolved by the auth layer.
        identity: PlayerId,
    },
}

/// Outbound server events; the payload fields are the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent to a player who entered (or re-entered) the queue.
    QueueJoined {
        /// Human-readable confirmation.
        message: String,
    },
    /// Broadcast when a player leaves the queue or is evicted.
    QueueLeft {
        /// Human-readable notice.
        message: String,
    },
    /// Broadcast snapshot of the waiting list, in membership order.
    QueueUpdated {
        /// Identities currently waiting.
        waiting_players: Vec<PlayerId>,
    },
    /// Sent to each participant when a pairing produces a session.
    GameStart {
        /// The new session's id.
        session_id: SessionId,
        /// The other participant.
        opponent: PlayerId,
        /// Whether the recipient holds the opening turn.
        your_turn: bool,
    },
    /// Sent to both participants after an accepted move.
    MoveMade {
        /// Cell index played.
        position: usize,
        /// Player who moved.
        player: PlayerId,
    },
    /// Sent to both participants while the game continues.
    NextTurn {
        /// Player who holds the turn.
        player: PlayerId,
    },
    /// Sent to both participants when the session reaches a terminal state.
    GameOver {
        /// Winner identity, or `"draw"`.
        winner: String,
        /// Completed line indices on a win by move.
        #[serde(skip_serializing_if = "Option::is_none")]
        winning_line: Option<[usize; 3]>,
        /// `"disconnect"` when the win came from an abandon.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl ServerEvent {
    /// Builds a terminal event for a win by completed line.
    pub fn won(winner: &str, line: [usize; 3]) -> Self {
        Self::GameOver {
            winner: winner.to_owned(),
            winning_line: Some(line),
            reason: None,
        }
    }

    /// Builds a terminal event for a draw.
    pub fn draw() -> Self {
        Self::GameOver {
            winner: "draw".to_owned(),
            winning_line: None,
            reason: None,
        }
    }

    /// Builds a terminal event for a win by disconnect.
    pub fn won_by_disconnect(winner: &str) -> Self {
        Self::GameOver {
            winner: winner.to_owned(),
            winning_line: None,
            reason: Some("disconnect".to_owned()),
        }
    }
}

/// Outbound message addressing: one connection or every connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Target connection, or `None` for a broadcast.
    pub to: Option<ConnectionId>,
    /// The event payload.
    pub event: ServerEvent,
}

/// Abstract send-side of the transport.
///
/// Implementations must not block: the coordinator calls these while outside
/// its structural locks but on the event-handling path.
pub trait Transport: Send + Sync {
    /// Sends an event to a single connection.
    fn send(&self, connection: &ConnectionId, event: &ServerEvent);

    /// Sends an event to every connected client.
    fn broadcast(&self, event: &ServerEvent);
}

/// Channel-backed transport used by the demo binary and tests.
///
/// Deliveries are pushed onto an unbounded channel; the consumer decides how
/// to frame and fan them out.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    outbound: tokio::sync::mpsc::UnboundedSender<Delivery>,
}

impl ChannelTransport {
    /// Creates a transport and the receiving half of its delivery channel.
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<Delivery>) {
        let (outbound, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { outbound }, receiver)
    }

    fn push(&self, delivery: Delivery) {
        if self.outbound.send(delivery).is_err() {
            warn!("Outbound delivery dropped: receiver closed");
        }
    }
}

impl Transport for ChannelTransport {
    fn send(&self, connection: &ConnectionId, event: &ServerEvent) {
        self.push(Delivery {
            to: Some(connection.clone()),
            event: event.clone(),
        });
    }

    fn broadcast(&self, event: &ServerEvent) {
        self.push(Delivery {
            to: None,
            event: event.clone(),
        });
    }
}
