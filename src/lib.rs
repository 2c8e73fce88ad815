//! Gridmatch - matchmaking and refereed two-player grid game sessions
//!
//! Pairs anonymous authenticated players into two-player sessions over a
//! persistent transport, referees each session to a terminal outcome, and
//! keeps a durable score and ranking record.
//!
//! # Architecture
//!
//! - **Game**: pure board engine for the 3x3 grid (apply / evaluate)
//! - **Queue**: concurrent waiting set with random pairing and ttl eviction
//! - **Session**: per-game state machine plus the concurrent registry
//! - **Coordinator**: reacts to connect/join/move/disconnect events and
//!   timer ticks, wiring queue, registry, transport, and storage
//! - **Transport / Storage**: abstract collaborators; channel-backed and
//!   in-memory implementations are provided
//!
//! # Example
//!
//! ```
//! use gridmatch::{ChannelTransport, Config, Coordinator, MemoryScoreStore};
//! use std::sync::Arc;
//!
//! let (transport, _outbound) = ChannelTransport::new();
//! let coordinator = Coordinator::new(
//!     Arc::new(transport),
//!     Arc::new(MemoryScoreStore::new()),
//!     Config::default(),
//! );
//! coordinator.handle(gridmatch::ClientEvent::JoinQueue {
//!     identity: "alice".into(),
//!     connection: "conn-1".into(),
//! });
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod coordinator;
mod error;
mod game;
mod queue;
mod session;
mod storage;
mod transport;

// Crate-level exports - Configuration
pub use config::{
    Config, DEFAULT_EVICTION_TICK_SECS, DEFAULT_LEADERBOARD_LIMIT, DEFAULT_QUEUE_TTL_SECS,
};

// Crate-level exports - Coordinator
pub use coordinator::Coordinator;

// Crate-level exports - Errors
pub use error::GameError;

// Crate-level exports - Board engine
pub use game::{Board, Cell, Mark, Outcome};

// Crate-level exports - Matchmaking queue
pub use queue::{MatchQueue, WaitingEntry};

// Crate-level exports - Sessions
pub use session::{
    AbandonOutcome, GameSession, MoveOutcome, PlayerId, SessionId, SessionRegistry, SessionState,
};

// Crate-level exports - Storage
pub use storage::{GameOutcome, MemoryScoreStore, ScoreRecord, ScoreStore, StorageError};

// Crate-level exports - Transport
pub use transport::{
    ChannelTransport, ClientEvent, ConnectionId, Delivery, ServerEvent, Transport,
};
