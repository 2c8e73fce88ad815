//! Game sessions and the concurrent session registry.

use crate::error::GameError;
use crate::game::{Board, Mark, Outcome};
use crate::transport::ConnectionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Moves are being accepted.
    InProgress,
    /// Terminal: a win, draw, or abandon has been reached.
    Finished,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Game continues; the named player moves next.
    Ongoing {
        /// Player who holds the next turn.
        next_turn: PlayerId,
    },
    /// The move completed a line.
    Won {
        /// Player who made the winning move.
        winner: PlayerId,
        /// The other participant.
        loser: PlayerId,
        /// Cell indices of the completed line.
        line: [usize; 3],
    },
    /// The move filled the board without a winner.
    Draw,
}

/// Result of abandoning an in-progress session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbandonOutcome {
    /// Remaining player, declared winner by disconnect.
    pub winner: PlayerId,
    /// Player who abandoned.
    pub loser: PlayerId,
}

/// One two-player game: board, participants, and turn state.
///
/// Slot order determines the symbol: the first player always plays X, the
/// second always O. The opening turn is chosen uniformly at random, so
/// symbol and turn order are independent.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    players: (PlayerId, PlayerId),
    connections: (ConnectionId, ConnectionId),
    board: Board,
    current_turn: PlayerId,
    state: SessionState,
}

impl GameSession {
    /// Creates a session for the two paired players.
    #[instrument(skip(connection1, connection2))]
    pub fn create(
        player1: PlayerId,
        connection1: ConnectionId,
        player2: PlayerId,
        connection2: ConnectionId,
    ) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let current_turn = if rand::random::<bool>() {
            player1.clone()
        } else {
            player2.clone()
        };
        info!(
            session_id = %id,
            player1 = %player1,
            player2 = %player2,
            first_to_move = %current_turn,
            "Creating game session"
        );
        Self {
            id,
            players: (player1, player2),
            connections: (connection1, connection2),
            board: Board::new(),
            current_turn,
            state: SessionState::InProgress,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The two participants in slot order.
    pub fn players(&self) -> &(PlayerId, PlayerId) {
        &self.players
    }

    /// Connection handles for the two participants, in slot order.
    pub fn connections(&self) -> &(ConnectionId, ConnectionId) {
        &self.connections
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player who holds the turn.
    pub fn current_turn(&self) -> &PlayerId {
        &self.current_turn
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Checks whether the identity is one of the two participants.
    pub fn is_participant(&self, identity: &str) -> bool {
        self.players.0 == identity || self.players.1 == identity
    }

    /// Mark assigned to the identity, by slot order.
    pub fn mark_of(&self, identity: &str) -> Option<Mark> {
        if self.players.0 == identity {
            Some(Mark::X)
        } else if self.players.1 == identity {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// The other participant.
    pub fn opponent_of(&self, identity: &str) -> Option<&PlayerId> {
        if self.players.0 == identity {
            Some(&self.players.1)
        } else if self.players.1 == identity {
            Some(&self.players.0)
        } else {
            None
        }
    }

    /// Submits a move for the identity at the given cell.
    ///
    /// On success the turn flips to the other player and the board is
    /// evaluated for a terminal state. Rejected moves leave the session
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotInSession`] for a non-participant or a
    /// finished session, [`GameError::NotYourTurn`] out of turn, and
    /// [`GameError::InvalidMove`] for a bad cell.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn submit_move(&mut self, identity: &str, pos: usize) -> Result<MoveOutcome, GameError> {
        if self.state == SessionState::Finished {
            return Err(GameError::NotInSession);
        }
        let mark = self.mark_of(identity).ok_or(GameError::NotInSession)?;
        if self.current_turn != identity {
            warn!(identity, current_turn = %self.current_turn, "Move out of turn");
            return Err(GameError::NotYourTurn);
        }

        self.board.apply(pos, mark)?;

        let opponent = self
            .opponent_of(identity)
            .ok_or(GameError::NotInSession)?
            .clone();
        self.current_turn = opponent.clone();

        let outcome = match self.board.evaluate() {
            Outcome::Win { line, .. } => {
                self.state = SessionState::Finished;
                info!(session_id = %self.id, winner = %identity, "Session won");
                MoveOutcome::Won {
                    winner: identity.to_owned(),
                    loser: opponent,
                    line,
                }
            }
            Outcome::Draw => {
                self.state = SessionState::Finished;
                info!(session_id = %self.id, "Session drawn");
                MoveOutcome::Draw
            }
            Outcome::Ongoing => MoveOutcome::Ongoing {
                next_turn: self.current_turn.clone(),
            },
        };

        Ok(outcome)
    }

    /// Abandons the session on behalf of the identity; the other player is
    /// declared winner by disconnect.
    ///
    /// Returns `None` if the session is already finished or the identity is
    /// not a participant, making duplicate disconnect signals no-ops.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn abandon(&mut self, identity: &str) -> Option<AbandonOutcome> {
        if self.state == SessionState::Finished {
            debug!(identity, "Abandon on finished session is a no-op");
            return None;
        }
        let winner = self.opponent_of(identity)?.clone();
        self.state = SessionState::Finished;
        info!(session_id = %self.id, winner = %winner, loser = %identity, "Session abandoned");
        Some(AbandonOutcome {
            winner,
            loser: identity.to_owned(),
        })
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    sessions: HashMap<SessionId, Arc<Mutex<GameSession>>>,
    by_player: HashMap<PlayerId, SessionId>,
}

/// Concurrent registry of active sessions.
///
/// Holds the forward map `session id -> session` and the reverse map
/// `player -> session id`. The registry lock guards the maps only; each
/// session carries its own mutex so move handling for different sessions
/// proceeds fully in parallel.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the session and indexes both players in the reverse map.
    ///
    /// Returns the session id.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn register(&self, session: GameSession) -> SessionId {
        let id = session.id().clone();
        let (player1, player2) = session.players().clone();
        let mut inner = self.inner.lock().unwrap();
        inner.by_player.insert(player1, id.clone());
        inner.by_player.insert(player2, id.clone());
        inner
            .sessions
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        info!(session_id = %id, active = inner.sessions.len(), "Session registered");
        id
    }

    /// Looks up a session by id.
    pub fn lookup(&self, id: &str) -> Option<Arc<Mutex<GameSession>>> {
        let inner = self.inner.lock().unwrap();
        inner.sessions.get(id).cloned()
    }

    /// Looks up the session id a player is part of, if any.
    pub fn lookup_by_player(&self, identity: &str) -> Option<SessionId> {
        let inner = self.inner.lock().unwrap();
        inner.by_player.get(identity).cloned()
    }

    /// Removes the session and both reverse entries. Idempotent.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(slot) = inner.sessions.remove(id) {
            let (player1, player2) = slot.lock().unwrap().players().clone();
            // Only clear reverse entries that still point at this session.
            for player in [player1, player2] {
                if inner.by_player.get(&player).is_some_and(|sid| sid == id) {
                    inner.by_player.remove(&player);
                }
            }
            info!(session_id = %id, active = inner.sessions.len(), "Session removed");
        } else {
            debug!(session_id = %id, "Remove of absent session is a no-op");
        }
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    /// Checks whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
