//! Error taxonomy for queue, session, and move handling.

use derive_more::{Display, Error};

/// Recoverable errors raised by queue and session operations.
///
/// Every variant is swallowed at the coordinator boundary: a malformed or
/// out-of-turn client event produces no state change and no broadcast. The
/// server never becomes inconsistent because of a bad client event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// Move targeted a cell outside 0..9 or one that is already taken.
    #[display("invalid move")]
    InvalidMove,
    /// Move submitted by a player whose turn it is not.
    #[display("not your turn")]
    NotYourTurn,
    /// Event referenced a session the player is not a participant of.
    #[display("not in session")]
    NotInSession,
    /// Queue join attempted while already waiting.
    #[display("already queued")]
    AlreadyQueued,
    /// Queue join attempted while playing an active session.
    #[display("already in session")]
    AlreadyInSession,
    /// Lookup target does not exist.
    #[display("not found")]
    NotFound,
}
