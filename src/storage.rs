//! Score records, rankings, and the storage collaborator interface.

use crate::session::PlayerId;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument};

/// Storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Storage error: {} at {}:{}", message, file, line)]
pub struct StorageError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl StorageError {
    /// Creates a new storage error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Game outcome from one player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    /// Player won the game.
    Win,
    /// Player lost the game.
    Loss,
    /// Game ended in a draw.
    Draw,
}

impl GameOutcome {
    /// Cumulative score awarded for the outcome.
    pub fn score_delta(self) -> u64 {
        match self {
            Self::Win => 3,
            Self::Draw => 1,
            Self::Loss => 0,
        }
    }
}

/// Durable per-identity cumulative record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ScoreRecord {
    identity: PlayerId,
    score: u64,
    games_played: u64,
    rank: u64,
}

impl ScoreRecord {
    fn new(identity: PlayerId) -> Self {
        Self {
            identity,
            score: 0,
            games_played: 0,
            rank: 0,
        }
    }
}

/// Synchronous storage interface consumed by the coordinator.
///
/// Failures are infrastructural: the coordinator logs them and drops the
/// triggering event without touching queue or session state.
pub trait ScoreStore: Send + Sync {
    /// Records one finished game for the identity, creating the record on
    /// first sight. Increments games played; score moves by the outcome's
    /// delta (+3 win, +1 draw, 0 loss).
    fn record_result(&self, identity: &str, outcome: GameOutcome) -> Result<(), StorageError>;

    /// Rebuilds the full ranking order: stable sort by score descending,
    /// sequential 1-based ranks. Runs after every recorded result.
    fn recompute_rankings(&self) -> Result<(), StorageError>;

    /// Top records in rank order, at most `limit`.
    fn leaderboard(&self, limit: usize) -> Result<Vec<ScoreRecord>, StorageError>;

    /// The identity's record, if it has played at least one game.
    fn profile(&self, identity: &str) -> Result<Option<ScoreRecord>, StorageError>;
}

/// In-memory score store.
///
/// Records live in ranking order behind an `RwLock`, so leaderboard and
/// profile reads always observe a complete snapshot while a recompute or a
/// result write holds the write lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    records: Arc<RwLock<Vec<ScoreRecord>>>,
}

impl MemoryScoreStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    #[instrument(skip(self))]
    fn record_result(&self, identity: &str, outcome: GameOutcome) -> Result<(), StorageError> {
        let mut records = self.records.write().unwrap();
        let index = match records.iter().position(|r| r.identity == identity) {
            Some(index) => index,
            None => {
                records.push(ScoreRecord::new(identity.to_owned()));
                records.len() - 1
            }
        };
        let record = &mut records[index];
        record.games_played += 1;
        record.score += outcome.score_delta();
        info!(
            identity,
            ?outcome,
            score = record.score,
            games_played = record.games_played,
            "Game result recorded"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    fn recompute_rankings(&self) -> Result<(), StorageError> {
        let mut records = self.records.write().unwrap();
        // Stable sort keeps prior order for equal scores, which is the
        // documented tie-break.
        records.sort_by(|a, b| b.score.cmp(&a.score));
        for (index, record) in records.iter_mut().enumerate() {
            record.rank = index as u64 + 1;
        }
        debug!(count = records.len(), "Rankings recomputed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn leaderboard(&self, limit: usize) -> Result<Vec<ScoreRecord>, StorageError> {
        let records = self.records.read().unwrap();
        Ok(records.iter().take(limit).cloned().collect())
    }

    #[instrument(skip(self))]
    fn profile(&self, identity: &str) -> Result<Option<ScoreRecord>, StorageError> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|r| r.identity == identity).cloned())
    }
}
