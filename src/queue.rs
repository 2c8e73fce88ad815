//! Matchmaking queue: the concurrent set of players waiting for an opponent.

use crate::session::PlayerId;
use crate::transport::ConnectionId;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// A player's record while queued for matchmaking.
///
/// The connection handle is referenced for addressing outbound messages only;
/// the transport owns the connection itself.
#[derive(Debug, Clone)]
pub struct WaitingEntry {
    /// Identity of the waiting player.
    pub identity: PlayerId,
    /// Connection to notify the player on.
    pub connection: ConnectionId,
    /// When the entry was (re)enqueued.
    pub enqueued_at: Instant,
}

/// Concurrent matchmaking queue with random pairing and ttl eviction.
///
/// Entries are kept in membership order for the `queue_updated` snapshot.
/// All operations take the internal lock, so each is atomic with respect to
/// concurrent joins, leaves, pairings, and eviction ticks.
#[derive(Debug, Clone, Default)]
pub struct MatchQueue {
    entries: Arc<Mutex<Vec<WaitingEntry>>>,
}

impl MatchQueue {
    /// Creates a new empty queue.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identity to the queue.
    ///
    /// Returns `false` without modifying the queue if the identity is
    /// already waiting.
    #[instrument(skip(self, connection))]
    pub fn join(&self, identity: &str, connection: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.identity == identity) {
            debug!(identity, "Identity already queued, join is a no-op");
            return false;
        }
        entries.push(WaitingEntry {
            identity: identity.to_owned(),
            connection: connection.to_owned(),
            enqueued_at: Instant::now(),
        });
        info!(identity, waiting = entries.len(), "Player joined queue");
        true
    }

    /// Replaces an existing entry's connection and resets its timestamp.
    ///
    /// Used when a queued player reconnects: reconnecting counts as
    /// rejoining, so the eviction clock restarts. Returns `false` if the
    /// identity is not queued.
    #[instrument(skip(self, connection))]
    pub fn reinstate(&self, identity: &str, connection: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|e| e.identity == identity) {
            Some(entry) => {
                entry.connection = connection.to_owned();
                entry.enqueued_at = Instant::now();
                info!(identity, "Queue entry reinstated with fresh connection");
                true
            }
            None => false,
        }
    }

    /// Removes and returns the entry for the given identity, if present.
    #[instrument(skip(self))]
    pub fn leave(&self, identity: &str) -> Option<WaitingEntry> {
        let mut entries = self.entries.lock().unwrap();
        let pos = entries.iter().position(|e| e.identity == identity)?;
        let entry = entries.remove(pos);
        info!(identity, waiting = entries.len(), "Player left queue");
        Some(entry)
    }

    /// Removes and returns two entries chosen uniformly at random.
    ///
    /// Returns `None` while fewer than two players wait. Safe to call
    /// repeatedly until it returns `None` to drain all possible pairings.
    #[instrument(skip(self))]
    pub fn try_pair_one(&self) -> Option<(WaitingEntry, WaitingEntry)> {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() < 2 {
            return None;
        }
        let mut rng = rand::thread_rng();
        let first_idx = rng.gen_range(0..entries.len());
        let first = entries.remove(first_idx);
        let second_idx = rng.gen_range(0..entries.len());
        let second = entries.remove(second_idx);
        info!(
            player1 = %first.identity,
            player2 = %second.identity,
            waiting = entries.len(),
            "Paired two players from queue"
        );
        Some((first, second))
    }

    /// Removes every entry that has waited at least `ttl` and returns the
    /// evicted identities.
    #[instrument(skip(self, now))]
    pub fn evict_expired(&self, now: Instant, ttl: Duration) -> Vec<PlayerId> {
        let mut entries = self.entries.lock().unwrap();
        let mut evicted = Vec::new();
        entries.retain(|entry| {
            let expired = now.saturating_duration_since(entry.enqueued_at) >= ttl;
            if expired {
                evicted.push(entry.identity.clone());
            }
            !expired
        });
        if !evicted.is_empty() {
            info!(count = evicted.len(), "Evicted expired queue entries");
        }
        evicted
    }

    /// Returns the waiting identities in membership order.
    pub fn snapshot(&self) -> Vec<PlayerId> {
        let entries = self.entries.lock().unwrap();
        entries.iter().map(|e| e.identity.clone()).collect()
    }

    /// Checks whether the identity is currently queued.
    pub fn contains(&self, identity: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.iter().any(|e| e.identity == identity)
    }

    /// Number of waiting players.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Checks whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
