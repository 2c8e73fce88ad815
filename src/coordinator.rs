//! Event-driven glue between queue, registry, transport, and storage.
//!
//! The coordinator owns the shared structures explicitly (no module-level
//! state): created at process start, torn down at shutdown. Handlers capture
//! snapshots of whatever they need while holding a lock, release it, and
//! only then talk to the transport.

use crate::config::Config;
use crate::error::GameError;
use crate::queue::{MatchQueue, WaitingEntry};
use crate::session::{GameSession, MoveOutcome, SessionRegistry};
use crate::storage::{GameOutcome, ScoreRecord, ScoreStore, StorageError};
use crate::transport::{ClientEvent, ServerEvent, Transport};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Wires the matchmaking queue, session registry, transport, and score
/// store, reacting to client events and timer ticks.
#[derive(Clone)]
pub struct Coordinator {
    queue: MatchQueue,
    registry: SessionRegistry,
    transport: Arc<dyn Transport>,
    store: Arc<dyn ScoreStore>,
    config: Config,
}

impl Coordinator {
    /// Creates a coordinator with fresh queue and registry.
    #[instrument(skip(transport, store))]
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn ScoreStore>, config: Config) -> Self {
        info!("Creating coordinator");
        Self {
            queue: MatchQueue::new(),
            registry: SessionRegistry::new(),
            transport,
            store,
            config,
        }
    }

    /// The matchmaking queue.
    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    /// The session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The score store.
    pub fn store(&self) -> &Arc<dyn ScoreStore> {
        &self.store
    }

    /// Relays a leaderboard query to storage using the configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store rejects the query.
    pub fn leaderboard(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        self.store.leaderboard(self.config.leaderboard_limit)
    }

    /// Relays a profile query to storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store rejects the query.
    pub fn profile(&self, identity: &str) -> Result<Option<ScoreRecord>, StorageError> {
        self.store.profile(identity)
    }

    /// Dispatches one inbound client event.
    #[instrument(skip(self, event))]
    pub fn handle(&self, event: ClientEvent) {
        match event {
            ClientEvent::Connect {
                identity,
                connection,
            } => self.on_connect(&identity, &connection),
            ClientEvent::JoinQueue {
                identity,
                connection,
            } => self.on_join_queue(&identity, &connection),
            ClientEvent::MakeMove {
                identity,
                session_id,
                position,
            } => self.on_make_move(&identity, &session_id, position),
            ClientEvent::Disconnect { identity } => self.on_disconnect(&identity),
        }
    }

    /// Handles a fresh connection for an authenticated identity.
    ///
    /// A queued identity is reinstated with the new connection and a reset
    /// timestamp; anything else is no implicit action.
    #[instrument(skip(self, connection))]
    fn on_connect(&self, identity: &str, connection: &str) {
        if self.queue.reinstate(identity, connection) {
            let snapshot = self.queue.snapshot();
            self.transport.send(
                &connection.to_owned(),
                &ServerEvent::QueueJoined {
                    message: format!("Rejoined queue as {identity}"),
                },
            );
            self.transport.broadcast(&ServerEvent::QueueUpdated {
                waiting_players: snapshot,
            });
        } else {
            debug!(identity, "Connect without queue entry, nothing to do");
        }
    }

    /// Handles a join-queue request, then drains all possible pairings.
    #[instrument(skip(self, connection))]
    fn on_join_queue(&self, identity: &str, connection: &str) {
        if self.registry.lookup_by_player(identity).is_some() {
            debug!(identity, reason = %GameError::AlreadyInSession, "Join rejected");
            return;
        }
        if !self.queue.join(identity, connection) {
            debug!(identity, reason = %GameError::AlreadyQueued, "Join rejected");
            return;
        }

        let snapshot = self.queue.snapshot();
        self.transport.send(
            &connection.to_owned(),
            &ServerEvent::QueueJoined {
                message: format!("Joined queue as {identity}"),
            },
        );
        self.transport.broadcast(&ServerEvent::QueueUpdated {
            waiting_players: snapshot,
        });

        while let Some((first, second)) = self.queue.try_pair_one() {
            self.start_session(first, second);
        }
    }

    /// Registers a session for a freshly drawn pair and notifies both
    /// players.
    #[instrument(skip(self, first, second), fields(player1 = %first.identity, player2 = %second.identity))]
    fn start_session(&self, first: WaitingEntry, second: WaitingEntry) {
        let session = GameSession::create(
            first.identity.clone(),
            first.connection.clone(),
            second.identity.clone(),
            second.connection.clone(),
        );
        let opening_turn = session.current_turn().clone();
        let session_id = self.registry.register(session);
        let snapshot = self.queue.snapshot();

        self.transport.send(
            &first.connection,
            &ServerEvent::GameStart {
                session_id: session_id.clone(),
                opponent: second.identity.clone(),
                your_turn: first.identity == opening_turn,
            },
        );
        self.transport.send(
            &second.connection,
            &ServerEvent::GameStart {
                session_id,
                opponent: first.identity,
                your_turn: second.identity == opening_turn,
            },
        );
        self.transport.broadcast(&ServerEvent::QueueUpdated {
            waiting_players: snapshot,
        });
    }

    /// Handles a move submission.
    ///
    /// Absent sessions, non-participants, and rejected moves are silently
    /// ignored: no state change and no broadcast.
    #[instrument(skip(self))]
    fn on_make_move(&self, identity: &str, session_id: &str, position: usize) {
        let Some(slot) = self.registry.lookup(session_id) else {
            debug!(identity, session_id, reason = %GameError::NotFound, "Move ignored");
            return;
        };

        // Hold the session lock for the full submit so move acceptance order
        // equals arrival order; capture connections for the sends after.
        let result = {
            let mut session = slot.lock().unwrap();
            if !session.is_participant(identity) {
                debug!(identity, session_id, "Move by non-participant ignored");
                return;
            }
            session.submit_move(identity, position).map(|outcome| {
                debug!(session_id, board = %session.board().display(), "Board after move");
                (outcome, session.connections().clone())
            })
        };

        let (outcome, connections) = match result {
            Ok(captured) => captured,
            Err(err) => {
                debug!(identity, session_id, position, %err, "Move rejected");
                return;
            }
        };

        let move_made = ServerEvent::MoveMade {
            position,
            player: identity.to_owned(),
        };
        self.send_to_session(&connections, &move_made);

        match outcome {
            MoveOutcome::Ongoing { next_turn } => {
                self.send_to_session(&connections, &ServerEvent::NextTurn { player: next_turn });
            }
            MoveOutcome::Won {
                winner,
                loser,
                line,
            } => {
                self.send_to_session(&connections, &ServerEvent::won(&winner, line));
                self.record_outcome(&winner, GameOutcome::Win);
                self.record_outcome(&loser, GameOutcome::Loss);
                self.finish_recording();
                self.registry.remove(session_id);
            }
            MoveOutcome::Draw => {
                self.send_to_session(&connections, &ServerEvent::draw());
                let (player1, player2) = {
                    let session = slot.lock().unwrap();
                    session.players().clone()
                };
                self.record_outcome(&player1, GameOutcome::Draw);
                self.record_outcome(&player2, GameOutcome::Draw);
                self.finish_recording();
                self.registry.remove(session_id);
            }
        }
    }

    /// Handles a dropped connection: leave the queue or abandon the session.
    ///
    /// Safe to race with an explicit leave and safe to receive twice:
    /// whichever signal arrives second observes "already absent" and does
    /// nothing further.
    #[instrument(skip(self))]
    fn on_disconnect(&self, identity: &str) {
        if self.queue.leave(identity).is_some() {
            self.transport.broadcast(&ServerEvent::QueueLeft {
                message: format!("{identity} left the queue"),
            });
            return;
        }

        let Some(session_id) = self.registry.lookup_by_player(identity) else {
            debug!(identity, "Disconnect with no queue entry or session");
            return;
        };
        let Some(slot) = self.registry.lookup(&session_id) else {
            return;
        };

        let abandoned = {
            let mut session = slot.lock().unwrap();
            session
                .abandon(identity)
                .map(|outcome| (outcome, session.connections().clone()))
        };

        self.registry.remove(&session_id);

        if let Some((outcome, connections)) = abandoned {
            self.send_to_session(&connections, &ServerEvent::won_by_disconnect(&outcome.winner));
            self.record_outcome(&outcome.winner, GameOutcome::Win);
            self.record_outcome(&outcome.loser, GameOutcome::Loss);
            self.finish_recording();
        }
    }

    /// Handles one eviction tick: drop stale queue entries and announce each.
    #[instrument(skip(self))]
    pub fn handle_tick(&self) {
        let evicted = self
            .queue
            .evict_expired(Instant::now(), self.config.queue_ttl());
        for identity in evicted {
            self.transport.broadcast(&ServerEvent::QueueLeft {
                message: format!("{identity} removed from queue due to inactivity"),
            });
        }
    }

    /// Spawns the periodic eviction task.
    ///
    /// The task acquires the queue lock only, never a session lock, and
    /// stops when the shutdown channel fires or its sender drops.
    #[instrument(skip(self, shutdown))]
    pub fn spawn_eviction_timer(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let coordinator = self.clone();
        let tick = self.config.eviction_tick();
        info!(tick_secs = tick.as_secs(), "Starting eviction timer");
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // First tick of tokio's interval fires immediately; skip it so
            // the initial eviction happens one full tick after startup.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => coordinator.handle_tick(),
                    _ = shutdown.changed() => {
                        info!("Eviction timer shutting down");
                        break;
                    }
                }
            }
        })
    }

    fn send_to_session(&self, connections: &(String, String), event: &ServerEvent) {
        self.transport.send(&connections.0, event);
        self.transport.send(&connections.1, event);
    }

    fn record_outcome(&self, identity: &str, outcome: GameOutcome) {
        if let Err(err) = self.store.record_result(identity, outcome) {
            error!(identity, %err, "Failed to record game result");
        }
    }

    fn finish_recording(&self) {
        if let Err(err) = self.store.recompute_rankings() {
            warn!(%err, "Failed to recompute rankings");
        }
    }
}
