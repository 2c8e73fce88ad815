//! Tests for the in-memory score store and ranking recompute.

use gridmatch::{GameOutcome, MemoryScoreStore, ScoreStore, StorageError};

#[test]
fn test_score_deltas_per_outcome() {
    let store = MemoryScoreStore::new();
    store
        .record_result("alice", GameOutcome::Win)
        .expect("record failed");
    store
        .record_result("bob", GameOutcome::Loss)
        .expect("record failed");
    store
        .record_result("carol", GameOutcome::Draw)
        .expect("record failed");

    let alice = store.profile("alice").expect("query failed").expect("missing");
    assert_eq!(*alice.score(), 3);
    assert_eq!(*alice.games_played(), 1);

    let bob = store.profile("bob").expect("query failed").expect("missing");
    assert_eq!(*bob.score(), 0);
    assert_eq!(*bob.games_played(), 1);

    let carol = store.profile("carol").expect("query failed").expect("missing");
    assert_eq!(*carol.score(), 1);
    assert_eq!(*carol.games_played(), 1);
}

#[test]
fn test_results_accumulate() {
    let store = MemoryScoreStore::new();
    for outcome in [GameOutcome::Win, GameOutcome::Win, GameOutcome::Draw] {
        store
            .record_result("alice", outcome)
            .expect("record failed");
    }
    let alice = store.profile("alice").expect("query failed").expect("missing");
    assert_eq!(*alice.score(), 7);
    assert_eq!(*alice.games_played(), 3);
}

#[test]
fn test_recompute_assigns_sequential_ranks_by_score() {
    let store = MemoryScoreStore::new();
    store
        .record_result("low", GameOutcome::Draw)
        .expect("record failed");
    store
        .record_result("high", GameOutcome::Win)
        .expect("record failed");
    store
        .record_result("mid", GameOutcome::Win)
        .expect("record failed");
    store
        .record_result("high", GameOutcome::Win)
        .expect("record failed");
    store.recompute_rankings().expect("recompute failed");

    let leaderboard = store.leaderboard(10).expect("query failed");
    let order: Vec<_> = leaderboard.iter().map(|r| r.identity().as_str()).collect();
    assert_eq!(order, vec!["high", "mid", "low"]);
    let ranks: Vec<_> = leaderboard.iter().map(|r| *r.rank()).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn test_ties_keep_stable_prior_order() {
    let store = MemoryScoreStore::new();
    store
        .record_result("first", GameOutcome::Win)
        .expect("record failed");
    store
        .record_result("second", GameOutcome::Win)
        .expect("record failed");
    store.recompute_rankings().expect("recompute failed");

    let leaderboard = store.leaderboard(10).expect("query failed");
    assert_eq!(leaderboard[0].identity().as_str(), "first");
    assert_eq!(*leaderboard[0].rank(), 1);
    assert_eq!(leaderboard[1].identity().as_str(), "second");
    assert_eq!(*leaderboard[1].rank(), 2);
}

#[test]
fn test_leaderboard_honors_limit() {
    let store = MemoryScoreStore::new();
    for identity in ["a", "b", "c", "d", "e"] {
        store
            .record_result(identity, GameOutcome::Win)
            .expect("record failed");
    }
    store.recompute_rankings().expect("recompute failed");
    assert_eq!(store.leaderboard(3).expect("query failed").len(), 3);
    assert_eq!(store.leaderboard(10).expect("query failed").len(), 5);
}

#[test]
fn test_profile_absent_for_unknown_identity() {
    let store = MemoryScoreStore::new();
    assert!(store.profile("nobody").expect("query failed").is_none());
}

#[test]
fn test_storage_error_captures_caller_location() {
    // Fallible store implementations construct this; the display output
    // carries the construction site.
    let err = StorageError::new("connection refused");
    let rendered = err.to_string();
    assert!(rendered.contains("connection refused"));
    assert!(rendered.contains("storage_test.rs"));
    assert!(err.line > 0);
}
