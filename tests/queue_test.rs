//! Tests for matchmaking queue membership, pairing, and eviction.

use gridmatch::MatchQueue;
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[test]
fn test_join_is_idempotent_for_queued_identity() {
    let queue = MatchQueue::new();
    assert!(queue.join("alice", "conn-1"));
    assert!(!queue.join("alice", "conn-2"));
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_join_then_leave_is_net_noop() {
    let queue = MatchQueue::new();
    assert!(queue.join("alice", "conn-1"));
    let entry = queue.leave("alice").expect("entry should exist");
    assert_eq!(entry.identity, "alice");
    assert_eq!(entry.connection, "conn-1");
    assert!(queue.is_empty());
    assert!(queue.leave("alice").is_none());
}

#[test]
fn test_snapshot_preserves_membership_order() {
    let queue = MatchQueue::new();
    queue.join("alice", "c1");
    queue.join("bob", "c2");
    queue.join("carol", "c3");
    assert_eq!(queue.snapshot(), vec!["alice", "bob", "carol"]);

    queue.leave("bob");
    assert_eq!(queue.snapshot(), vec!["alice", "carol"]);
}

#[test]
fn test_pairing_partitions_even_waiting_set() {
    let queue = MatchQueue::new();
    let players = ["p1", "p2", "p3", "p4", "p5", "p6"];
    for player in players {
        queue.join(player, "conn");
    }

    let mut seen = HashSet::new();
    let mut pairs = 0;
    while let Some((first, second)) = queue.try_pair_one() {
        assert_ne!(first.identity, second.identity);
        assert!(seen.insert(first.identity), "identity paired twice");
        assert!(seen.insert(second.identity), "identity paired twice");
        pairs += 1;
    }

    assert_eq!(pairs, 3);
    assert_eq!(seen.len(), players.len());
    assert!(queue.is_empty());
}

#[test]
fn test_pairing_odd_waiting_set_leaves_one() {
    let queue = MatchQueue::new();
    for player in ["p1", "p2", "p3", "p4", "p5"] {
        queue.join(player, "conn");
    }

    let mut paired = 0;
    while queue.try_pair_one().is_some() {
        paired += 2;
    }
    assert_eq!(paired, 4);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_pairing_requires_two_players() {
    let queue = MatchQueue::new();
    assert!(queue.try_pair_one().is_none());
    queue.join("alice", "conn");
    assert!(queue.try_pair_one().is_none());
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_eviction_respects_ttl_boundary() {
    let queue = MatchQueue::new();
    queue.join("alice", "conn");
    let ttl = Duration::from_secs(300);

    let before_expiry = Instant::now() + Duration::from_secs(299);
    assert!(queue.evict_expired(before_expiry, ttl).is_empty());
    assert!(queue.contains("alice"));

    let after_expiry = Instant::now() + Duration::from_secs(301);
    assert_eq!(queue.evict_expired(after_expiry, ttl), vec!["alice"]);
    assert!(queue.is_empty());
}

#[test]
fn test_eviction_only_removes_expired_entries() {
    let queue = MatchQueue::new();
    queue.join("old", "conn-1");
    std::thread::sleep(Duration::from_millis(60));
    queue.join("fresh", "conn-2");

    let evicted = queue.evict_expired(Instant::now(), Duration::from_millis(50));
    assert_eq!(evicted, vec!["old"]);
    assert_eq!(queue.snapshot(), vec!["fresh"]);
}

#[test]
fn test_reinstate_resets_eviction_clock() {
    let queue = MatchQueue::new();
    queue.join("alice", "conn-1");
    queue.join("bob", "conn-2");
    std::thread::sleep(Duration::from_millis(60));

    // Both entries are past the ttl; only the reinstated one survives.
    assert!(queue.reinstate("alice", "conn-3"));
    assert!(!queue.reinstate("carol", "conn-4"));
    let evicted = queue.evict_expired(Instant::now(), Duration::from_millis(50));
    assert_eq!(evicted, vec!["bob"]);
    assert_eq!(queue.snapshot(), vec!["alice"]);

    let entry = queue.leave("alice").expect("entry should exist");
    assert_eq!(entry.connection, "conn-3");
}
