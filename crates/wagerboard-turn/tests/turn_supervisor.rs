//! Integration tests for the turn supervisor.
//!
//! Uses `start_paused = true` so deadlines resolve as soon as the runtime
//! is idle and the tests never wait on a wall clock.

use std::time::Duration;

use tokio::sync::mpsc;
use wagerboard_turn::{TurnConfig, TurnExpired, TurnSupervisor};

// =========================================================================
// Helpers
// =========================================================================

/// Stand-in for a room command enum.
#[derive(Debug, PartialEq)]
enum Cmd {
    Expired(TurnExpired),
}

fn one_second() -> TurnSupervisor {
    TurnSupervisor::new(TurnConfig::with_deadline(Duration::from_secs(1)))
}

// =========================================================================
// Delivery
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_expiry_delivered_after_deadline() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut s = one_second();

    let generation = s.arm(&tx, Cmd::Expired);
    assert!(s.is_armed());

    let cmd = rx.recv().await.unwrap();
    assert_eq!(cmd, Cmd::Expired(TurnExpired { generation }));
}

#[tokio::test(start_paused = true)]
async fn test_expiry_not_delivered_before_deadline() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut s = one_second();
    s.arm(&tx, Cmd::Expired);

    let early = tokio::time::timeout(Duration::from_millis(900), rx.recv()).await;
    assert!(early.is_err(), "deadline should not fire early");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_delivery() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut s = one_second();
    s.arm(&tx, Cmd::Expired);
    s.cancel();
    assert!(!s.is_armed());

    let result = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(result.is_err(), "cancelled deadline should never fire");
}

#[tokio::test(start_paused = true)]
async fn test_closed_inbox_drops_expiry_quietly() {
    let (tx, rx) = mpsc::channel::<Cmd>(8);
    let mut s = one_second();
    s.arm(&tx, Cmd::Expired);
    drop(rx);

    // Let the sleeper wake and hit the closed inbox.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(s.is_armed(), "nothing was accepted");
}

// =========================================================================
// Generations
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_accept_current_generation_once() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut s = one_second();
    s.arm(&tx, Cmd::Expired);

    let Cmd::Expired(expired) = rx.recv().await.unwrap();
    assert!(s.accept(expired));
    assert!(!s.is_armed());
    // A duplicate of the same expiry is stale.
    assert!(!s.accept(expired));

    let m = s.metrics();
    assert_eq!(m.total_armed, 1);
    assert_eq!(m.total_expired, 1);
    assert_eq!(m.total_stale, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispatched_expiry_is_stale_after_cancel() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut s = one_second();
    s.arm(&tx, Cmd::Expired);

    // The sleeper has already pushed its expiry...
    let Cmd::Expired(expired) = rx.recv().await.unwrap();
    // ...but a move is accepted before the room reads it.
    s.cancel();

    assert!(!s.accept(expired));
}

#[tokio::test(start_paused = true)]
async fn test_rearm_invalidates_previous_generation() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut s = one_second();

    let first = s.arm(&tx, Cmd::Expired);
    let second = s.arm(&tx, Cmd::Expired);
    assert_ne!(first, second);

    assert!(!s.accept(TurnExpired { generation: first }));

    let Cmd::Expired(expired) = rx.recv().await.unwrap();
    assert_eq!(expired.generation, second);
    assert!(s.accept(expired));
}

#[tokio::test(start_paused = true)]
async fn test_rearm_after_accept_fires_again() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut s = one_second();

    for _ in 0..3 {
        s.arm(&tx, Cmd::Expired);
        let Cmd::Expired(expired) = rx.recv().await.unwrap();
        assert!(s.accept(expired));
    }
    assert_eq!(s.metrics().total_expired, 3);
}

#[tokio::test(start_paused = true)]
async fn test_drop_aborts_pending_deadline() {
    let (tx, mut rx) = mpsc::channel(8);
    {
        let mut s = one_second();
        s.arm(&tx, Cmd::Expired);
    }

    let result = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(result.is_err(), "dropped supervisor should not fire");
}
