//! Per-room turn deadline supervisor for Wagerboard.
//!
//! Every room owns one [`TurnSupervisor`]. Whenever a turn begins the room
//! arms it; whenever a move is accepted (or the room becomes terminal) the
//! room cancels it. If the active player stays idle past the deadline, the
//! supervisor drops a [`TurnExpired`] into the room's own command inbox, so
//! the forced turn advance is handled by the same serialized loop as moves
//! and disconnects.
//!
//! # Generations
//!
//! Cancellation is best-effort: a sleeper may already have pushed its
//! expiry into the inbox when the room accepts a move. Each arm therefore
//! carries a generation number, and [`TurnSupervisor::accept`] only
//! honours the expiry belonging to the current arm. Anything else is a
//! stale no-op.
//!
//! ```ignore
//! // inside the room actor
//! RoomCommand::TurnExpired(expired) => {
//!     if !self.turns.accept(expired) {
//!         return; // a move won the race
//!     }
//!     self.advance_turn();
//!     self.turns.arm(&self.inbox_tx, RoomCommand::TurnExpired);
//! }
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the turn supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnConfig {
    /// How long the active player has before the turn is forced onward.
    pub deadline: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(3),
        }
    }
}

impl TurnConfig {
    /// Shortest deadline accepted. Anything lower would let the timer
    /// starve clients on ordinary network latency.
    pub const MIN_DEADLINE: Duration = Duration::from_millis(50);

    /// Longest deadline accepted.
    pub const MAX_DEADLINE: Duration = Duration::from_secs(600);

    /// Create a config with a specific deadline.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Clamp the deadline into `MIN_DEADLINE..=MAX_DEADLINE`.
    ///
    /// Called automatically by [`TurnSupervisor::new`].
    pub fn validated(mut self) -> Self {
        let clamped = self.deadline.clamp(Self::MIN_DEADLINE, Self::MAX_DEADLINE);
        if clamped != self.deadline {
            warn!(
                requested_ms = self.deadline.as_millis() as u64,
                clamped_ms = clamped.as_millis() as u64,
                "turn deadline out of range, clamping"
            );
            self.deadline = clamped;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Expiry notice
// ---------------------------------------------------------------------------

/// Delivered into the room inbox when a turn deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnExpired {
    /// The arm this expiry belongs to.
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Counters for one supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnMetrics {
    /// Times a deadline was armed.
    pub total_armed: u64,
    /// Expiries accepted (forced turn advances).
    pub total_expired: u64,
    /// Expiries that arrived after their arm was cancelled or replaced.
    pub total_stale: u64,
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// One cancellable turn deadline.
///
/// Not `Sync`-shared: the room actor owns it and is the only caller.
#[derive(Debug)]
pub struct TurnSupervisor {
    config: TurnConfig,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    metrics: TurnMetrics,
}

impl TurnSupervisor {
    /// Create a disarmed supervisor.
    pub fn new(config: TurnConfig) -> Self {
        let config = config.validated();
        debug!(
            deadline_ms = config.deadline.as_millis() as u64,
            "turn supervisor created"
        );
        Self {
            config,
            generation: 0,
            pending: None,
            metrics: TurnMetrics::default(),
        }
    }

    /// Start a fresh deadline, replacing any pending one.
    ///
    /// When it passes, `wrap(TurnExpired { generation })` is sent into
    /// `inbox`. If the inbox is closed by then (room torn down) the expiry
    /// is silently dropped. Must be called from within a Tokio runtime.
    ///
    /// Returns the generation of the new arm.
    pub fn arm<C, F>(&mut self, inbox: &mpsc::Sender<C>, wrap: F) -> u64
    where
        C: Send + 'static,
        F: FnOnce(TurnExpired) -> C + Send + 'static,
    {
        self.cancel();

        let generation = self.generation;
        let deadline = self.config.deadline;
        let inbox = inbox.clone();

        self.pending = Some(tokio::spawn(async move {
            time::sleep(deadline).await;
            if inbox.send(wrap(TurnExpired { generation })).await.is_err() {
                trace!(generation, "inbox closed, dropping turn expiry");
            }
        }));
        self.metrics.total_armed += 1;

        trace!(generation, "turn deadline armed");
        generation
    }

    /// Cancel the pending deadline, if any.
    ///
    /// Also invalidates an expiry that was already dispatched but not yet
    /// handled. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Decide whether a delivered expiry is still current.
    ///
    /// Returns `true` exactly once per arm, for the expiry it produced.
    /// The supervisor is disarmed afterwards; the caller re-arms.
    pub fn accept(&mut self, expired: TurnExpired) -> bool {
        if expired.generation == self.generation && self.pending.is_some() {
            self.pending = None;
            self.metrics.total_expired += 1;
            true
        } else {
            self.metrics.total_stale += 1;
            debug!(
                generation = expired.generation,
                current = self.generation,
                "stale turn expiry discarded"
            );
            false
        }
    }

    /// Whether a deadline is currently pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// The generation of the latest arm (or cancel).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The configured deadline.
    pub fn deadline(&self) -> Duration {
        self.config.deadline
    }

    /// Snapshot of the counters.
    pub fn metrics(&self) -> &TurnMetrics {
        &self.metrics
    }
}

impl Drop for TurnSupervisor {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadline_is_three_seconds() {
        assert_eq!(TurnConfig::default().deadline, Duration::from_secs(3));
    }

    #[test]
    fn test_validated_clamps_short_deadline() {
        let cfg = TurnConfig::with_deadline(Duration::from_millis(1)).validated();
        assert_eq!(cfg.deadline, TurnConfig::MIN_DEADLINE);
    }

    #[test]
    fn test_validated_clamps_long_deadline() {
        let cfg = TurnConfig::with_deadline(Duration::from_secs(86_400)).validated();
        assert_eq!(cfg.deadline, TurnConfig::MAX_DEADLINE);
    }

    #[test]
    fn test_validated_keeps_in_range_deadline() {
        let cfg = TurnConfig::with_deadline(Duration::from_secs(5)).validated();
        assert_eq!(cfg.deadline, Duration::from_secs(5));
    }

    #[test]
    fn test_new_supervisor_is_disarmed() {
        let s = TurnSupervisor::new(TurnConfig::default());
        assert!(!s.is_armed());
        assert_eq!(s.metrics(), &TurnMetrics::default());
    }

    #[test]
    fn test_accept_without_arm_is_stale() {
        let mut s = TurnSupervisor::new(TurnConfig::default());
        let generation = s.generation();
        assert!(!s.accept(TurnExpired { generation }));
        assert_eq!(s.metrics().total_stale, 1);
    }
}
