//! Room configuration and state machine.

use serde::{Deserialize, Serialize};
use tracing::warn;
use wagerboard_turn::TurnConfig;

use crate::BoardSize;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a registry creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// 3×3 or 4×4.
    pub board: BoardSize,

    /// Seats per room. Rooms start their game as soon as every seat is
    /// taken. Either 2 or 3.
    pub capacity: usize,

    /// Turn deadline settings.
    pub turn: TurnConfig,

    /// Debit every stake from the players' balances when the room fills.
    /// When off, money only moves at settlement.
    pub reserve_stakes: bool,

    /// Bound of each room's command inbox.
    pub inbox_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            board: BoardSize::Four,
            capacity: 2,
            turn: TurnConfig::default(),
            reserve_stakes: true,
            inbox_size: 64,
        }
    }
}

impl RoomConfig {
    pub const MIN_CAPACITY: usize = 2;
    pub const MAX_CAPACITY: usize = 3;

    pub fn with_board(mut self, board: BoardSize) -> Self {
        self.board = board;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_turn(mut self, turn: TurnConfig) -> Self {
        self.turn = turn;
        self
    }

    pub fn with_reserve_stakes(mut self, reserve: bool) -> Self {
        self.reserve_stakes = reserve;
        self
    }

    /// Clamp out-of-range values, warning about each one.
    pub fn validated(mut self) -> Self {
        let capacity = self.capacity.clamp(Self::MIN_CAPACITY, Self::MAX_CAPACITY);
        if capacity != self.capacity {
            warn!(
                requested = self.capacity,
                clamped = capacity,
                "room capacity out of range, clamping"
            );
            self.capacity = capacity;
        }
        if self.inbox_size == 0 {
            warn!("room inbox size 0, using 1");
            self.inbox_size = 1;
        }
        self.turn = self.turn.validated();
        self
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// Open → Starting → InProgress → Finished → Destroying
/// ```
///
/// - **Open**: accepting joins until every seat is taken.
/// - **Starting**: full, waiting for the stake reservation to land. Falls
///   back to `Open` if the reservation fails or someone leaves.
/// - **InProgress**: moves are accepted. A draw resets the board without
///   leaving this state.
/// - **Finished**: the game is decided and settlement is running. This is
///   the terminal flag: nothing settles a room twice.
/// - **Destroying**: torn down. Reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomState {
    Open,
    Starting,
    InProgress,
    Finished,
    Destroying,
}

impl RoomState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if a game is starting or running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::InProgress)
    }

    /// Returns `true` once the outcome has been claimed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Destroying)
    }

    /// The happy-path successor.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Open => Some(Self::Starting),
            Self::Starting => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => Some(Self::Destroying),
            Self::Destroying => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    ///
    /// Beyond [`next`](Self::next): `Open → InProgress` when reservation
    /// is off, `Starting → Open` when it fails, and teardown from anywhere.
    pub fn can_transition_to(self, target: Self) -> bool {
        if self.next() == Some(target) {
            return true;
        }
        match (self, target) {
            (Self::Destroying, _) => false,
            (_, Self::Destroying) => true,
            (Self::Open, Self::InProgress) => true,
            (Self::Starting, Self::Open) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Starting => write!(f, "Starting"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
            Self::Destroying => write!(f, "Destroying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_room_state_next_follows_happy_path() {
        assert_eq!(RoomState::Open.next(), Some(RoomState::Starting));
        assert_eq!(RoomState::Starting.next(), Some(RoomState::InProgress));
        assert_eq!(RoomState::InProgress.next(), Some(RoomState::Finished));
        assert_eq!(RoomState::Finished.next(), Some(RoomState::Destroying));
        assert_eq!(RoomState::Destroying.next(), None);
    }

    #[test]
    fn test_room_state_can_transition_to() {
        assert!(RoomState::Open.can_transition_to(RoomState::InProgress));
        assert!(RoomState::Starting.can_transition_to(RoomState::Open));
        assert!(RoomState::InProgress.can_transition_to(RoomState::Destroying));
        assert!(!RoomState::Finished.can_transition_to(RoomState::InProgress));
        assert!(!RoomState::InProgress.can_transition_to(RoomState::Open));
        assert!(!RoomState::Destroying.can_transition_to(RoomState::Destroying));
    }

    #[test]
    fn test_room_state_predicates() {
        assert!(RoomState::Open.is_joinable());
        assert!(!RoomState::Starting.is_joinable());
        assert!(RoomState::Starting.is_active());
        assert!(RoomState::InProgress.is_active());
        assert!(!RoomState::Finished.is_active());
        assert!(RoomState::Finished.is_terminal());
        assert!(!RoomState::InProgress.is_terminal());
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::Open.to_string(), "Open");
        assert_eq!(RoomState::InProgress.to_string(), "InProgress");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.board, BoardSize::Four);
        assert_eq!(config.capacity, 2);
        assert_eq!(config.turn.deadline, Duration::from_secs(3));
        assert!(config.reserve_stakes);
    }

    #[test]
    fn test_validated_clamps_capacity() {
        assert_eq!(RoomConfig::default().with_capacity(1).validated().capacity, 2);
        assert_eq!(RoomConfig::default().with_capacity(8).validated().capacity, 3);
        assert_eq!(RoomConfig::default().with_capacity(3).validated().capacity, 3);
    }

    #[test]
    fn test_validated_fixes_zero_inbox() {
        let config = RoomConfig {
            inbox_size: 0,
            ..RoomConfig::default()
        };
        assert_eq!(config.validated().inbox_size, 1);
    }
}
