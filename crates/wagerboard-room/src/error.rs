//! Error types for the room layer.

use wagerboard_protocol::{Amount, ChannelId, RoomId, ServerEvent};

/// Errors from the board model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The cell already holds a symbol.
    #[error("cell {index} is already occupied")]
    IllegalMove { index: usize },

    /// The index is past the end of the board.
    #[error("cell {index} is outside a board of {len} cells")]
    OutOfRange { index: usize, len: usize },
}

/// Why a join request was turned down.
///
/// The `Display` text is the reason sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinRejection {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Room is already full. Create a new room.")]
    RoomFull,

    #[error("Bet amount {offered} does not match the room stake of {expected}")]
    StakeMismatch { expected: Amount, offered: Amount },

    #[error("Already seated in a room")]
    AlreadySeated,

    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Server is shutting down")]
    ShuttingDown,
}

impl JoinRejection {
    /// The event the requester receives.
    pub fn to_event(&self) -> ServerEvent {
        let reason = self.to_string();
        match self {
            Self::RoomFull => ServerEvent::RoomFull { reason },
            Self::StakeMismatch { .. } => ServerEvent::InvalidBet { reason },
            _ => ServerEvent::InvalidJoin { reason },
        }
    }
}

/// Why a move was turned down. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    /// No game is running or fewer than two players are seated.
    #[error("Invalid game state or not enough players")]
    NotEnoughPlayers,

    #[error("Invalid cell")]
    InvalidCell,

    #[error("Cell already occupied")]
    CellOccupied,

    #[error("Not your turn")]
    NotYourTurn,
}

impl MoveRejection {
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::InvalidMove {
            reason: self.to_string(),
        }
    }
}

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room's inbox is closed (the room was torn down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The channel is not seated anywhere.
    #[error("channel {0} is not in a room")]
    NotSeated(ChannelId),

    #[error(transparent)]
    Join(#[from] JoinRejection),

    #[error(transparent)]
    Move(#[from] MoveRejection),
}
