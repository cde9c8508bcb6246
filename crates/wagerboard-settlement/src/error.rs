//! Error types for the settlement layer.

use wagerboard_protocol::{AmountError, RoomId, UserId};

/// Failures reported by an external store adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No wallet exists for this user.
    #[error("wallet for user {0} not found")]
    NotFound(UserId),

    /// A debit would take the balance below zero.
    #[error("insufficient funds for user {0}")]
    InsufficientFunds(UserId),

    /// Balance arithmetic overflowed.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The backing store failed (network, database, lock poisoning...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Why a settlement did not complete.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    /// The winner has no wallet record. Nothing was mutated.
    #[error("winner {winner} of room {room_id} not found")]
    WinnerNotFound { room_id: RoomId, winner: UserId },

    /// The payout credit failed. Nothing was mutated.
    #[error("payout to {winner} failed: {source}")]
    Payout {
        winner: UserId,
        #[source]
        source: StoreError,
    },

    /// The payout landed but an outcome record could not be written.
    #[error("outcome record for {user_id} failed: {source}")]
    Record {
        user_id: UserId,
        #[source]
        source: StoreError,
    },

    /// A store call failed before anything was mutated.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SettlementError {
    /// Whether the settlement failed before any money moved, so stakes
    /// held for the game can still be returned.
    pub fn nothing_credited(&self) -> bool {
        matches!(
            self,
            Self::WinnerNotFound { .. } | Self::Payout { .. } | Self::Store(_)
        )
    }
}
