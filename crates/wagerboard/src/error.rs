//! Unified error type for Wagerboard.

use wagerboard_protocol::ProtocolError;
use wagerboard_room::RoomError;
use wagerboard_settlement::SettlementError;
use wagerboard_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WagerboardError {
    /// Binding, accepting, or a broken connection.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame that could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room that vanished or refused a command.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A payout that could not be completed.
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use wagerboard_protocol::{RoomId, UserId};
    use wagerboard_room::MoveRejection;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Handshake("bad upgrade".into());
        let err: WagerboardError = err.into();
        assert!(matches!(err, WagerboardError::Transport(_)));
        assert!(err.to_string().contains("bad upgrade"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: WagerboardError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, WagerboardError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err: WagerboardError = RoomError::from(MoveRejection::NotYourTurn).into();
        assert!(matches!(err, WagerboardError::Room(_)));
        assert_eq!(err.to_string(), "Not your turn");
    }

    #[test]
    fn test_from_settlement_error() {
        let err: WagerboardError = SettlementError::WinnerNotFound {
            room_id: RoomId::new("r1"),
            winner: UserId::new("u1"),
        }
        .into();
        assert!(matches!(err, WagerboardError::Settlement(_)));
    }
}
