//! Codec trait and implementations for turning wire events into bytes.
//!
//! The gateway and server never call `serde_json` directly; they go
//! through a [`Codec`], so swapping the wire format touches one type.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task on the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Clients speak JSON text frames, so this is the only codec the server
/// ships with. It sits behind the `json` feature (on by default).
///
/// ## Example
///
/// ```rust
/// use wagerboard_protocol::{ClientMessage, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let msg = ClientMessage::MakeMove { room_id: RoomId::new("r1"), index: 4 };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ServerEvent, Symbol};

    #[test]
    fn test_encode_produces_json_text() {
        let bytes = JsonCodec
            .encode(&ServerEvent::NewGame { starting_player: 1 })
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"event":"newGame","data":{"startingPlayer":1}}"#);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result: Result<ServerEvent, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_server_event() {
        let raw = br#"{"event":"gameOver","data":{"winnerSymbol":"X","result":"Ada wins!"}}"#;
        let event: ServerEvent = JsonCodec.decode(raw).unwrap();
        assert_eq!(
            event,
            ServerEvent::GameOver {
                winner_symbol: Symbol::X,
                result: "Ada wins!".into()
            }
        );
    }
}
