//! Inbound and outbound wire events.
//!
//! Both directions use the same "adjacently tagged" JSON shape:
//!
//! ```text
//! { "event": "makeMove", "data": { "roomId": "…", "index": 5 } }
//! ```
//!
//! Event names and field names are camelCase to match what browser and
//! mobile clients already send. Every outbound event has exactly one
//! payload shape, whatever the room's seat count or board size.

use serde::{Deserialize, Serialize};

use crate::{Amount, RoomId, Symbol, UserId};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// A request to be seated.
///
/// Every field defaults when absent so that a request with missing
/// fields still decodes and can be answered with `invalidJoin` instead
/// of being dropped as garbage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expo_push_token: Option<String>,
    /// Join this specific room instead of matchmaking by stake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
}

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[serde(rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Find or create a room with a matching stake and take a seat.
    JoinRoom(JoinRoom),

    /// Place the sender's symbol on `index`.
    MakeMove { room_id: RoomId, index: usize },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// One seated player as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub name: String,
    pub user_id: UserId,
    /// 1-based seat number.
    pub seat: usize,
    pub symbol: Symbol,
    pub amount: Amount,
}

/// Sent to the winner of a decided game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerScreen {
    pub room_id: RoomId,
    pub winner_name: String,
    pub total_bet: Amount,
    pub message: String,
}

/// Sent to every other seat of a decided game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoserScreen {
    pub room_id: RoomId,
    pub winner_name: String,
    pub total_bet: Amount,
    pub message: String,
}

/// The closed set of events the engine publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[serde(rename_all_fields = "camelCase")]
pub enum ServerEvent {
    // -- Join rejections (to the requester only) --
    InvalidJoin { reason: String },
    RoomFull { reason: String },
    InvalidBet { reason: String },

    // -- Room membership --
    PlayerJoined { name: String, room_id: RoomId },
    PlayersUpdate { players: Vec<PlayerSummary> },
    GameReady {
        players: Vec<PlayerSummary>,
        room_id: RoomId,
        amount: Amount,
    },
    PlayerLeft { message: String, room_id: RoomId },

    // -- Turn and board --
    /// `current_player` is an index into the seated list.
    TurnChange {
        current_player: usize,
        user_id: UserId,
    },
    MoveMade {
        index: usize,
        symbol: Symbol,
        player_name: String,
        board: Vec<Option<Symbol>>,
    },
    InvalidMove { reason: String },

    // -- Outcomes --
    GameOver { winner_symbol: Symbol, result: String },
    WinnerScreen(WinnerScreen),
    LoserScreen(LoserScreen),
    GameDraw { result: String },
    NewGame { starting_player: usize },
}

impl ServerEvent {
    /// The wire name of this event (the `event` tag).
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidJoin { .. } => "invalidJoin",
            Self::RoomFull { .. } => "roomFull",
            Self::InvalidBet { .. } => "invalidBet",
            Self::PlayerJoined { .. } => "playerJoined",
            Self::PlayersUpdate { .. } => "playersUpdate",
            Self::GameReady { .. } => "gameReady",
            Self::PlayerLeft { .. } => "playerLeft",
            Self::TurnChange { .. } => "turnChange",
            Self::MoveMade { .. } => "moveMade",
            Self::InvalidMove { .. } => "invalidMove",
            Self::GameOver { .. } => "gameOver",
            Self::WinnerScreen(_) => "winnerScreen",
            Self::LoserScreen(_) => "loserScreen",
            Self::GameDraw { .. } => "gameDraw",
            Self::NewGame { .. } => "newGame",
        }
    }
}
