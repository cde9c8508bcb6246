//! Join requests and seated players.

use tokio::sync::mpsc;
use wagerboard_protocol::{
    Amount, ChannelId, JoinRoom, PlayerSummary, RoomId, ServerEvent, Symbol, UserId,
};
use wagerboard_settlement::Party;

use crate::JoinRejection;

/// Outbound event channel of one session. The gateway owns the receiving
/// end; rooms only hold clones of this sender.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Where a join request wants to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    /// Any open room with the same stake, or a new one.
    Stake,
    /// This room only.
    Room(RoomId),
}

impl From<Option<RoomId>> for JoinTarget {
    fn from(room_id: Option<RoomId>) -> Self {
        room_id.map_or(Self::Stake, Self::Room)
    }
}

/// Who wants a seat, and for how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub name: String,
    pub user_id: UserId,
    pub stake: Amount,
    pub push_token: Option<String>,
}

impl JoinRequest {
    /// Name, user id, and a non-zero stake are all required.
    pub fn validate(&self) -> Result<(), JoinRejection> {
        if self.name.trim().is_empty() || self.user_id.is_empty() || self.stake.is_zero() {
            return Err(JoinRejection::MissingFields);
        }
        Ok(())
    }
}

impl From<JoinRoom> for JoinRequest {
    fn from(join: JoinRoom) -> Self {
        Self {
            name: join.player_name,
            user_id: join.user_id,
            stake: join.amount,
            push_token: join.expo_push_token.filter(|t| !t.is_empty()),
        }
    }
}

/// A successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAccepted {
    pub room_id: RoomId,
    /// 1-based.
    pub seat: usize,
    pub symbol: Symbol,
}

/// A seated player. Immutable once seated.
#[derive(Debug, Clone)]
pub(crate) struct Player {
    pub user_id: UserId,
    pub name: String,
    pub seat: usize,
    pub symbol: Symbol,
    pub channel: ChannelId,
    pub sender: EventSender,
    pub stake: Amount,
    pub push_token: Option<String>,
}

impl Player {
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.name.clone(),
            user_id: self.user_id.clone(),
            seat: self.seat,
            symbol: self.symbol,
            amount: self.stake,
        }
    }

    pub fn party(&self) -> Party {
        Party {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            stake: self.stake,
            push_token: self.push_token.clone(),
        }
    }

    /// Drops the event if the session is already gone.
    pub fn send(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
