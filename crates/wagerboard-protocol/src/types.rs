//! Core value types shared by every Wagerboard layer.
//!
//! Identity types are "newtype wrappers": a `RoomId` and a `UserId` are
//! both strings underneath, but the compiler will not let you pass one
//! where the other is expected.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The wallet-store identity of a player.
///
/// Opaque to the engine: whatever the user store uses as a primary key.
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a user id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty id (a missing join field).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for a room (one isolated game session).
///
/// Generated by the room registry; clients echo it back with every move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Creates a room id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one client session channel.
///
/// The gateway owns the channel itself; rooms only ever hold this id and
/// a clone of the channel's outbound sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// Errors from checked amount arithmetic.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount overflow")]
    Overflow,
    #[error("amount underflow")]
    Underflow,
}

/// A wager or balance amount in whole currency units.
///
/// Stakes must match exactly for two players to share a room, so this is
/// an integer type; there is no rounding anywhere in the engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, AmountError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, AmountError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(AmountError::Underflow)
    }

    /// Sums a sequence of amounts, failing on overflow.
    pub fn checked_sum<I>(amounts: I) -> Result<Self, AmountError>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, a| acc.checked_add(a))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// A board marker. Assigned positionally by seat and never shared within
/// a room: seat 1 plays `X`, seat 2 plays `O`, seat 3 plays `Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
    Y,
}

impl Symbol {
    /// All symbols in seat order.
    pub const ALL: [Symbol; 3] = [Symbol::X, Symbol::O, Symbol::Y];

    /// Returns the symbol for a zero-based seat index, if one exists.
    pub fn for_seat(seat_index: usize) -> Option<Self> {
        Self::ALL.get(seat_index).copied()
    }

    pub fn as_char(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
            Self::Y => 'Y',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound event is addressed to.
///
/// Room logic produces `(Recipient, ServerEvent)` pairs; the room actor
/// resolves them against its seated channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every seated channel in the room.
    All,

    /// One channel.
    Channel(ChannelId),

    /// Every seated channel except this one.
    AllExcept(ChannelId),
}

impl Recipient {
    /// Returns `true` if an event for this recipient reaches `channel`.
    pub fn includes(&self, channel: ChannelId) -> bool {
        match self {
            Self::All => true,
            Self::Channel(c) => *c == channel,
            Self::AllExcept(c) => *c != channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&RoomId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        let json = serde_json::to_string(&UserId::new("u-1")).unwrap();
        assert_eq!(json, "\"u-1\"");
    }

    #[test]
    fn test_channel_id_display() {
        assert_eq!(ChannelId(7).to_string(), "ch-7");
    }

    #[test]
    fn test_amount_checked_sum() {
        let total = Amount::checked_sum([Amount(100), Amount(100), Amount(50)]).unwrap();
        assert_eq!(total, Amount(250));
        assert_eq!(
            Amount::checked_sum([Amount(u64::MAX), Amount(1)]),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_amount_checked_sub_underflow() {
        assert_eq!(Amount(5).checked_sub(Amount(6)), Err(AmountError::Underflow));
        assert_eq!(Amount(6).checked_sub(Amount(5)), Ok(Amount(1)));
    }

    #[test]
    fn test_amount_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Amount(100)).unwrap(), "100");
    }

    #[test]
    fn test_symbol_for_seat_is_positional() {
        assert_eq!(Symbol::for_seat(0), Some(Symbol::X));
        assert_eq!(Symbol::for_seat(1), Some(Symbol::O));
        assert_eq!(Symbol::for_seat(2), Some(Symbol::Y));
        assert_eq!(Symbol::for_seat(3), None);
    }

    #[test]
    fn test_symbol_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Symbol::X).unwrap(), "\"X\"");
        assert_eq!(Symbol::O.to_string(), "O");
    }

    #[test]
    fn test_recipient_includes() {
        let a = ChannelId(1);
        let b = ChannelId(2);
        assert!(Recipient::All.includes(a));
        assert!(Recipient::Channel(a).includes(a));
        assert!(!Recipient::Channel(a).includes(b));
        assert!(!Recipient::AllExcept(a).includes(a));
        assert!(Recipient::AllExcept(a).includes(b));
    }
}
