//! Wire protocol for Wagerboard.
//!
//! This crate defines the vocabulary shared by every other layer:
//!
//! - **Types** ([`RoomId`], [`UserId`], [`ChannelId`], [`Amount`],
//!   [`Symbol`], [`Recipient`]): identities and values that flow through
//!   rooms, settlement, and the gateway.
//! - **Events** ([`ClientMessage`], [`ServerEvent`]): the closed sets of
//!   inbound and outbound messages. One variant per event name, fixed
//!   fields per variant.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events are turned
//!   into bytes for the transport.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage / ServerEvent) → Gateway → Rooms
//! ```

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientMessage, JoinRoom, LoserScreen, PlayerSummary, ServerEvent, WinnerScreen};
pub use types::{Amount, AmountError, ChannelId, Recipient, RoomId, Symbol, UserId};
