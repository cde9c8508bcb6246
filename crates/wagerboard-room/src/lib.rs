//! Boards, room actors, and stake matchmaking for Wagerboard.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! board, seats, turn deadline, and wager pool.
//!
//! # Key types
//!
//! - [`Board`]: cells plus win/draw detection for 3×3 and 4×4 boards
//! - [`RoomRegistry`]: finds or creates rooms by stake, routes by channel
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomConfig`]: board size, seat count, turn deadline, reservation

mod board;
mod config;
mod error;
mod player;
mod registry;
mod room;

pub use board::{Board, BoardSize, Outcome};
pub use config::{RoomConfig, RoomState};
pub use error::{BoardError, JoinRejection, MoveRejection, RoomError};
pub use player::{EventSender, JoinAccepted, JoinRequest, JoinTarget};
pub use registry::RoomRegistry;
pub use room::{RoomHandle, RoomInfo};
