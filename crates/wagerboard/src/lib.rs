//! # Wagerboard
//!
//! Real-time wager board game server.
//!
//! Players are matched by stake into rooms of two or three seats and
//! take turns on a 3×3 or 4×4 board under a per-turn deadline. When a
//! line is completed, or every opponent disconnects, the whole pool is
//! credited to the winner exactly once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wagerboard::prelude::*;
//!
//! # async fn run() -> Result<(), WagerboardError> {
//! let server = WagerServer::builder()
//!     .bind("0.0.0.0:5005")
//!     .wallet_store(Arc::new(InMemoryWalletStore::with_opening_balance(Amount(1_000))))
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
pub mod gateway;
mod handler;
pub mod server;

pub use error::WagerboardError;

/// Installs the `tracing` subscriber used by server binaries.
///
/// Honours `RUST_LOG`, defaulting to `info`. Calling it twice is harmless.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .compact()
        .try_init();
}

pub mod prelude {
    pub use crate::gateway::SessionGateway;
    pub use crate::server::{ShutdownHandle, WagerServer, WagerServerBuilder};
    pub use crate::WagerboardError;

    pub use wagerboard_protocol::{
        Amount, ChannelId, ClientMessage, Codec, JoinRoom, JsonCodec, ProtocolError, RoomId,
        ServerEvent, Symbol, UserId,
    };
    pub use wagerboard_room::{
        BoardSize, JoinRejection, MoveRejection, RoomConfig, RoomError, RoomInfo,
        RoomRegistry, RoomState,
    };
    pub use wagerboard_settlement::{
        InMemoryOutcomeLog, InMemoryWalletStore, NoopNotifier, Notifier, Outcome,
        OutcomeLog, RecordingNotifier, SettlementCoordinator, Wallet, WalletStore,
    };
    pub use wagerboard_transport::TransportError;
    pub use wagerboard_turn::TurnConfig;
}
