//! Wager settlement for Wagerboard.
//!
//! The engine never touches money directly. It talks to three ports:
//!
//! - [`WalletStore`]: balances and payout balances per user
//! - [`OutcomeLog`]: persisted winner / loser records
//! - [`Notifier`]: best-effort push notifications
//!
//! The [`SettlementCoordinator`] drives them: it reserves stakes when a
//! room fills and, once a game is decided, credits the pool to the
//! winner and writes the outcome records. Exactly-once is the caller's
//! job: a room claims its terminal state before it asks for settlement.
//!
//! In-memory adapters ([`InMemoryWalletStore`], [`InMemoryOutcomeLog`],
//! [`RecordingNotifier`], [`NoopNotifier`]) back the tests and the demo
//! server.

mod coordinator;
mod error;
mod memory;
mod ports;

pub use coordinator::{
    Party, ReservationError, SettlementCoordinator, SettlementReceipt, SettlementRequest,
};
pub use error::{SettlementError, StoreError};
pub use memory::{InMemoryOutcomeLog, InMemoryWalletStore, NoopNotifier, RecordingNotifier, SentNotification};
pub use ports::{Notifier, Outcome, OutcomeLog, OutcomeRecord, Wallet, WalletStore};
