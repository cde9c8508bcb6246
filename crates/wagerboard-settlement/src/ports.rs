//! The external collaborators the engine settles through.
//!
//! All three traits are `async_trait` object-safe so the server can hold
//! them as `Arc<dyn …>` and swap a database-backed wallet for the
//! in-memory one without touching room code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wagerboard_protocol::{Amount, RoomId, UserId};

use crate::StoreError;

/// A user's money as the wallet store reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Spendable balance. Stakes are reserved from here.
    pub balance: Amount,
    /// Winnings credited by settlement.
    pub payout_balance: Amount,
}

/// Whether a persisted record describes a win or a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
}

/// One persisted game outcome for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub outcome: Outcome,
    /// The whole pool of the game, not this user's stake.
    pub total_bet: Amount,
    pub recorded_at: DateTime<Utc>,
}

impl OutcomeRecord {
    pub fn new(room_id: RoomId, user_id: UserId, outcome: Outcome, total_bet: Amount) -> Self {
        Self {
            room_id,
            user_id,
            outcome,
            total_bet,
            recorded_at: Utc::now(),
        }
    }
}

/// Balances keyed by user id.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// `Ok(None)` when the user has no wallet.
    async fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>, StoreError>;

    /// Adds `amount` to the user's payout balance.
    async fn credit_payout(&self, user_id: &UserId, amount: Amount) -> Result<(), StoreError>;

    /// Takes `amount` out of the spendable balance.
    ///
    /// # Errors
    /// `StoreError::InsufficientFunds` when the balance is too low; the
    /// balance is left untouched in that case.
    async fn debit_balance(&self, user_id: &UserId, amount: Amount) -> Result<(), StoreError>;

    /// Gives a previously debited `amount` back.
    async fn refund_balance(&self, user_id: &UserId, amount: Amount) -> Result<(), StoreError>;
}

/// Durable winner / loser history.
#[async_trait]
pub trait OutcomeLog: Send + Sync {
    async fn record_winner(&self, record: &OutcomeRecord) -> Result<(), StoreError>;
    async fn record_loser(&self, record: &OutcomeRecord) -> Result<(), StoreError>;
}

/// Push notification delivery. Failures never affect game state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<(), StoreError>;
}
