//! Turns a decided game into wallet mutations and outcome records.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};
use wagerboard_protocol::{Amount, RoomId, UserId};

use crate::{
    Notifier, Outcome, OutcomeLog, OutcomeRecord, SettlementError, StoreError, WalletStore,
};

/// One seated player, as far as money is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub user_id: UserId,
    pub name: String,
    pub stake: Amount,
    pub push_token: Option<String>,
}

/// Everything needed to settle one decided game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRequest {
    pub room_id: RoomId,
    pub winner: Party,
    /// Empty for a default win by disconnect.
    pub losers: Vec<Party>,
    /// The pool: every seated stake at game start.
    pub total_bet: Amount,
}

/// What a successful settlement did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub room_id: RoomId,
    pub winner: UserId,
    pub credited: Amount,
    pub losers_recorded: usize,
    pub notifications_failed: usize,
}

/// Stake reservation failed; every stake already taken was given back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stake reservation failed for {}: {reason}", user_display(.user_id))]
pub struct ReservationError {
    /// The party whose debit failed, when one did.
    pub user_id: Option<UserId>,
    pub reason: String,
}

fn user_display(user_id: &Option<UserId>) -> &str {
    user_id.as_ref().map_or("<room>", UserId::as_str)
}

/// Drives the wallet store, outcome log and notifier for one engine.
///
/// Cheap to clone; rooms hold it and spawn settlement tasks with a clone.
#[derive(Clone)]
pub struct SettlementCoordinator {
    wallets: Arc<dyn WalletStore>,
    outcomes: Arc<dyn OutcomeLog>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for SettlementCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementCoordinator").finish_non_exhaustive()
    }
}

impl SettlementCoordinator {
    pub fn new(
        wallets: Arc<dyn WalletStore>,
        outcomes: Arc<dyn OutcomeLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            wallets,
            outcomes,
            notifier,
        }
    }

    /// Credits the pool to the winner and records the outcome.
    ///
    /// Runs at most once per room; the room guarantees that by claiming
    /// its terminal state before calling.
    ///
    /// # Errors
    /// - [`SettlementError::WinnerNotFound`] when the winner has no wallet.
    ///   Nothing is mutated.
    /// - [`SettlementError::Payout`] when the credit fails. Nothing is
    ///   mutated.
    /// - [`SettlementError::Record`] when an outcome record fails after the
    ///   payout already landed.
    pub async fn settle(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementReceipt, SettlementError> {
        let SettlementRequest {
            room_id,
            winner,
            losers,
            total_bet,
        } = request;

        if self.wallets.get_wallet(&winner.user_id).await?.is_none() {
            error!(room_id = %room_id, user_id = %winner.user_id, "winner not found, settlement skipped");
            return Err(SettlementError::WinnerNotFound {
                room_id,
                winner: winner.user_id,
            });
        }

        self.wallets
            .credit_payout(&winner.user_id, total_bet)
            .await
            .map_err(|source| SettlementError::Payout {
                winner: winner.user_id.clone(),
                source,
            })?;
        info!(room_id = %room_id, user_id = %winner.user_id, amount = %total_bet, "pool credited to winner");

        let record = OutcomeRecord::new(
            room_id.clone(),
            winner.user_id.clone(),
            Outcome::Won,
            total_bet,
        );
        self.outcomes
            .record_winner(&record)
            .await
            .map_err(|source| SettlementError::Record {
                user_id: winner.user_id.clone(),
                source,
            })?;

        for loser in &losers {
            let record = OutcomeRecord::new(
                room_id.clone(),
                loser.user_id.clone(),
                Outcome::Lost,
                total_bet,
            );
            self.outcomes
                .record_loser(&record)
                .await
                .map_err(|source| SettlementError::Record {
                    user_id: loser.user_id.clone(),
                    source,
                })?;
        }

        let mut notifications_failed = 0;
        if let Some(token) = &winner.push_token {
            let body = format!("You won {total_bet}!");
            if self
                .push(token, "Congratulations!", &body, &room_id, total_bet)
                .await
                .is_err()
            {
                notifications_failed += 1;
            }
        }
        for loser in &losers {
            let Some(token) = &loser.push_token else {
                continue;
            };
            let body = format!("{} won the game.", winner.name);
            if self
                .push(token, "Game over", &body, &room_id, total_bet)
                .await
                .is_err()
            {
                notifications_failed += 1;
            }
        }

        Ok(SettlementReceipt {
            room_id,
            winner: winner.user_id,
            credited: total_bet,
            losers_recorded: losers.len(),
            notifications_failed,
        })
    }

    async fn push(
        &self,
        token: &str,
        title: &str,
        body: &str,
        room_id: &RoomId,
        total_bet: Amount,
    ) -> Result<(), StoreError> {
        let data = json!({ "roomId": room_id, "totalBet": total_bet });
        self.notifier
            .notify(token, title, body, data)
            .await
            .inspect_err(|e| warn!(room_id = %room_id, error = %e, "push notification failed"))
    }

    /// Debits every party's stake from their balance.
    ///
    /// All or nothing: on the first failure every stake already debited is
    /// refunded before the error is returned.
    pub async fn reserve_stakes(
        &self,
        room_id: &RoomId,
        parties: &[Party],
    ) -> Result<(), ReservationError> {
        for (done, party) in parties.iter().enumerate() {
            if let Err(e) = self.wallets.debit_balance(&party.user_id, party.stake).await {
                warn!(room_id = %room_id, user_id = %party.user_id, error = %e, "stake reservation failed");
                self.refund_stakes(room_id, &parties[..done]).await;
                let reason = match e {
                    StoreError::InsufficientFunds(_) => "Insufficient balance".to_owned(),
                    StoreError::NotFound(_) => "User not found".to_owned(),
                    other => other.to_string(),
                };
                return Err(ReservationError {
                    user_id: Some(party.user_id.clone()),
                    reason,
                });
            }
        }
        info!(room_id = %room_id, parties = parties.len(), "stakes reserved");
        Ok(())
    }

    /// Gives reserved stakes back. Failures are logged and skipped.
    pub async fn refund_stakes(&self, room_id: &RoomId, parties: &[Party]) {
        for party in parties {
            if let Err(e) = self.wallets.refund_balance(&party.user_id, party.stake).await {
                error!(room_id = %room_id, user_id = %party.user_id, error = %e, "stake refund failed");
            }
        }
    }
}
