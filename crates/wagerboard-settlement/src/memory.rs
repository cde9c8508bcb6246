//! In-memory adapters for the settlement ports.
//!
//! Used by the test suites and the demo server. Each adapter keeps its
//! state behind a `std::sync::Mutex`; no lock is ever held across an
//! `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info};
use wagerboard_protocol::{Amount, UserId};

use crate::{Notifier, OutcomeLog, OutcomeRecord, StoreError, Wallet, WalletStore};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable(format!("{what} lock poisoned")))
}

// ---------------------------------------------------------------------------
// Wallets
// ---------------------------------------------------------------------------

/// A wallet store backed by a `HashMap`.
///
/// With [`with_opening_balance`](Self::with_opening_balance), unknown users
/// get a wallet on first touch, which is handy for a demo server where
/// there is no sign-up flow.
#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    wallets: Mutex<HashMap<UserId, Wallet>>,
    opening_balance: Option<Amount>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto-provision unknown users with `balance`.
    pub fn with_opening_balance(balance: Amount) -> Self {
        Self {
            wallets: Mutex::new(HashMap::new()),
            opening_balance: Some(balance),
        }
    }

    /// Insert or overwrite a wallet.
    pub fn insert(&self, user_id: impl Into<String>, wallet: Wallet) {
        if let Ok(mut wallets) = self.wallets.lock() {
            wallets.insert(UserId::new(user_id), wallet);
        }
    }

    /// Current wallet for `user_id`, without auto-provisioning.
    pub fn wallet(&self, user_id: &UserId) -> Option<Wallet> {
        self.wallets.lock().ok()?.get(user_id).copied()
    }

    /// Runs `f` against the user's wallet, provisioning it if allowed.
    fn update<F>(&self, user_id: &UserId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Wallet) -> Result<(), StoreError>,
    {
        let mut wallets = lock(&self.wallets, "wallet")?;
        let wallet = match (wallets.get_mut(user_id), self.opening_balance) {
            (Some(wallet), _) => wallet,
            (None, Some(balance)) => wallets.entry(user_id.clone()).or_insert(Wallet {
                balance,
                payout_balance: Amount::ZERO,
            }),
            (None, None) => return Err(StoreError::NotFound(user_id.clone())),
        };
        // Work on a copy so a failed closure leaves the wallet untouched.
        let mut updated = *wallet;
        f(&mut updated)?;
        *wallet = updated;
        Ok(())
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>, StoreError> {
        let wallets = lock(&self.wallets, "wallet")?;
        Ok(wallets.get(user_id).copied().or_else(|| {
            self.opening_balance.map(|balance| Wallet {
                balance,
                payout_balance: Amount::ZERO,
            })
        }))
    }

    async fn credit_payout(&self, user_id: &UserId, amount: Amount) -> Result<(), StoreError> {
        self.update(user_id, |w| {
            w.payout_balance = w.payout_balance.checked_add(amount)?;
            Ok(())
        })?;
        debug!(user_id = %user_id, %amount, "payout credited");
        Ok(())
    }

    async fn debit_balance(&self, user_id: &UserId, amount: Amount) -> Result<(), StoreError> {
        self.update(user_id, |w| {
            w.balance = w
                .balance
                .checked_sub(amount)
                .map_err(|_| StoreError::InsufficientFunds(user_id.clone()))?;
            Ok(())
        })
    }

    async fn refund_balance(&self, user_id: &UserId, amount: Amount) -> Result<(), StoreError> {
        self.update(user_id, |w| {
            w.balance = w.balance.checked_add(amount)?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Outcome log
// ---------------------------------------------------------------------------

/// Appends outcome records to a `Vec`.
#[derive(Debug, Default)]
pub struct InMemoryOutcomeLog {
    records: Mutex<Vec<OutcomeRecord>>,
}

impl InMemoryOutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record written so far, in order.
    pub fn records(&self) -> Vec<OutcomeRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn push(&self, record: &OutcomeRecord) -> Result<(), StoreError> {
        lock(&self.records, "outcome log")?.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl OutcomeLog for InMemoryOutcomeLog {
    async fn record_winner(&self, record: &OutcomeRecord) -> Result<(), StoreError> {
        self.push(record)
    }

    async fn record_loser(&self, record: &OutcomeRecord) -> Result<(), StoreError> {
        self.push(record)
    }
}

// ---------------------------------------------------------------------------
// Notifiers
// ---------------------------------------------------------------------------

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(
        &self,
        _token: &str,
        _title: &str,
        _body: &str,
        _data: serde_json::Value,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

/// Keeps every notification it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<(), StoreError> {
        info!(token, title, "push notification recorded");
        lock(&self.sent, "notifier")?.push(SentNotification {
            token: token.to_owned(),
            title: title.to_owned(),
            body: body.to_owned(),
            data,
        });
        Ok(())
    }
}
