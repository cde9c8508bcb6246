//! Settlement against custom port implementations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use wagerboard_protocol::{Amount, RoomId, UserId};
use wagerboard_settlement::{
    InMemoryOutcomeLog, InMemoryWalletStore, Notifier, NoopNotifier, OutcomeLog, OutcomeRecord,
    Party, SettlementCoordinator, SettlementError, SettlementRequest, StoreError, Wallet,
};

/// Fails every push and counts the attempts.
#[derive(Default)]
struct BrokenNotifier {
    attempts: AtomicUsize,
}

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn notify(
        &self,
        _token: &str,
        _title: &str,
        _body: &str,
        _data: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("push service down".into()))
    }
}

/// Rejects loser records.
struct WinnersOnlyLog;

#[async_trait]
impl OutcomeLog for WinnersOnlyLog {
    async fn record_winner(&self, _record: &OutcomeRecord) -> Result<(), StoreError> {
        Ok(())
    }

    async fn record_loser(&self, _record: &OutcomeRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("loser table locked".into()))
    }
}

fn party(id: &str) -> Party {
    Party {
        user_id: UserId::new(id),
        name: id.to_owned(),
        stake: Amount(100),
        push_token: Some(format!("ExponentPushToken[{id}]")),
    }
}

fn request(winner: &str, losers: &[&str]) -> SettlementRequest {
    SettlementRequest {
        room_id: RoomId::new("room-1"),
        winner: party(winner),
        losers: losers.iter().map(|id| party(id)).collect(),
        total_bet: Amount(100 * (losers.len() as u64 + 1)),
    }
}

fn wallets(ids: &[&str]) -> Arc<InMemoryWalletStore> {
    let store = Arc::new(InMemoryWalletStore::new());
    for id in ids {
        store.insert(*id, Wallet::default());
    }
    store
}

#[tokio::test]
async fn test_notification_failures_do_not_fail_settlement() {
    let store = wallets(&["a", "b", "c"]);
    let notifier = Arc::new(BrokenNotifier::default());
    let coordinator = SettlementCoordinator::new(
        store.clone(),
        Arc::new(InMemoryOutcomeLog::new()),
        notifier.clone(),
    );

    let receipt = coordinator.settle(request("a", &["b", "c"])).await.unwrap();

    assert_eq!(receipt.credited, Amount(300));
    assert_eq!(receipt.notifications_failed, 3);
    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(
        store.wallet(&UserId::new("a")).unwrap().payout_balance,
        Amount(300)
    );
}

#[tokio::test]
async fn test_failed_loser_record_is_reported_after_payout() {
    let store = wallets(&["a", "b"]);
    let coordinator =
        SettlementCoordinator::new(store.clone(), Arc::new(WinnersOnlyLog), Arc::new(NoopNotifier));

    let err = coordinator.settle(request("a", &["b"])).await.unwrap_err();

    match err {
        SettlementError::Record { user_id, .. } => assert_eq!(user_id, UserId::new("b")),
        other => panic!("expected Record error, got {other:?}"),
    }
    assert_eq!(
        store.wallet(&UserId::new("a")).unwrap().payout_balance,
        Amount(200)
    );
}

#[tokio::test]
async fn test_auto_provisioned_wallets_settle() {
    let store = Arc::new(InMemoryWalletStore::with_opening_balance(Amount(1_000)));
    let coordinator = SettlementCoordinator::new(
        store.clone(),
        Arc::new(InMemoryOutcomeLog::new()),
        Arc::new(NoopNotifier),
    );
    let parties = [party("a"), party("b")];
    let room = RoomId::new("room-1");

    coordinator.reserve_stakes(&room, &parties).await.unwrap();
    coordinator.settle(request("a", &["b"])).await.unwrap();

    let a = store.wallet(&UserId::new("a")).unwrap();
    assert_eq!(a.balance, Amount(900));
    assert_eq!(a.payout_balance, Amount(200));
    assert_eq!(store.wallet(&UserId::new("b")).unwrap().balance, Amount(900));
}
