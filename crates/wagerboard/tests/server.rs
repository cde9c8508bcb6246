//! Integration tests for the server, handler, and full connection flow.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;
use wagerboard::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

struct Running {
    addr: String,
    wallets: Arc<InMemoryWalletStore>,
    outcomes: Arc<InMemoryOutcomeLog>,
    registry: Arc<RoomRegistry>,
    shutdown: ShutdownHandle,
    task: tokio::task::JoinHandle<Result<(), WagerboardError>>,
}

/// Starts a server on a random port with funded in-memory wallets.
async fn start_server() -> Running {
    let wallets = Arc::new(InMemoryWalletStore::with_opening_balance(Amount(1_000)));
    let outcomes = Arc::new(InMemoryOutcomeLog::new());
    let server = WagerServer::builder()
        .bind("127.0.0.1:0")
        .wallet_store(wallets.clone())
        .outcome_log(outcomes.clone())
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    let registry = server.registry();
    let shutdown = server.shutdown_handle();

    let task = tokio::spawn(server.run());

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    Running {
        addr,
        wallets,
        outcomes,
        registry,
        shutdown,
        task,
    }
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

async fn join(ws: &mut ClientWs, name: &str, user: &str, amount: u64) {
    send(
        ws,
        json!({
            "event": "joinRoom",
            "data": { "playerName": name, "userId": user, "amount": amount }
        }),
    )
    .await;
}

async fn make_move(ws: &mut ClientWs, room_id: &str, index: usize) {
    send(
        ws,
        json!({ "event": "makeMove", "data": { "roomId": room_id, "index": index } }),
    )
    .await;
}

/// Reads frames until one carries the event `name`, returning its data.
async fn expect_event(ws: &mut ClientWs, name: &str) -> Value {
    let wait = async {
        loop {
            let msg = ws
                .next()
                .await
                .unwrap_or_else(|| panic!("stream ended waiting for {name}"))
                .expect("recv");
            if !msg.is_text() {
                continue;
            }
            let value: Value = serde_json::from_slice(&msg.into_data()).expect("decode");
            if value["event"] == name {
                return value["data"].clone();
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(3), wait)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {name}"))
}

async fn eventually<F: Fn() -> bool>(condition: F) {
    for _ in 0..300 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_join_with_missing_fields_is_rejected() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send(
        &mut ws,
        json!({ "event": "joinRoom", "data": { "playerName": "Ada" } }),
    )
    .await;

    let data = expect_event(&mut ws, "invalidJoin").await;
    assert_eq!(data["reason"], "Missing required fields");
}

#[tokio::test]
async fn test_invalid_frame_ignored() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    ws.send(Message::Text("not json".into())).await.expect("send");
    send(&mut ws, json!({ "event": "cheat", "data": {} })).await;

    // The connection is still usable after the bad frames.
    make_move(&mut ws, "nope", 0).await;
    let data = expect_event(&mut ws, "invalidMove").await;
    assert_eq!(data["reason"], "Invalid game state or not enough players");
}

#[tokio::test]
async fn test_full_game_over_websocket() {
    let server = start_server().await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;

    join(&mut a, "Ada", "ua", 100).await;
    expect_event(&mut a, "playersUpdate").await;
    join(&mut b, "Bo", "ub", 100).await;

    let ready = expect_event(&mut a, "gameReady").await;
    assert_eq!(ready["amount"], 100);
    assert_eq!(ready["players"].as_array().map(Vec::len), Some(2));
    assert_eq!(ready["players"][0]["symbol"], "X");
    let room_id = ready["roomId"].as_str().expect("room id").to_string();
    expect_event(&mut b, "gameReady").await;

    // Each move waits for its broadcast so the turns stay in order.
    let moves = [(5, true), (6, false), (9, true), (0, false), (13, true)];
    for (index, by_a) in moves {
        if by_a {
            make_move(&mut a, &room_id, index).await;
        } else {
            make_move(&mut b, &room_id, index).await;
        }
        let made = expect_event(&mut b, "moveMade").await;
        assert_eq!(made["index"], index);
    }

    let over = expect_event(&mut b, "gameOver").await;
    assert_eq!(over["winnerSymbol"], "X");
    assert_eq!(over["result"], "Ada wins!");

    let screen = expect_event(&mut a, "winnerScreen").await;
    assert_eq!(screen["totalBet"], 200);
    let screen = expect_event(&mut b, "loserScreen").await;
    assert_eq!(screen["winnerName"], "Ada");

    eventually(|| server.outcomes.records().len() == 2).await;
    let ada = server.wallets.wallet(&UserId::new("ua")).expect("wallet");
    assert_eq!(ada.payout_balance, Amount(200));

    let records = server.outcomes.records();
    assert!(records
        .iter()
        .any(|r| r.user_id == UserId::new("ua") && r.outcome == Outcome::Won));
    assert!(records
        .iter()
        .any(|r| r.user_id == UserId::new("ub") && r.outcome == Outcome::Lost));
}

#[tokio::test]
async fn test_closing_socket_forfeits_the_game() {
    let server = start_server().await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;

    join(&mut a, "Ada", "ua", 100).await;
    join(&mut b, "Bo", "ub", 100).await;
    expect_event(&mut a, "gameReady").await;
    expect_event(&mut b, "gameReady").await;

    a.close(None).await.expect("close");

    let left = expect_event(&mut b, "playerLeft").await;
    assert_eq!(left["message"], "Ada left the game");
    expect_event(&mut b, "winnerScreen").await;

    eventually(|| server.registry.room_count() == 0).await;
    let bo = server.wallets.wallet(&UserId::new("ub")).expect("wallet");
    assert_eq!(bo.payout_balance, Amount(200));
}

#[tokio::test]
async fn test_shutdown_refunds_and_stops() {
    let server = start_server().await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;

    join(&mut a, "Ada", "ua", 100).await;
    join(&mut b, "Bo", "ub", 100).await;
    expect_event(&mut a, "gameReady").await;
    assert_eq!(
        server.wallets.wallet(&UserId::new("ua")).map(|w| w.balance),
        Some(Amount(900))
    );

    server.shutdown.shutdown();
    let result = tokio::time::timeout(Duration::from_secs(3), server.task)
        .await
        .expect("run should return")
        .expect("task should not panic");
    assert!(result.is_ok());

    assert_eq!(server.registry.room_count(), 0);
    let wallets = server.wallets.clone();
    eventually(move || {
        wallets.wallet(&UserId::new("ua")).map(|w| w.balance) == Some(Amount(1_000))
    })
    .await;
    let ada = server.wallets.wallet(&UserId::new("ua")).expect("wallet");
    assert_eq!(ada.payout_balance, Amount::ZERO);
}
