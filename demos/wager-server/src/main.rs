use std::sync::Arc;

use wagerboard::prelude::*;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const DEFAULT_BIND: &str = "0.0.0.0:5005";
const DEFAULT_OPENING_BALANCE: u64 = 1_000;

/// Settings read from `WAGERBOARD_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
struct DemoConfig {
    bind: String,
    opening_balance: Amount,
    room: RoomConfig,
}

impl DemoConfig {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to the default with a warning.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind = lookup("WAGERBOARD_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let opening_balance = Amount(parse_or(
            &lookup,
            "WAGERBOARD_OPENING_BALANCE",
            DEFAULT_OPENING_BALANCE,
        ));

        let mut room = RoomConfig::default();
        match parse_or(&lookup, "WAGERBOARD_BOARD_CELLS", 16usize) {
            9 => room = room.with_board(BoardSize::Three),
            16 => {}
            other => tracing::warn!(cells = other, "unsupported board size, using 16"),
        }
        let seats = parse_or(&lookup, "WAGERBOARD_SEATS", room.capacity);
        room = room.with_capacity(seats);

        Self {
            bind,
            opening_balance,
            room,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            default
        }),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    wagerboard::init_tracing();

    let config = DemoConfig::from_env();
    tracing::info!(
        bind = %config.bind,
        opening_balance = %config.opening_balance,
        cells = config.room.board.cells(),
        seats = config.room.capacity,
        "starting wager server"
    );

    let server = WagerServer::builder()
        .bind(&config.bind)
        .room_config(config.room)
        .wallet_store(Arc::new(InMemoryWalletStore::with_opening_balance(
            config.opening_balance,
        )))
        .outcome_log(Arc::new(InMemoryOutcomeLog::new()))
        .notifier(Arc::new(NoopNotifier))
        .build()
        .await?;

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received");
            shutdown.shutdown();
        }
    });

    server.run().await?;
    Ok(())
}
