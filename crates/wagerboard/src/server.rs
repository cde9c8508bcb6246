//! `WagerServer` builder and accept loop.
//!
//! This is the entry point for running a Wagerboard server. It ties
//! together all the layers: transport → protocol → gateway → rooms →
//! settlement.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use wagerboard_protocol::JsonCodec;
use wagerboard_room::{RoomConfig, RoomRegistry};
use wagerboard_settlement::{
    InMemoryOutcomeLog, InMemoryWalletStore, NoopNotifier, Notifier, OutcomeLog,
    SettlementCoordinator, WalletStore,
};
use wagerboard_transport::{Transport, WebSocketTransport};

use crate::gateway::SessionGateway;
use crate::handler::handle_connection;
use crate::WagerboardError;

/// How long a connection may stay silent before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) gateway: SessionGateway,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Wagerboard server.
///
/// Any settlement port left unset falls back to its in-memory adapter.
/// The default wallet store provisions no wallets, so a production
/// deployment always passes its own.
///
/// # Example
///
/// ```rust,ignore
/// use wagerboard::prelude::*;
///
/// let server = WagerServer::builder()
///     .bind("0.0.0.0:5005")
///     .wallet_store(Arc::new(InMemoryWalletStore::with_opening_balance(Amount(1_000))))
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct WagerServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Duration,
    wallets: Option<Arc<dyn WalletStore>>,
    outcomes: Option<Arc<dyn OutcomeLog>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl WagerServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:5005".to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            wallets: None,
            outcomes: None,
            notifier: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every new room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn wallet_store(mut self, wallets: Arc<dyn WalletStore>) -> Self {
        self.wallets = Some(wallets);
        self
    }

    pub fn outcome_log(mut self, outcomes: Arc<dyn OutcomeLog>) -> Self {
        self.outcomes = Some(outcomes);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Binds the listener and wires the registry to the settlement ports.
    pub async fn build(self) -> Result<WagerServer, WagerboardError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let settlement = SettlementCoordinator::new(
            self.wallets
                .unwrap_or_else(|| Arc::new(InMemoryWalletStore::new())),
            self.outcomes
                .unwrap_or_else(|| Arc::new(InMemoryOutcomeLog::new())),
            self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier)),
        );
        let registry = Arc::new(RoomRegistry::new(self.room_config, settlement));

        let state = Arc::new(ServerState {
            gateway: SessionGateway::new(registry),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(WagerServer {
            transport,
            state,
            stop: Arc::new(Notify::new()),
        })
    }
}

impl Default for WagerServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stops a running [`WagerServer`] from another task.
#[derive(Clone)]
pub struct ShutdownHandle {
    stop: Arc<Notify>,
}

impl ShutdownHandle {
    /// Asks the accept loop to stop. The loop then drains every room,
    /// refunding reserved stakes of unfinished games, and `run` returns.
    pub fn shutdown(&self) {
        self.stop.notify_one();
    }
}

/// A bound Wagerboard server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WagerServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
    stop: Arc<Notify>,
}

impl WagerServer {
    /// Creates a new builder.
    pub fn builder() -> WagerServerBuilder {
        WagerServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, WagerboardError> {
        Ok(self.transport.local_addr()?)
    }

    pub fn gateway(&self) -> &SessionGateway {
        &self.state.gateway
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(self.state.gateway.registry())
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Runs the accept loop until [`ShutdownHandle::shutdown`] is called.
    ///
    /// Each accepted connection gets its own handler task.
    pub async fn run(mut self) -> Result<(), WagerboardError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "wagerboard server running");

        loop {
            tokio::select! {
                _ = self.stop.notified() => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
            }
        }

        tracing::info!("wagerboard server stopping");
        self.state.gateway.registry().shutdown().await;
        Ok(())
    }
}
