//! Per-connection handler: decode inbound frames, pump outbound events.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Open a gateway channel and spawn a writer for its events
//!   2. Loop: receive frames → decode `ClientMessage` → gateway
//!   3. On close, error, or idle timeout → `on_disconnect`

use std::sync::Arc;

use wagerboard_protocol::{ChannelId, ClientMessage, Codec};
use wagerboard_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::WagerboardError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), WagerboardError> {
    let channel = conn.id();
    tracing::debug!(%channel, peer = %conn.peer_addr(), "handling new connection");

    let conn = Arc::new(conn);
    let mut events = state.gateway.open_channel(channel);

    let writer = {
        let conn = Arc::clone(&conn);
        let codec = state.codec;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let bytes = match codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%channel, event = event.name(), error = %e, "failed to encode event");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%channel, error = %e, "send failed, stopping writer");
                    break;
                }
            }
        })
    };

    let result = read_loop(&conn, &state, channel).await;

    // The seat is freed before the socket goes away, whatever ended the loop.
    state.gateway.on_disconnect(channel).await;
    writer.abort();
    let _ = conn.close().await;

    result
}

async fn read_loop(
    conn: &WebSocketConnection,
    state: &ServerState,
    channel: ChannelId,
) -> Result<(), WagerboardError> {
    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%channel, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::info!(%channel, "connection idle, closing");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%channel, error = %e, "failed to decode client message");
                continue;
            }
        };

        state.gateway.handle(channel, msg).await;
    }
}
