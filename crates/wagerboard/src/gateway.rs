//! Session gateway: the boundary between client channels and rooms.
//!
//! The gateway owns one outbound event channel per session. Rooms only
//! ever get clones of its sender, so dropping a session here is what
//! finally closes the stream of events to that client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wagerboard_protocol::{ChannelId, ClientMessage, JoinRoom, RoomId, ServerEvent};
use wagerboard_room::{EventSender, JoinRequest, JoinTarget, RoomRegistry};

/// Routes decoded client messages into the room registry and sends
/// rejections back to the requester.
pub struct SessionGateway {
    registry: Arc<RoomRegistry>,
    channels: Mutex<HashMap<ChannelId, EventSender>>,
}

impl SessionGateway {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    fn channels(&self) -> std::sync::MutexGuard<'_, HashMap<ChannelId, EventSender>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a session and returns the stream of events for it.
    ///
    /// Opening an already open channel replaces its stream.
    pub fn open_channel(&self, channel: ChannelId) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels().insert(channel, tx);
        debug!(%channel, "channel opened");
        rx
    }

    /// Number of open sessions.
    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// Dispatches one decoded client message.
    pub async fn handle(&self, channel: ChannelId, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinRoom(join) => self.on_join(channel, join).await,
            ClientMessage::MakeMove { room_id, index } => {
                self.on_move(channel, room_id, index).await
            }
        }
    }

    pub async fn on_join(&self, channel: ChannelId, join: JoinRoom) {
        let sender = self.channels().get(&channel).cloned();
        let Some(sender) = sender else {
            warn!(%channel, "join on a channel that is not open");
            return;
        };
        let target = JoinTarget::from(join.room_id.clone());
        let request = JoinRequest::from(join);
        let user_id = request.user_id.clone();

        match self.registry.join(target, request, channel, sender).await {
            Ok(accepted) => info!(
                %channel,
                user_id = %user_id,
                room_id = %accepted.room_id,
                seat = accepted.seat,
                "seated"
            ),
            Err(rejection) => {
                debug!(%channel, user_id = %user_id, %rejection, "join rejected");
                self.reply(channel, rejection.to_event());
            }
        }
    }

    pub async fn on_move(&self, channel: ChannelId, room_id: RoomId, index: usize) {
        if let Err(rejection) = self.registry.apply_move(channel, &room_id, index).await {
            self.reply(channel, rejection.to_event());
        }
    }

    /// Frees the channel's seat, then drops the session.
    pub async fn on_disconnect(&self, channel: ChannelId) {
        self.registry.disconnect(channel).await;
        if self.channels().remove(&channel).is_some() {
            debug!(%channel, "channel closed");
        }
    }

    fn reply(&self, channel: ChannelId, event: ServerEvent) {
        if let Some(sender) = self.channels().get(&channel) {
            let _ = sender.send(event);
        }
    }
}
