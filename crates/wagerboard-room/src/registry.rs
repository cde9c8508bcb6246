//! Room registry: matchmaking by stake, and routing by channel.
//!
//! The registry and the room actors share a [`Directory`]: the room map
//! and the channel → room index. It sits behind a `std::sync::Mutex`
//! that is never held across an `.await`. Rooms remove themselves from
//! it when they tear down.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use tracing::{debug, info};
use wagerboard_protocol::{Amount, ChannelId, RoomId};
use wagerboard_settlement::SettlementCoordinator;

use crate::room::{spawn_room, RoomSetup};
use crate::{
    EventSender, JoinAccepted, JoinRejection, JoinRequest, JoinTarget, MoveRejection, RoomConfig,
    RoomError, RoomHandle, RoomInfo,
};

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

struct RoomEntry {
    handle: RoomHandle,
    stake: Amount,
    /// Creation order, for deterministic matchmaking.
    seq: u64,
    /// Open with a free seat, as last reported by the room.
    open: bool,
}

#[derive(Default)]
struct DirectoryState {
    rooms: HashMap<RoomId, RoomEntry>,
    /// A channel sits in at most one room.
    channels: HashMap<ChannelId, RoomId>,
    next_seq: u64,
    draining: bool,
}

/// Shared room map and channel index.
#[derive(Clone, Default)]
pub(crate) struct Directory {
    inner: Arc<Mutex<DirectoryState>>,
}

impl Directory {
    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        // Every critical section is a plain map update, so the data is
        // consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_room(&self, room_id: RoomId, stake: Amount, handle: RoomHandle) {
        let mut state = self.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.rooms.insert(
            room_id,
            RoomEntry {
                handle,
                stake,
                seq,
                open: true,
            },
        );
    }

    /// Records whether the room currently takes new players.
    pub(crate) fn set_open(&self, room_id: &RoomId, open: bool) {
        if let Some(entry) = self.lock().rooms.get_mut(room_id) {
            entry.open = open;
        }
    }

    /// Drops the room and every channel bound to it.
    pub(crate) fn remove_room(&self, room_id: &RoomId) {
        let mut state = self.lock();
        if state.rooms.remove(room_id).is_some() {
            state.channels.retain(|_, bound| bound != room_id);
            info!(room_id = %room_id, rooms = state.rooms.len(), "room destroyed");
        }
    }

    fn handle(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.lock().rooms.get(room_id).map(|e| e.handle.clone())
    }

    /// Open rooms with this stake and a free seat, oldest first.
    fn candidates(&self, stake: Amount) -> Vec<RoomHandle> {
        let state = self.lock();
        let mut entries: Vec<&RoomEntry> = state
            .rooms
            .values()
            .filter(|e| e.stake == stake && e.open)
            .collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.handle.clone()).collect()
    }

    /// Binds `channel` to `room_id` unless it is already bound somewhere.
    fn bind_channel(&self, channel: ChannelId, room_id: &RoomId) -> bool {
        let mut state = self.lock();
        if state.channels.contains_key(&channel) {
            return false;
        }
        state.channels.insert(channel, room_id.clone());
        true
    }

    /// Unbinds `channel`, but only from `room_id`.
    pub(crate) fn release_channel(&self, channel: ChannelId, room_id: &RoomId) {
        let mut state = self.lock();
        if state.channels.get(&channel) == Some(room_id) {
            state.channels.remove(&channel);
        }
    }

    fn take_channel(&self, channel: ChannelId) -> Option<RoomId> {
        self.lock().channels.remove(&channel)
    }

    fn room_of(&self, channel: ChannelId) -> Option<RoomId> {
        self.lock().channels.get(&channel).cloned()
    }

    fn handles(&self) -> Vec<RoomHandle> {
        self.lock().rooms.values().map(|e| e.handle.clone()).collect()
    }
}

/// Generates a random 32-character hex room id (128 bits of entropy).
fn generate_room_id() -> RoomId {
    let bytes: [u8; 16] = rand::rng().random();
    RoomId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

// ---------------------------------------------------------------------------
// RoomRegistry
// ---------------------------------------------------------------------------

/// Finds, creates, and routes to rooms.
///
/// One registry serves the whole server; share it as `Arc<RoomRegistry>`.
pub struct RoomRegistry {
    config: RoomConfig,
    settlement: SettlementCoordinator,
    directory: Directory,
    /// One lock per stake, so equal-stake joins land in one room while
    /// other stakes proceed independently.
    matchmaking: Mutex<HashMap<Amount, Arc<tokio::sync::Mutex<()>>>>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig, settlement: SettlementCoordinator) -> Self {
        Self {
            config: config.validated(),
            settlement,
            directory: Directory::default(),
            matchmaking: Mutex::new(HashMap::new()),
        }
    }

    fn stake_lock(&self, stake: Amount) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.matchmaking.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(stake).or_default())
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Seats `channel` according to `target`.
    ///
    /// `JoinTarget::Stake` tries every room with the same stake in
    /// creation order and creates a new room if none takes the player.
    pub async fn join(
        &self,
        target: JoinTarget,
        request: JoinRequest,
        channel: ChannelId,
        sender: EventSender,
    ) -> Result<JoinAccepted, JoinRejection> {
        let stake_lock = self.stake_lock(request.stake);
        let _guard = stake_lock.lock().await;

        if self.directory.lock().draining {
            return Err(JoinRejection::ShuttingDown);
        }
        request.validate()?;
        if self.directory.room_of(channel).is_some() {
            return Err(JoinRejection::AlreadySeated);
        }

        match target {
            JoinTarget::Room(room_id) => {
                let handle = self
                    .directory
                    .handle(&room_id)
                    .ok_or_else(|| JoinRejection::RoomNotFound(room_id.clone()))?;
                match self.try_join(&handle, &request, channel, &sender).await {
                    Ok(accepted) => Ok(accepted),
                    Err(RoomError::Join(rejection)) => Err(rejection),
                    Err(_) => Err(JoinRejection::RoomNotFound(room_id)),
                }
            }
            JoinTarget::Stake => {
                for handle in self.directory.candidates(request.stake) {
                    match self.try_join(&handle, &request, channel, &sender).await {
                        Ok(accepted) => return Ok(accepted),
                        Err(RoomError::Join(JoinRejection::AlreadySeated)) => {
                            return Err(JoinRejection::AlreadySeated);
                        }
                        // Full, started, or torn down meanwhile.
                        Err(_) => continue,
                    }
                }

                let room_id = generate_room_id();
                let handle = spawn_room(RoomSetup {
                    room_id: room_id.clone(),
                    stake: request.stake,
                    config: self.config.clone(),
                    settlement: self.settlement.clone(),
                    directory: self.directory.clone(),
                });
                self.directory
                    .insert_room(room_id.clone(), request.stake, handle.clone());
                info!(room_id = %room_id, stake = %request.stake, "room created");

                match self.try_join(&handle, &request, channel, &sender).await {
                    Ok(accepted) => Ok(accepted),
                    Err(RoomError::Join(rejection)) => Err(rejection),
                    Err(_) => Err(JoinRejection::RoomNotFound(room_id)),
                }
            }
        }
    }

    /// Binds the channel first so a fast room cannot unbind it before the
    /// binding exists; unbinds again on rejection.
    async fn try_join(
        &self,
        handle: &RoomHandle,
        request: &JoinRequest,
        channel: ChannelId,
        sender: &EventSender,
    ) -> Result<JoinAccepted, RoomError> {
        let room_id = handle.room_id();
        if !self.directory.bind_channel(channel, room_id) {
            return Err(JoinRejection::AlreadySeated.into());
        }
        let result = handle.join(request.clone(), channel, sender.clone()).await;
        if let Err(e) = &result {
            debug!(room_id = %room_id, %channel, error = %e, "join attempt rejected");
            self.directory.release_channel(channel, room_id);
        }
        result
    }

    /// Routes a move to `room_id` on behalf of `channel`.
    ///
    /// A room that no longer exists answers like a room without a game.
    pub async fn apply_move(
        &self,
        channel: ChannelId,
        room_id: &RoomId,
        index: usize,
    ) -> Result<(), MoveRejection> {
        let Some(handle) = self.directory.handle(room_id) else {
            return Err(MoveRejection::NotEnoughPlayers);
        };
        match handle.apply_move(channel, index).await {
            Ok(()) => Ok(()),
            Err(RoomError::Move(rejection)) => {
                debug!(room_id = %room_id, %channel, index, %rejection, "move rejected");
                Err(rejection)
            }
            Err(_) => Err(MoveRejection::NotEnoughPlayers),
        }
    }

    /// Removes `channel` from its room, if it has one. Idempotent.
    pub async fn disconnect(&self, channel: ChannelId) {
        let Some(room_id) = self.directory.take_channel(channel) else {
            return;
        };
        if let Some(handle) = self.directory.handle(&room_id) {
            // A room that is already gone has nothing left to do.
            let _ = handle.disconnect(channel).await;
        }
    }

    /// The room `channel` is seated in.
    pub fn room_of(&self, channel: ChannelId) -> Option<RoomId> {
        self.directory.room_of(channel)
    }

    pub async fn room_info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .directory
            .handle(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.get_info().await
    }

    pub fn room_count(&self) -> usize {
        self.directory.lock().rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.directory.lock().rooms.keys().cloned().collect()
    }

    /// Stops new joins and tears every room down.
    pub async fn shutdown(&self) {
        self.directory.lock().draining = true;
        // Joins already past the draining check finish before rooms are
        // collected; later ones see the flag.
        let locks: Vec<_> = self
            .matchmaking
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for lock in locks {
            drop(lock.lock().await);
        }
        let handles = self.directory.handles();
        info!(rooms = handles.len(), "draining room registry");
        for handle in handles {
            let _ = handle.shutdown().await;
        }
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("config", &self.config)
            .field("rooms", &self.room_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_room_ids_are_32_hex_chars() {
        let a = generate_room_id();
        let b = generate_room_id();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_candidates_offer_only_open_rooms_with_the_stake() {
        let directory = Directory::default();
        for (id, stake) in [("a", 10), ("b", 10), ("c", 20), ("d", 10)] {
            let room_id = RoomId::new(id);
            directory.insert_room(room_id.clone(), Amount(stake), RoomHandle::detached(room_id));
        }
        directory.set_open(&RoomId::new("b"), false);

        let offered: Vec<RoomId> = directory
            .candidates(Amount(10))
            .iter()
            .map(|h| h.room_id().clone())
            .collect();
        assert_eq!(offered, [RoomId::new("a"), RoomId::new("d")]);

        directory.set_open(&RoomId::new("b"), true);
        assert_eq!(directory.candidates(Amount(10)).len(), 3);
    }

    #[tokio::test]
    async fn test_stake_locks_are_shared_per_stake() {
        let registry = RoomRegistry::new(
            RoomConfig::default(),
            SettlementCoordinator::new(
                Arc::new(wagerboard_settlement::InMemoryWalletStore::new()),
                Arc::new(wagerboard_settlement::InMemoryOutcomeLog::new()),
                Arc::new(wagerboard_settlement::NoopNotifier),
            ),
        );
        let ten = registry.stake_lock(Amount(10));
        assert!(Arc::ptr_eq(&ten, &registry.stake_lock(Amount(10))));

        // Holding one stake's lock leaves other stakes free.
        let _held = ten.lock().await;
        assert!(registry.stake_lock(Amount(20)).try_lock().is_ok());
        assert!(registry.stake_lock(Amount(10)).try_lock().is_err());
    }
}
