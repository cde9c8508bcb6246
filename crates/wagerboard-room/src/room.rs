//! Room actor: an isolated Tokio task that owns one game table.
//!
//! Joins, moves, disconnects, turn expiries, and the results of wallet
//! calls all arrive through one bounded inbox and are handled one at a
//! time, so the room never needs a lock. Wallet calls run in spawned
//! tasks and report back through the same inbox.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use wagerboard_protocol::{
    Amount, ChannelId, LoserScreen, PlayerSummary, Recipient, RoomId, ServerEvent, Symbol,
    WinnerScreen,
};
use wagerboard_settlement::{
    Party, ReservationError, SettlementCoordinator, SettlementError, SettlementReceipt,
    SettlementRequest,
};
use wagerboard_turn::{TurnExpired, TurnSupervisor};

use crate::player::Player;
use crate::registry::Directory;
use crate::{
    Board, EventSender, JoinAccepted, JoinRejection, JoinRequest, MoveRejection, Outcome,
    RoomConfig, RoomError, RoomState,
};

/// Commands sent to a room actor through its inbox.
///
/// The `oneshot::Sender` in some variants is a reply channel; if the room
/// is torn down before answering, the caller sees `RoomError::Unavailable`.
pub(crate) enum RoomCommand {
    Join {
        request: JoinRequest,
        channel: ChannelId,
        sender: EventSender,
        reply: oneshot::Sender<Result<JoinAccepted, JoinRejection>>,
    },

    Move {
        channel: ChannelId,
        index: usize,
        reply: oneshot::Sender<Result<(), MoveRejection>>,
    },

    Disconnect {
        channel: ChannelId,
    },

    TurnExpired(TurnExpired),

    /// Result of the reservation started when the room filled.
    StakesReserved {
        attempt: u64,
        parties: Vec<Party>,
        result: Result<(), ReservationError>,
    },

    SettlementFinished(Result<SettlementReceipt, SettlementError>),

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// A snapshot of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: RoomState,
    pub stake: Amount,
    pub capacity: usize,
    /// Seated players, ordered by seat.
    pub players: Vec<PlayerSummary>,
    pub board: Vec<Option<Symbol>>,
    pub current_player: usize,
    pub starting_player: usize,
    /// The pool of the running game; zero before it starts.
    pub total_wager: Amount,
    pub turn_armed: bool,
}

/// Handle to a running room actor.
///
/// Cheap to clone; the registry holds one per room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl std::fmt::Debug for RoomCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Join { .. } => "Join",
            Self::Move { .. } => "Move",
            Self::Disconnect { .. } => "Disconnect",
            Self::TurnExpired(_) => "TurnExpired",
            Self::StakesReserved { .. } => "StakesReserved",
            Self::SettlementFinished(_) => "SettlementFinished",
            Self::GetInfo { .. } => "GetInfo",
            Self::Shutdown { .. } => "Shutdown",
        };
        f.write_str(name)
    }
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// A handle whose room never answers.
    #[cfg(test)]
    pub(crate) fn detached(room_id: RoomId) -> Self {
        let (sender, _) = mpsc::channel(1);
        Self { room_id, sender }
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    /// Asks the room for a seat.
    pub async fn join(
        &self,
        request: JoinRequest,
        channel: ChannelId,
        sender: EventSender,
    ) -> Result<JoinAccepted, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                request,
                channel,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        Ok(reply_rx.await.map_err(|_| self.unavailable())??)
    }

    /// Places the channel's symbol on `index`.
    pub async fn apply_move(&self, channel: ChannelId, index: usize) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Move {
                channel,
                index,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        Ok(reply_rx.await.map_err(|_| self.unavailable())??)
    }

    /// Tells the room the channel is gone (fire-and-forget).
    pub async fn disconnect(&self, channel: ChannelId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Disconnect { channel })
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tears the room down and waits until it is gone.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Shutdown { done: done_tx })
            .await
            .map_err(|_| self.unavailable())?;
        done_rx.await.map_err(|_| self.unavailable())
    }
}

/// Everything a new room needs.
pub(crate) struct RoomSetup {
    pub room_id: RoomId,
    pub stake: Amount,
    pub config: RoomConfig,
    pub settlement: SettlementCoordinator,
    pub directory: Directory,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    stake: Amount,
    config: RoomConfig,
    state: RoomState,
    seats: Vec<Player>,
    board: Board,
    current_player: usize,
    starting_player: usize,
    total_wager: Amount,
    /// Stakes debited for the running game. Refunded if it never ends or
    /// if the payout fails before crediting anything.
    reserved: Vec<Party>,
    /// Players who left a game that carried on without them.
    forfeited: Vec<Party>,
    /// Last seat availability published to the directory.
    advertised_open: bool,
    /// Bumped whenever a pending reservation result becomes stale.
    reservation_attempt: u64,
    turns: TurnSupervisor,
    settlement: SettlementCoordinator,
    directory: Directory,
    inbox: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
    shutdown_waiters: Vec<oneshot::Sender<()>>,
}

impl RoomActor {
    /// Processes commands until the room tears itself down.
    async fn run(mut self) {
        info!(room_id = %self.room_id, stake = %self.stake, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle(cmd);
            if self.state == RoomState::Destroying {
                break;
            }
            self.advertise_vacancy();
        }

        self.finish_teardown();
        info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                request,
                channel,
                sender,
                reply,
            } => {
                let result = self.handle_join(request, channel, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Move {
                channel,
                index,
                reply,
            } => {
                let result = self.handle_move(channel, index);
                let _ = reply.send(result);
            }
            RoomCommand::Disconnect { channel } => self.handle_disconnect(channel),
            RoomCommand::TurnExpired(expired) => self.handle_turn_expired(expired),
            RoomCommand::StakesReserved {
                attempt,
                parties,
                result,
            } => self.handle_stakes_reserved(attempt, parties, result),
            RoomCommand::SettlementFinished(result) => self.handle_settlement_finished(result),
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown { done } => {
                info!(room_id = %self.room_id, state = %self.state, "room shutting down");
                self.shutdown_waiters.push(done);
                // A finished room's stakes stay with the settlement task.
                if self.state.is_active() {
                    self.refund_reserved();
                }
                self.set_state(RoomState::Destroying);
            }
        }
    }

    // -- Joins ---------------------------------------------------------------

    fn handle_join(
        &mut self,
        request: JoinRequest,
        channel: ChannelId,
        sender: EventSender,
    ) -> Result<JoinAccepted, JoinRejection> {
        if !self.state.is_joinable() || self.seats.len() >= self.config.capacity {
            return Err(JoinRejection::RoomFull);
        }
        if request.stake != self.stake {
            return Err(JoinRejection::StakeMismatch {
                expected: self.stake,
                offered: request.stake,
            });
        }
        if self
            .seats
            .iter()
            .any(|p| p.channel == channel || p.user_id == request.user_id)
        {
            return Err(JoinRejection::AlreadySeated);
        }

        // Lowest free seat, so a symbol is never shared.
        let seat_index = (0..self.config.capacity)
            .find(|i| self.seats.iter().all(|p| p.seat != i + 1))
            .ok_or(JoinRejection::RoomFull)?;
        let symbol = Symbol::for_seat(seat_index).ok_or(JoinRejection::RoomFull)?;

        let player = Player {
            user_id: request.user_id,
            name: request.name,
            seat: seat_index + 1,
            symbol,
            channel,
            sender,
            stake: request.stake,
            push_token: request.push_token,
        };
        info!(
            room_id = %self.room_id,
            %channel,
            user_id = %player.user_id,
            seat = player.seat,
            %symbol,
            "player joined"
        );
        let name = player.name.clone();
        let position = self.seats.partition_point(|p| p.seat < player.seat);
        self.seats.insert(position, player);

        self.emit(
            Recipient::AllExcept(channel),
            ServerEvent::PlayerJoined {
                name,
                room_id: self.room_id.clone(),
            },
        );
        self.emit_players_update();

        if self.seats.len() == self.config.capacity {
            self.begin_game();
        }

        Ok(JoinAccepted {
            room_id: self.room_id.clone(),
            seat: seat_index + 1,
            symbol,
        })
    }

    /// The room is full: reserve stakes first if configured.
    fn begin_game(&mut self) {
        if !self.config.reserve_stakes {
            self.start_game();
            return;
        }

        self.set_state(RoomState::Starting);
        self.reservation_attempt += 1;
        let attempt = self.reservation_attempt;
        let parties: Vec<Party> = self.seats.iter().map(Player::party).collect();
        let room_id = self.room_id.clone();
        let coordinator = self.settlement.clone();
        let inbox = self.inbox.clone();
        debug!(room_id = %room_id, attempt, "reserving stakes");

        tokio::spawn(async move {
            let result = coordinator.reserve_stakes(&room_id, &parties).await;
            let reserved = result.is_ok();
            let cmd = RoomCommand::StakesReserved {
                attempt,
                parties,
                result,
            };
            if let Err(mpsc::error::SendError(cmd)) = inbox.send(cmd).await {
                // The room is gone; nobody else will give the money back.
                if let RoomCommand::StakesReserved { parties, .. } = cmd {
                    if reserved {
                        coordinator.refund_stakes(&room_id, &parties).await;
                    }
                }
            }
        });
    }

    fn handle_stakes_reserved(
        &mut self,
        attempt: u64,
        parties: Vec<Party>,
        result: Result<(), ReservationError>,
    ) {
        if attempt != self.reservation_attempt || self.state != RoomState::Starting {
            debug!(room_id = %self.room_id, attempt, "stale reservation result");
            if result.is_ok() {
                self.spawn_refund(parties);
            }
            return;
        }

        match result {
            Ok(()) => {
                self.reserved = parties;
                self.start_game();
            }
            Err(e) => {
                warn!(room_id = %self.room_id, error = %e, "stake reservation failed, reopening room");
                self.set_state(RoomState::Open);
                let failed = e
                    .user_id
                    .as_ref()
                    .and_then(|user| self.seats.iter().position(|p| &p.user_id == user));
                if let Some(index) = failed {
                    let player = self.seats.remove(index);
                    self.directory.release_channel(player.channel, &self.room_id);
                    player.send(ServerEvent::InvalidBet { reason: e.reason });
                    self.announce_departure(&player);
                    self.emit_players_update();
                }
                if self.seats.is_empty() {
                    self.set_state(RoomState::Destroying);
                }
            }
        }
    }

    fn start_game(&mut self) {
        self.set_state(RoomState::InProgress);
        self.total_wager = self.pool();
        self.forfeited.clear();
        self.board.reset();
        self.starting_player = 0;
        self.current_player = self.starting_player;
        info!(
            room_id = %self.room_id,
            players = self.seats.len(),
            total_wager = %self.total_wager,
            "game started"
        );

        self.emit(
            Recipient::All,
            ServerEvent::GameReady {
                players: self.summaries(),
                room_id: self.room_id.clone(),
                amount: self.stake,
            },
        );
        self.emit_turn_change();
        self.arm_turn();
    }

    // -- Moves ---------------------------------------------------------------

    fn handle_move(&mut self, channel: ChannelId, index: usize) -> Result<(), MoveRejection> {
        if self.state != RoomState::InProgress || self.seats.len() < 2 {
            return Err(MoveRejection::NotEnoughPlayers);
        }
        match self.board.cell(index) {
            None => return Err(MoveRejection::InvalidCell),
            Some(Some(_)) => return Err(MoveRejection::CellOccupied),
            Some(None) => {}
        }
        let mover = match self.seats.get(self.current_player) {
            Some(p) if p.channel == channel => p.clone(),
            _ => return Err(MoveRejection::NotYourTurn),
        };
        self.board
            .apply_move(index, mover.symbol)
            .map_err(|_| MoveRejection::CellOccupied)?;

        self.turns.cancel();
        self.current_player = (self.current_player + 1) % self.seats.len();
        debug!(room_id = %self.room_id, %channel, index, symbol = %mover.symbol, "move accepted");

        self.emit(
            Recipient::All,
            ServerEvent::MoveMade {
                index,
                symbol: mover.symbol,
                player_name: mover.name.clone(),
                board: self.board.cells(),
            },
        );

        match self.board.evaluate() {
            Outcome::Win(symbol) => {
                let winner = self
                    .seats
                    .iter()
                    .position(|p| p.symbol == symbol)
                    .unwrap_or(self.current_player);
                self.finish_with_winner(winner, true);
            }
            Outcome::Draw => self.reset_after_draw(),
            Outcome::Ongoing => {
                self.emit_turn_change();
                self.arm_turn();
            }
        }
        Ok(())
    }

    fn reset_after_draw(&mut self) {
        self.board.reset();
        self.starting_player = (self.starting_player + 1) % self.seats.len();
        self.current_player = self.starting_player;
        info!(room_id = %self.room_id, starting_player = self.starting_player, "draw, board reset");

        self.emit(
            Recipient::All,
            ServerEvent::GameDraw {
                result: "It's a draw!".into(),
            },
        );
        self.emit(
            Recipient::All,
            ServerEvent::NewGame {
                starting_player: self.starting_player,
            },
        );
        self.emit_turn_change();
        self.arm_turn();
    }

    // -- Turn deadline -------------------------------------------------------

    fn arm_turn(&mut self) {
        self.turns.arm(&self.inbox, RoomCommand::TurnExpired);
    }

    fn handle_turn_expired(&mut self, expired: TurnExpired) {
        if !self.turns.accept(expired) {
            return;
        }
        if self.state != RoomState::InProgress || self.seats.is_empty() {
            return;
        }
        self.current_player = (self.current_player + 1) % self.seats.len();
        info!(
            room_id = %self.room_id,
            current_player = self.current_player,
            "turn deadline passed, advancing"
        );
        self.emit_turn_change();
        self.arm_turn();
    }

    // -- Disconnects ---------------------------------------------------------

    fn handle_disconnect(&mut self, channel: ChannelId) {
        let Some(index) = self.seats.iter().position(|p| p.channel == channel) else {
            debug!(room_id = %self.room_id, %channel, "disconnect from unseated channel");
            return;
        };
        let player = self.seats.remove(index);
        self.directory.release_channel(channel, &self.room_id);
        info!(
            room_id = %self.room_id,
            %channel,
            user_id = %player.user_id,
            state = %self.state,
            remaining = self.seats.len(),
            "player left"
        );

        match self.state {
            RoomState::Open => {
                self.announce_departure(&player);
                self.emit_players_update();
                if self.seats.is_empty() {
                    self.set_state(RoomState::Destroying);
                }
            }
            RoomState::Starting => {
                // Any reservation still in flight is now stale.
                self.reservation_attempt += 1;
                self.set_state(RoomState::Open);
                self.announce_departure(&player);
                self.emit_players_update();
                if self.seats.is_empty() {
                    self.set_state(RoomState::Destroying);
                }
            }
            RoomState::InProgress => {
                self.announce_departure(&player);
                match self.seats.len() {
                    0 => {
                        self.refund_reserved();
                        self.set_state(RoomState::Destroying);
                    }
                    1 => self.finish_with_winner(0, false),
                    _ => {
                        self.forfeited.push(player.party());
                        if index < self.current_player {
                            self.current_player -= 1;
                        }
                        if self.current_player >= self.seats.len() {
                            self.current_player = 0;
                        }
                        if self.starting_player >= self.seats.len() {
                            self.starting_player = 0;
                        }
                        self.turns.cancel();
                        self.emit_turn_change();
                        self.arm_turn();
                    }
                }
            }
            // Settlement is already running; never settle twice.
            RoomState::Finished | RoomState::Destroying => {}
        }
    }

    fn announce_departure(&self, player: &Player) {
        self.emit(
            Recipient::All,
            ServerEvent::PlayerLeft {
                message: format!("{} left the game", player.name),
                room_id: self.room_id.clone(),
            },
        );
    }

    // -- Outcomes ------------------------------------------------------------

    /// Claims the terminal state and hands the pool to the winner.
    ///
    /// `decided_on_board` is false for a default win by disconnect, which
    /// writes no loser records and sends no `gameOver`.
    fn finish_with_winner(&mut self, winner_index: usize, decided_on_board: bool) {
        if self.state.is_terminal() {
            return;
        }
        self.set_state(RoomState::Finished);
        self.turns.cancel();

        let Some(winner) = self.seats.get(winner_index).cloned() else {
            error!(room_id = %self.room_id, winner_index, "winner seat missing");
            self.set_state(RoomState::Destroying);
            return;
        };
        let total_bet = self.total_wager;
        info!(
            room_id = %self.room_id,
            user_id = %winner.user_id,
            %total_bet,
            by_default = !decided_on_board,
            "game decided"
        );

        if decided_on_board {
            self.emit(
                Recipient::All,
                ServerEvent::GameOver {
                    winner_symbol: winner.symbol,
                    result: format!("{} wins!", winner.name),
                },
            );
        }
        winner.send(ServerEvent::WinnerScreen(WinnerScreen {
            room_id: self.room_id.clone(),
            winner_name: winner.name.clone(),
            total_bet,
            message: format!("You won {total_bet}!"),
        }));

        let losers: Vec<&Player> = if decided_on_board {
            self.seats
                .iter()
                .filter(|p| p.channel != winner.channel)
                .collect()
        } else {
            Vec::new()
        };
        for loser in &losers {
            loser.send(ServerEvent::LoserScreen(LoserScreen {
                room_id: self.room_id.clone(),
                winner_name: winner.name.clone(),
                total_bet,
                message: format!("{} won the game", winner.name),
            }));
        }

        let mut loser_parties: Vec<Party> = losers.iter().map(|p| p.party()).collect();
        if decided_on_board {
            loser_parties.extend(self.forfeited.iter().cloned());
        }
        let request = SettlementRequest {
            room_id: self.room_id.clone(),
            winner: winner.party(),
            losers: loser_parties,
            total_bet,
        };

        let coordinator = self.settlement.clone();
        let inbox = self.inbox.clone();
        let room_id = self.room_id.clone();
        let reserved = self.reserved.clone();
        tokio::spawn(async move {
            let result = coordinator.settle(request).await;
            let nothing_credited = matches!(&result, Err(e) if e.nothing_credited());
            if inbox
                .send(RoomCommand::SettlementFinished(result))
                .await
                .is_err()
                && nothing_credited
            {
                // The room is gone; nobody else will give the stakes back.
                coordinator.refund_stakes(&room_id, &reserved).await;
            }
        });
    }

    fn handle_settlement_finished(&mut self, result: Result<SettlementReceipt, SettlementError>) {
        match result {
            Ok(receipt) => {
                info!(
                    room_id = %self.room_id,
                    user_id = %receipt.winner,
                    credited = %receipt.credited,
                    losers = receipt.losers_recorded,
                    "settlement complete"
                );
                self.reserved.clear();
            }
            Err(e) if e.nothing_credited() => {
                error!(room_id = %self.room_id, error = %e, "settlement failed, refunding stakes");
                self.refund_reserved();
            }
            Err(e) => {
                // The pool already landed with the winner.
                error!(room_id = %self.room_id, error = %e, "settlement incomplete");
                self.reserved.clear();
            }
        }
        self.set_state(RoomState::Destroying);
    }

    // -- Money ---------------------------------------------------------------

    fn pool(&self) -> Amount {
        Amount::checked_sum(self.seats.iter().map(|p| p.stake)).unwrap_or_else(|_| {
            error!(room_id = %self.room_id, "wager pool overflow");
            Amount(u64::MAX)
        })
    }

    /// Tells the directory whether matchmaking may offer this room.
    fn advertise_vacancy(&mut self) {
        let open = self.state.is_joinable() && self.seats.len() < self.config.capacity;
        if open != self.advertised_open {
            self.advertised_open = open;
            self.directory.set_open(&self.room_id, open);
        }
    }

    fn refund_reserved(&mut self) {
        let parties = std::mem::take(&mut self.reserved);
        if !parties.is_empty() {
            self.spawn_refund(parties);
        }
    }

    fn spawn_refund(&self, parties: Vec<Party>) {
        let coordinator = self.settlement.clone();
        let room_id = self.room_id.clone();
        tokio::spawn(async move {
            coordinator.refund_stakes(&room_id, &parties).await;
        });
    }

    // -- Plumbing ------------------------------------------------------------

    fn set_state(&mut self, next: RoomState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal room transition {} -> {}",
            self.state,
            next
        );
        debug!(room_id = %self.room_id, from = %self.state, to = %next, "room state");
        self.state = next;
    }

    /// Leaves the directory, then fails every queued command.
    fn finish_teardown(&mut self) {
        self.turns.cancel();
        self.directory.remove_room(&self.room_id);
        self.receiver.close();
        while let Ok(cmd) = self.receiver.try_recv() {
            match cmd {
                RoomCommand::StakesReserved {
                    parties,
                    result: Ok(()),
                    ..
                } => self.spawn_refund(parties),
                RoomCommand::SettlementFinished(Err(e)) if e.nothing_credited() => {
                    self.refund_reserved();
                }
                RoomCommand::Shutdown { done } => self.shutdown_waiters.push(done),
                // Reply senders drop here; callers see `Unavailable`.
                _ => {}
            }
        }
        for done in self.shutdown_waiters.drain(..) {
            let _ = done.send(());
        }
    }

    fn emit(&self, recipient: Recipient, event: ServerEvent) {
        for player in &self.seats {
            if recipient.includes(player.channel) {
                player.send(event.clone());
            }
        }
    }

    fn emit_players_update(&self) {
        self.emit(
            Recipient::All,
            ServerEvent::PlayersUpdate {
                players: self.summaries(),
            },
        );
    }

    fn emit_turn_change(&self) {
        if let Some(player) = self.seats.get(self.current_player) {
            self.emit(
                Recipient::All,
                ServerEvent::TurnChange {
                    current_player: self.current_player,
                    user_id: player.user_id.clone(),
                },
            );
        }
    }

    fn summaries(&self) -> Vec<PlayerSummary> {
        self.seats.iter().map(Player::summary).collect()
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.state,
            stake: self.stake,
            capacity: self.config.capacity,
            players: self.summaries(),
            board: self.board.cells(),
            current_player: self.current_player,
            starting_player: self.starting_player,
            total_wager: self.total_wager,
            turn_armed: self.turns.is_armed(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room(setup: RoomSetup) -> RoomHandle {
    let RoomSetup {
        room_id,
        stake,
        config,
        settlement,
        directory,
    } = setup;
    let (tx, rx) = mpsc::channel(config.inbox_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        stake,
        board: Board::new(config.board),
        turns: TurnSupervisor::new(config.turn.clone()),
        config,
        state: RoomState::Open,
        seats: Vec::new(),
        current_player: 0,
        starting_player: 0,
        total_wager: Amount::ZERO,
        reserved: Vec::new(),
        forfeited: Vec::new(),
        advertised_open: true,
        reservation_attempt: 0,
        settlement,
        directory,
        inbox: tx.clone(),
        receiver: rx,
        shutdown_waiters: Vec::new(),
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
