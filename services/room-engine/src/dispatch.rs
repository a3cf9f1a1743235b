//! The room engine: command dispatch over lobby, round, and fan-out
//!
//! One `RoomEngine` is owned by exactly one task; every mutation happens
//! through `apply`, `tick`, or the connection hooks, which keeps the whole
//! room single-writer. `apply` validates preconditions, mutates state,
//! emits broadcasts into the fan-out, and audits the result. The outer
//! `Result` layer is fatal: an `AuditViolation` means the room must die.

use std::collections::BTreeSet;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info};

use protocol::{Broadcast, Command, PlayerUpdate, Reply, RoundResults, UpdateKind};
use types::prelude::*;

use crate::audit;
use crate::fanout::{ConnectionId, Fanout};
use crate::matching::match_order;
use crate::room::{Phase, Role, Room};
use crate::round::Round;

/// Authoritative state machine for one room.
pub struct RoomEngine {
    config: GameConfig,
    room: Room,
    round: Option<Round>,
    fanout: Fanout,
    rng: ChaCha8Rng,
}

impl RoomEngine {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            fanout: Fanout::new(config.fanout_capacity),
            room: Room::default(),
            round: None,
            rng,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Register a connection's update stream. Happens before login.
    pub fn connect(&mut self, conn: ConnectionId) {
        self.fanout.subscribe(conn);
    }

    /// Tear down a connection. A player mid-round stays in the game with
    /// their orders resting and is evicted at round end; anyone else is
    /// removed now. Returns usernames whose server-wide registration can
    /// be released.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<Username> {
        self.fanout.unsubscribe(conn);

        let Some(username) = self.room.username_for_conn(conn) else {
            return Vec::new();
        };
        let playing_mid_round = self.round.is_some()
            && matches!(
                self.room.users.get(&username).map(|u| u.role),
                Some(Role::Player {
                    phase: Phase::Playing,
                    ..
                })
            );

        if playing_mid_round {
            self.room
                .users
                .get_mut(&username)
                .expect("user exists")
                .is_connected = false;
            info!(%username, "player disconnected mid-round, orders remain");
            Vec::new()
        } else {
            self.room.remove_user(&username);
            info!(%username, "user left");
            vec![username]
        }
    }

    /// Pending updates for one subscriber, in delivery order.
    pub fn drain(&mut self, conn: ConnectionId) -> Vec<PlayerUpdate> {
        self.fanout.drain(conn)
    }

    /// Subscribers dropped for falling behind. The caller closes them.
    pub fn take_overflowed(&mut self) -> Vec<ConnectionId> {
        self.fanout.take_overflowed()
    }

    pub fn has_subscribers(&self) -> bool {
        self.fanout.subscriber_count() > 0
    }

    /// When the current round expires, if one is running.
    pub fn round_deadline(&self) -> Option<Instant> {
        self.round.as_ref().map(|r| r.deadline())
    }

    /// Execute one command. The inner `Result` is the RPC reply; the outer
    /// error is a fatal invariant violation that must kill the room.
    pub fn apply(
        &mut self,
        conn: ConnectionId,
        command: Command,
        now: Instant,
    ) -> Result<Result<Reply, GameError>, AuditViolation> {
        debug!(conn, ?command, "applying command");
        let reply = self.dispatch(conn, command, now)?;

        if let Some(round) = &self.round {
            if let Err(violation) = audit::check_round(round) {
                error!(?violation, "invariant violated, terminating room");
                return Err(violation);
            }
        }
        Ok(reply)
    }

    /// Advance the clock. Ends the round when its time is up; returns
    /// usernames released by end-of-round eviction.
    pub fn tick(&mut self, now: Instant) -> Result<Vec<Username>, AuditViolation> {
        let expired = self.round.as_ref().is_some_and(|r| r.is_expired(now));
        if !expired {
            return Ok(Vec::new());
        }
        Ok(self.end_round())
    }

    fn dispatch(
        &mut self,
        conn: ConnectionId,
        command: Command,
        now: Instant,
    ) -> Result<Result<Reply, GameError>, AuditViolation> {
        match command {
            Command::Login { username } => Ok(self.login(conn, username)),
            Command::StartPlaying(request) => {
                let Some(username) = self.room.username_for_conn(conn) else {
                    return Ok(Err(GameError::NotLoggedIn));
                };
                match self.room.sit(&username, request, self.round.is_some()) {
                    Err(e) => Ok(Err(e)),
                    Ok(seat) => {
                        self.fanout
                            .broadcast(Broadcast::PlayerSat { username, seat });
                        Ok(Ok(Reply::Seat(seat)))
                    }
                }
            }
            Command::Ready { is_ready } => {
                let Some(username) = self.room.username_for_conn(conn) else {
                    return Ok(Err(GameError::NotLoggedIn));
                };
                match self.room.set_ready(&username, is_ready, self.round.is_some()) {
                    Err(e) => Ok(Err(e)),
                    Ok(()) => {
                        self.fanout.broadcast(Broadcast::PlayerReady {
                            who: username,
                            is_ready,
                        });
                        if self.room.can_start() {
                            self.start_round(now);
                        }
                        Ok(Ok(Reply::Unit))
                    }
                }
            }
            Command::Order(order) => self.place_order(conn, order),
            Command::Cancel { id } => Ok(self.cancel_order(conn, id)),
            Command::CxlAll => Ok(self.cancel_all(conn)),
            Command::Chat { msg } => {
                let Some(username) = self.room.username_for_conn(conn) else {
                    return Ok(Err(GameError::NotLoggedIn));
                };
                self.fanout
                    .broadcast(Broadcast::Chat { who: username, msg });
                Ok(Ok(Reply::Unit))
            }
            Command::GetUpdate(kind) => Ok(self.get_update(conn, kind)),
            Command::TimeLeft => match &self.round {
                Some(round) => Ok(Ok(Reply::TimeLeftMs(
                    round.time_remaining(now).as_millis() as u64,
                ))),
                None => Ok(Err(GameError::GameNotInProgress)),
            },
        }
    }

    fn login(&mut self, conn: ConnectionId, username: Username) -> Result<Reply, GameError> {
        if self.room.user_for_conn(conn).is_some() {
            return Err(GameError::AlreadyLoggedIn);
        }
        self.room
            .login(username.clone(), conn, self.config.max_users)?;
        info!(%username, conn, "user logged in");
        self.fanout.broadcast(Broadcast::PlayerJoined { username });
        Ok(Reply::Unit)
    }

    fn start_round(&mut self, now: Instant) {
        let players = self.room.seated_players();
        let round = Round::start(&players, &mut self.rng, now, self.config.round_duration);
        self.room.begin_round();
        debug!(gold = %round.gold, "round started");

        self.fanout.broadcast(Broadcast::NewRound);
        for username in &players {
            let user = &self.room.users[username];
            if user.is_connected {
                self.fanout
                    .send_to(user.conn, PlayerUpdate::Hand(round.hands[username]));
            }
        }
        self.round = Some(round);
    }

    /// Role gate shared by order, cancel, and cxl-all: the sender must be
    /// a player in a running round.
    fn playing_user(&self, conn: ConnectionId) -> Result<Username, GameError> {
        let Some(username) = self.room.username_for_conn(conn) else {
            return Err(GameError::YoureNotPlaying);
        };
        match self.room.users.get(&username).map(|u| u.role) {
            Some(Role::Player {
                phase: Phase::Playing,
                ..
            }) if self.round.is_some() => Ok(username),
            Some(Role::Player { .. }) => Err(GameError::GameNotInProgress),
            _ => Err(GameError::YoureNotPlaying),
        }
    }

    fn place_order(
        &mut self,
        conn: ConnectionId,
        order: Order,
    ) -> Result<Result<Reply, GameError>, AuditViolation> {
        let username = match self.playing_user(conn) {
            Ok(u) => u,
            Err(e) => return Ok(Err(e)),
        };
        let round = self.round.as_mut().expect("playing implies a round");

        if order.owner != username {
            return Ok(Err(GameError::OwnerIsNotSender));
        }
        if let Err(e) = order.validate(&self.config) {
            return Ok(Err(e));
        }
        if order.dir == Dir::Sell {
            if let Err(e) = round.check_sell_coverage(&username, order.suit, order.size) {
                return Ok(Err(e));
            }
        }
        if let Err(e) = round.claim_order_id(&username, order.id) {
            return Ok(Err(e));
        }

        let outcome = match_order(&mut round.book, &order, &mut round.next_entry_seq);

        // Self-crossed resting orders come out first, with no fill.
        for cancelled in &outcome.self_cancelled {
            self.fanout.broadcast(Broadcast::Out {
                order: cancelled.clone(),
            });
        }

        // Card and cash transfers, one per fill.
        let mut touched: BTreeSet<Username> = BTreeSet::new();
        for mf in &outcome.maker_fills {
            let (buyer, seller) = match order.dir {
                Dir::Buy => (&username, &mf.maker.owner),
                Dir::Sell => (&mf.maker.owner, &username),
            };
            round.apply_fill(buyer, seller, order.suit, mf.fill.size, mf.fill.price)?;
            touched.insert(mf.maker.owner.clone());
        }
        if !outcome.maker_fills.is_empty() {
            touched.insert(username.clone());
        }

        self.fanout.broadcast(Broadcast::Exec {
            order: order.clone(),
            exec: outcome.exec_report(),
        });

        // Makers the exec fully consumed are now out.
        for mf in &outcome.maker_fills {
            if mf.maker_remaining_after.is_zero() {
                self.fanout.broadcast(Broadcast::Out {
                    order: mf.maker.clone(),
                });
            }
        }

        // Fresh private hands for everyone whose cards moved.
        for who in &touched {
            if let Some(user) = self.room.users.get(who) {
                if user.is_connected {
                    self.fanout
                        .send_to(user.conn, PlayerUpdate::Hand(round.hands[who]));
                }
            }
        }

        Ok(Ok(Reply::Ack))
    }

    fn cancel_order(&mut self, conn: ConnectionId, id: OrderId) -> Result<Reply, GameError> {
        let username = self.playing_user(conn)?;
        let round = self.round.as_mut().expect("playing implies a round");

        let Some(entry) = round.book.remove_by_id(&username, id) else {
            return Err(GameError::NoSuchOrder);
        };
        self.fanout.broadcast(Broadcast::Out { order: entry.order });
        Ok(Reply::Ack)
    }

    fn cancel_all(&mut self, conn: ConnectionId) -> Result<Reply, GameError> {
        let username = self.playing_user(conn)?;
        let round = self.round.as_mut().expect("playing implies a round");

        for entry in round.book.cancel_by_owner(&username) {
            self.fanout.broadcast(Broadcast::Out { order: entry.order });
        }
        Ok(Reply::Ack)
    }

    fn get_update(&mut self, conn: ConnectionId, kind: UpdateKind) -> Result<Reply, GameError> {
        let Some(username) = self.room.username_for_conn(conn) else {
            return Err(GameError::NotLoggedIn);
        };
        match kind {
            UpdateKind::Hand => {
                let hand = self
                    .round
                    .as_ref()
                    .and_then(|r| r.hands.get(&username))
                    .copied()
                    .ok_or(GameError::YoureNotPlaying)?;
                self.fanout.send_to(conn, PlayerUpdate::Hand(hand));
            }
            UpdateKind::Market => {
                let snapshot = self
                    .round
                    .as_ref()
                    .map(|r| r.book.snapshot())
                    .unwrap_or_default();
                self.fanout.send_to(conn, PlayerUpdate::Market(snapshot));
            }
        }
        Ok(Reply::Unit)
    }

    /// Round teardown: flush every resting order as `Out`, then results,
    /// then cumulative scores, in that order for every subscriber.
    fn end_round(&mut self) -> Vec<Username> {
        let mut round = self.round.take().expect("caller checked");

        for entry in round.book.drain_all() {
            self.fanout.broadcast(Broadcast::Out { order: entry.order });
        }

        let scores_this_round = round.settle(&self.config);
        for (username, score) in &scores_this_round {
            if let Some(user) = self.room.users.get_mut(username) {
                user.score += *score;
            }
        }

        info!(gold = %round.gold, "round over");
        self.fanout.broadcast(Broadcast::RoundOver(RoundResults {
            gold: round.gold,
            hands: round.hands.clone(),
            scores_this_round,
        }));

        let cumulative = self
            .room
            .users
            .values()
            .filter(|u| matches!(u.role, Role::Player { .. }))
            .map(|u| (u.username.clone(), u.score))
            .collect();
        self.fanout.broadcast(Broadcast::Scores { scores: cumulative });

        self.room.end_round()
    }
}
