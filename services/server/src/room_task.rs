//! Per-room single-writer task
//!
//! One task owns one `RoomEngine`. It serializes command execution and
//! broadcast emission: apply the command, flush every subscriber's queued
//! updates into its outbound channel, and only then send the reply to the
//! sender. That ordering is what makes an ack prove the sender's effects
//! were already enqueued everywhere else.
//!
//! A subscriber whose outbound channel is full is dropped on the spot
//! rather than stalling the room.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use protocol::{Command, ServerFrame};
use room_engine::{ConnectionId, RoomEngine};
use types::errors::GameError;
use types::ids::Username;

use crate::state::AppState;

/// Outbound channel depth per connection. Overflow drops the subscriber.
const OUTBOUND_CAPACITY: usize = 256;

/// Messages into a room task. Everything a room does arrives here.
#[derive(Debug)]
pub enum RoomMessage {
    Connect {
        conn: ConnectionId,
        outbound: mpsc::Sender<ServerFrame>,
    },
    Command {
        conn: ConnectionId,
        seq: u64,
        command: Command,
    },
    Disconnect {
        conn: ConnectionId,
    },
}

pub fn spawn(state: Arc<AppState>, name: String) -> mpsc::Sender<RoomMessage> {
    let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
    tokio::spawn(run(state, name, rx));
    tx
}

pub fn outbound_channel() -> (mpsc::Sender<ServerFrame>, mpsc::Receiver<ServerFrame>) {
    mpsc::channel(OUTBOUND_CAPACITY)
}

struct RoomTask {
    state: Arc<AppState>,
    name: String,
    engine: RoomEngine,
    outbound: BTreeMap<ConnectionId, mpsc::Sender<ServerFrame>>,
}

async fn run(state: Arc<AppState>, name: String, mut rx: mpsc::Receiver<RoomMessage>) {
    info!(room = %name, "room task started");
    let engine = RoomEngine::new(state.config.clone());
    let mut task = RoomTask {
        state,
        name,
        engine,
        outbound: BTreeMap::new(),
    };

    loop {
        let deadline = task
            .engine
            .round_deadline()
            .map(tokio::time::Instant::from_std);

        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else { break };
                if !task.handle(message) {
                    break;
                }
            }
            _ = async { tokio::time::sleep_until(deadline.unwrap()).await }, if deadline.is_some() => {
                match task.engine.tick(Instant::now()) {
                    Ok(released) => {
                        task.release_names(&released);
                        task.flush();
                    }
                    Err(violation) => {
                        error!(room = %task.name, %violation, "fatal violation on round end");
                        task.teardown();
                        break;
                    }
                }
            }
        }

        // The room dies with its last connection. The first message a
        // room ever receives is a Connect, so this never fires early.
        if task.outbound.is_empty() {
            task.teardown();
            break;
        }
    }
    info!(room = %task.name, "room task stopped");
}

impl RoomTask {
    /// Returns false when the room must shut down.
    fn handle(&mut self, message: RoomMessage) -> bool {
        match message {
            RoomMessage::Connect { conn, outbound } => {
                self.outbound.insert(conn, outbound);
                self.engine.connect(conn);
                debug!(room = %self.name, conn, "connection joined");
                true
            }
            RoomMessage::Disconnect { conn } => {
                self.outbound.remove(&conn);
                let released = self.engine.disconnect(conn);
                self.release_names(&released);
                true
            }
            RoomMessage::Command { conn, seq, command } => self.command(conn, seq, command),
        }
    }

    fn command(&mut self, conn: ConnectionId, seq: u64, command: Command) -> bool {
        // Username uniqueness is server-wide; claim the name before the
        // engine sees the login, and roll back if the room rejects it.
        let claimed = match &command {
            Command::Login { username } => {
                if !self.claim_name(username) {
                    self.send_frame(conn, ServerFrame::reply(seq, Err(GameError::AlreadyLoggedIn)));
                    return true;
                }
                Some(username.clone())
            }
            _ => None,
        };

        match self.engine.apply(conn, command, Instant::now()) {
            Err(violation) => {
                error!(room = %self.name, %violation, "fatal violation, closing room");
                self.teardown();
                false
            }
            Ok(result) => {
                if result.is_err() {
                    if let Some(username) = claimed {
                        self.state.usernames.remove(username.as_str());
                    }
                }
                // Updates first, then the ack on the sender's channel.
                self.flush();
                self.send_frame(conn, ServerFrame::reply(seq, result));
                true
            }
        }
    }

    fn claim_name(&self, username: &Username) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.state.usernames.entry(username.as_str().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(self.name.clone());
                true
            }
        }
    }

    fn release_names(&self, released: &[Username]) {
        for username in released {
            self.state.usernames.remove(username.as_str());
        }
    }

    /// Drain every subscriber's pending updates into its channel. A full
    /// or closed channel disconnects that subscriber only.
    fn flush(&mut self) {
        let conns: Vec<ConnectionId> = self.outbound.keys().copied().collect();
        let mut dead = Vec::new();

        for conn in conns {
            let updates = self.engine.drain(conn);
            let Some(tx) = self.outbound.get(&conn) else {
                continue;
            };
            for update in updates {
                if tx.try_send(ServerFrame::update(update)).is_err() {
                    warn!(room = %self.name, conn, "outbound full, dropping subscriber");
                    dead.push(conn);
                    break;
                }
            }
        }
        dead.extend(self.engine.take_overflowed());

        for conn in dead {
            self.outbound.remove(&conn);
            let released = self.engine.disconnect(conn);
            self.release_names(&released);
        }
    }

    fn send_frame(&mut self, conn: ConnectionId, frame: ServerFrame) {
        if let Some(tx) = self.outbound.get(&conn) {
            if tx.try_send(frame).is_err() {
                warn!(room = %self.name, conn, "outbound full on reply, dropping subscriber");
                self.outbound.remove(&conn);
                let released = self.engine.disconnect(conn);
                self.release_names(&released);
            }
        }
    }

    /// Close every subscriber and deregister the room and its names.
    fn teardown(&mut self) {
        self.outbound.clear();
        let names: Vec<String> = self
            .engine
            .room()
            .users
            .keys()
            .map(|u| u.as_str().to_string())
            .collect();
        for name in names {
            self.state.usernames.remove(&name);
        }
        self.state.rooms.remove(&self.name);
    }
}
