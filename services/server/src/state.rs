//! Process-wide state
//!
//! The only cross-room structures: the room registry and the username
//! registry. Both are touched on login and connection setup, never on the
//! trading hot path; each room's state lives exclusively on its task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use room_engine::ConnectionId;
use types::config::GameConfig;

use crate::room_task::{self, RoomMessage};

pub struct AppState {
    /// Command inbox per live room, keyed by room name.
    pub rooms: DashMap<String, mpsc::Sender<RoomMessage>>,
    /// Server-wide unique usernames, mapped to the room holding them.
    pub usernames: DashMap<String, String>,
    next_conn: AtomicU64,
    pub config: GameConfig,
}

impl AppState {
    pub fn new(config: GameConfig) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            usernames: DashMap::new(),
            next_conn: AtomicU64::new(1),
            config,
        })
    }

    pub fn next_conn_id(&self) -> ConnectionId {
        self.next_conn.fetch_add(1, Ordering::Relaxed)
    }

    /// The command inbox for `room`, spawning the room task on first join.
    pub fn room_inbox(self: &Arc<Self>, room: &str) -> mpsc::Sender<RoomMessage> {
        self.rooms
            .entry(room.to_string())
            .or_insert_with(|| room_task::spawn(Arc::clone(self), room.to_string()))
            .clone()
    }
}
