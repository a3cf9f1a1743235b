//! Per-subscriber update queues
//!
//! The room task is the only writer. Broadcasts go to every live
//! subscriber in one total order; private updates (a player's own hand,
//! `get-update` results) go to a single queue. Queues are bounded: a
//! subscriber that overflows is dropped rather than stalling the rest.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, warn};

use protocol::{Broadcast, PlayerUpdate};

/// Dense per-room connection identifier.
pub type ConnectionId = u64;

/// One subscriber's pending updates.
#[derive(Debug)]
struct SubscriberQueue {
    updates: VecDeque<PlayerUpdate>,
    overflowed: bool,
}

impl SubscriberQueue {
    fn new(capacity: usize) -> Self {
        Self {
            updates: VecDeque::with_capacity(capacity.min(64)),
            overflowed: false,
        }
    }
}

/// Fan-out of updates to all subscribers of one room.
#[derive(Debug)]
pub struct Fanout {
    queues: BTreeMap<ConnectionId, SubscriberQueue>,
    capacity: usize,
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: BTreeMap::new(),
            capacity,
        }
    }

    pub fn subscribe(&mut self, conn: ConnectionId) {
        self.queues.insert(conn, SubscriberQueue::new(self.capacity));
        debug!(conn, "subscriber registered");
    }

    pub fn unsubscribe(&mut self, conn: ConnectionId) {
        self.queues.remove(&conn);
        debug!(conn, "subscriber removed");
    }

    pub fn is_subscribed(&self, conn: ConnectionId) -> bool {
        self.queues.contains_key(&conn)
    }

    pub fn subscriber_count(&self) -> usize {
        self.queues.len()
    }

    fn push(queue: &mut SubscriberQueue, capacity: usize, conn: ConnectionId, update: PlayerUpdate) {
        if queue.overflowed {
            return;
        }
        if queue.updates.len() >= capacity {
            queue.overflowed = true;
            warn!(conn, "subscriber queue overflow, dropping subscriber");
            return;
        }
        queue.updates.push_back(update);
    }

    /// Enqueue a broadcast for every live subscriber.
    pub fn broadcast(&mut self, broadcast: Broadcast) {
        for (&conn, queue) in self.queues.iter_mut() {
            Self::push(
                queue,
                self.capacity,
                conn,
                PlayerUpdate::Broadcast(broadcast.clone()),
            );
        }
    }

    /// Enqueue a private update for one subscriber.
    pub fn send_to(&mut self, conn: ConnectionId, update: PlayerUpdate) {
        if let Some(queue) = self.queues.get_mut(&conn) {
            Self::push(queue, self.capacity, conn, update);
        }
    }

    /// Take everything pending for one subscriber, in order.
    pub fn drain(&mut self, conn: ConnectionId) -> Vec<PlayerUpdate> {
        self.queues
            .get_mut(&conn)
            .map(|q| q.updates.drain(..).collect())
            .unwrap_or_default()
    }

    /// Connections whose queue overflowed since the last call. The caller
    /// must disconnect them; their queues are gone.
    pub fn take_overflowed(&mut self) -> Vec<ConnectionId> {
        let overflowed: Vec<ConnectionId> = self
            .queues
            .iter()
            .filter(|(_, q)| q.overflowed)
            .map(|(&conn, _)| conn)
            .collect();
        for conn in &overflowed {
            self.queues.remove(conn);
        }
        overflowed
    }
}
