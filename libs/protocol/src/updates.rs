//! The serialized update stream
//!
//! Everything a client observes after login arrives as a `PlayerUpdate`:
//! room-wide broadcasts in a single total order, plus the two private
//! lanes (`Hand`, `Market`) answering `get-update`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use types::prelude::*;

/// One resting order as shown in a public book snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub id: OrderId,
    pub owner: Username,
    pub price: Price,
    /// Remaining (unfilled) size.
    pub size: Size,
}

/// Public book snapshot: per suit, both half-books in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookSnapshot(pub SuitMap<DirPair<Vec<RestingOrder>>>);

impl BookSnapshot {
    /// Highest-priority resting order on `(suit, dir)`, if any.
    pub fn best(&self, suit: Suit, dir: Dir) -> Option<&RestingOrder> {
        self.0.get(suit).get(dir).first()
    }
}

/// End-of-round results, broadcast before cumulative scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResults {
    pub gold: Suit,
    /// Final hands, revealed to everyone.
    pub hands: BTreeMap<Username, Hand>,
    /// Trading P&L plus gold bonus plus pot share, this round only.
    pub scores_this_round: BTreeMap<Username, Cash>,
}

/// Room-wide broadcasts. Every subscriber observes these in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Broadcast {
    PlayerJoined {
        username: Username,
    },
    PlayerSat {
        username: Username,
        seat: Seat,
    },
    PlayerReady {
        who: Username,
        is_ready: bool,
    },
    Chat {
        who: Username,
        msg: String,
    },
    NewRound,
    /// An inbound order was processed: its fills and posted remainder.
    Exec {
        order: Order,
        exec: ExecReport,
    },
    /// An order is fully out of the book (fill, cancel, or round end).
    Out {
        order: Order,
    },
    RoundOver(RoundResults),
    /// Cumulative scores after settling a round.
    Scores {
        scores: BTreeMap<Username, Cash>,
    },
}

/// One element of a subscriber's update stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerUpdate {
    Broadcast(Broadcast),
    /// The receiver's own hand. The one truly private datum.
    Hand(Hand),
    Market(BookSnapshot),
}
