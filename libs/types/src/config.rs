//! Game configuration
//!
//! Pot, bonus, and timing are configuration rather than constants; the
//! defaults here are the standard table. The deck shape is fixed: 40 cards
//! in the multiset {8, 10, 10, 12}, ten dealt to each of four players.

use std::time::Duration;

use crate::numeric::{Cash, Price};

/// The deck's per-suit size multiset. Which suit gets which count is
/// decided by the deal.
pub const DECK_SHAPE: [u32; 4] = [8, 10, 10, 12];

/// Cards per player at the deal.
pub const HAND_SIZE: u32 = 10;

/// Seated players required to start a round.
pub const PLAYERS_PER_ROOM: usize = 4;

/// Per-room tunables.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Reward paid to the player(s) holding the most gold-suit cards.
    pub pot: u32,
    /// Paid per gold-suit card held at round end.
    pub per_gold_card_bonus: u32,
    /// Round length from deal to scoring.
    pub round_duration: Duration,
    /// Cap on users (players + observers) in one room.
    pub max_users: usize,
    /// Per-subscriber update queue capacity before the subscriber is dropped.
    pub fanout_capacity: usize,
    /// Deal RNG seed. `None` seeds from entropy; tests pin it.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pot: 100,
            per_gold_card_bonus: 10,
            round_duration: Duration::from_secs(240),
            max_users: 16,
            fanout_capacity: 1024,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Highest accepted order price: `100 × pot`.
    pub fn max_price(&self) -> Price {
        Price::new(self.pot.saturating_mul(100))
    }

    pub fn pot_cash(&self) -> Cash {
        Cash::new(i64::from(self.pot))
    }

    pub fn bonus_cash(&self) -> Cash {
        Cash::new(i64::from(self.per_gold_card_bonus))
    }
}
