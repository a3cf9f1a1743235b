//! Noise trader — random liquidity inside a price band
//!
//! Throws small orders at random suits to keep markets moving. Sells only
//! what the hand covers, so its orders never bounce off the coverage
//! check.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use types::prelude::*;

use crate::tracker::Tracker;

use super::{Quote, Strategy};

#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// Highest price the bot will quote.
    pub price_band: u32,
    /// Lots per order.
    pub order_size: u32,
    /// Chance out of 100 of quoting at all on a tick.
    pub activity_pct: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            price_band: 20,
            order_size: 1,
            activity_pct: 80,
        }
    }
}

pub struct NoiseTrader {
    config: NoiseConfig,
    rng: ChaCha8Rng,
}

impl NoiseTrader {
    pub fn new(config: NoiseConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Strategy for NoiseTrader {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn quotes(&mut self, tracker: &Tracker) -> Vec<Quote> {
        if self.rng.random_range(0..100) >= self.config.activity_pct {
            return Vec::new();
        }

        let suit = Suit::ALL[self.rng.random_range(0..4)];
        let anchor = tracker.last_trade[suit]
            .map(|p| p.get())
            .unwrap_or(self.config.price_band / 2)
            .max(1);
        let price = self
            .rng
            .random_range(anchor.saturating_sub(3).max(1)..anchor + 4)
            .min(self.config.price_band);

        let dir = if self.rng.random_range(0..2) == 0 {
            Dir::Buy
        } else {
            Dir::Sell
        };
        let size = Size::new(self.config.order_size);

        // Never promise cards we do not hold.
        if dir == Dir::Sell && tracker.hand.get(suit) < size {
            return Vec::new();
        }

        vec![Quote {
            suit,
            dir,
            price: Price::new(price),
            size,
        }]
    }
}
