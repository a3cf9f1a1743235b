//! Bot strategies
//!
//! A strategy turns tracked market state into desired orders once per
//! quote tick. Strategies are deterministic under a seed so simulations
//! replay.

pub mod fundamental;
pub mod noise;

use types::prelude::*;

use crate::tracker::Tracker;

/// An order a strategy wants on the book this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub suit: Suit,
    pub dir: Dir,
    pub price: Price,
    pub size: Size,
}

pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// Orders to place this tick. Called only while a round is running.
    fn quotes(&mut self, tracker: &Tracker) -> Vec<Quote>;
}

/// Construct a strategy by CLI name.
pub fn by_name(name: &str, seed: u64) -> Option<Box<dyn Strategy>> {
    match name {
        "noise" => Some(Box::new(noise::NoiseTrader::new(
            noise::NoiseConfig::default(),
            seed,
        ))),
        "fundamental" => Some(Box::new(fundamental::Fundamentalist::new(
            fundamental::FundamentalConfig::default(),
            seed,
        ))),
        _ => None,
    }
}
