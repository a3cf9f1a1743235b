//! Limit orders
//!
//! Orders are GTC for the lifetime of one round: they leave the book by
//! full fill, explicit cancel, or round end.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::errors::GameError;
use crate::ids::{OrderId, Username};
use crate::numeric::{Price, Size};
use crate::suit::{Dir, Suit};

/// A limit order on one suit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: Username,
    pub suit: Suit,
    pub dir: Dir,
    pub price: Price,
    pub size: Size,
}

impl Order {
    /// Static validity checks, independent of book and hand state.
    pub fn validate(&self, config: &GameConfig) -> Result<(), GameError> {
        if self.size.is_zero() {
            return Err(GameError::SizeMustBePositive);
        }
        if self.price > config.max_price() {
            return Err(GameError::PriceTooHigh);
        }
        Ok(())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} @ {} (#{})",
            self.owner, self.dir, self.size, self.suit, self.price, self.id
        )
    }
}
