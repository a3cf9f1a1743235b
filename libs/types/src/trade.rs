//! Execution records
//!
//! An `ExecReport` is what matching an inbound order produces: the fills
//! against resting orders plus whatever remainder was posted to the book.

use serde::{Deserialize, Serialize};

use crate::ids::OrderId;
use crate::numeric::{Price, Size};

/// One atomic transfer between the inbound order and a resting order.
///
/// The price is the resting order's price: price-time priority means the
/// earlier order's price stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub counterparty: OrderId,
    pub size: Size,
    pub price: Price,
}

/// Result of matching one inbound order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecReport {
    pub fills: Vec<Fill>,
    /// Unmatched size posted to the book (zero if fully filled).
    pub remainder_posted: Size,
}

impl ExecReport {
    /// Total size transferred by the fills.
    pub fn filled_size(&self) -> Size {
        self.fills.iter().map(|f| f.size).sum()
    }
}
