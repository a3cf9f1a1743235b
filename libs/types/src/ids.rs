//! Identifier types: usernames, order ids, seats
//!
//! Order ids are client-assigned and dense per connection so clients can
//! correlate executions with their own orders before the ack returns; the
//! engine only checks uniqueness per `(owner, round)`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::GameError;

/// Client-assigned order identifier, unique per owner for one round.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated username: non-empty, at most 32 chars, no whitespace or
/// control characters. Equality is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

const MAX_USERNAME_LEN: usize = 32;

impl Username {
    pub fn new(name: impl Into<String>) -> Result<Self, GameError> {
        let name = name.into();
        if name.is_empty()
            || name.chars().count() > MAX_USERNAME_LEN
            || name.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(GameError::InvalidUsername);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Validate on the way in so a Username in hand is always well-formed.
impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Username::new(s).map_err(|_| serde::de::Error::custom("invalid username"))
    }
}

/// Table position. `Sit_anywhere` takes the first free seat in `ALL` order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Seat {
    North,
    East,
    South,
    West,
}

impl Seat {
    pub const ALL: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Seat::North => "North",
            Seat::East => "East",
            Seat::South => "South",
            Seat::West => "West",
        };
        write!(f, "{}", name)
    }
}
