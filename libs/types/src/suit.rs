//! Suits, order directions, and total maps indexed by them
//!
//! `SuitMap` and `DirPair` are the backbone of the book and hand types:
//! total, fixed-size maps with deterministic iteration order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card suit. Also the trading symbol: each suit has its own order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

/// Suit color, used by the gold-suit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Black,
    Red,
}

impl Suit {
    /// All suits, in the canonical order used for iteration and encoding.
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn color(self) -> Color {
        match self {
            Suit::Spades | Suit::Clubs => Color::Black,
            Suit::Hearts | Suit::Diamonds => Color::Red,
        }
    }

    /// The other suit of the same color (Spades↔Clubs, Hearts↔Diamonds).
    ///
    /// The gold suit is the same-color partner of the twelve-card suit.
    pub fn same_color_partner(self) -> Suit {
        match self {
            Suit::Spades => Suit::Clubs,
            Suit::Clubs => Suit::Spades,
            Suit::Hearts => Suit::Diamonds,
            Suit::Diamonds => Suit::Hearts,
        }
    }

    fn index(self) -> usize {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Diamonds => 2,
            Suit::Clubs => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suit::Spades => "Spades",
            Suit::Hearts => "Hearts",
            Suit::Diamonds => "Diamonds",
            Suit::Clubs => "Clubs",
        };
        write!(f, "{}", name)
    }
}

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dir {
    Buy,
    Sell,
}

impl Dir {
    /// Get the opposite direction.
    pub fn other(self) -> Self {
        match self {
            Dir::Buy => Dir::Sell,
            Dir::Sell => Dir::Buy,
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dir::Buy => write!(f, "Buy"),
            Dir::Sell => write!(f, "Sell"),
        }
    }
}

/// A pair of values indexed by [`Dir`].
///
/// `get` and `modify` are the only accessors; code that pattern-matches on
/// direction should go through them rather than naming the fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirPair<T> {
    buy: T,
    sell: T,
}

impl<T> DirPair<T> {
    pub fn new(buy: T, sell: T) -> Self {
        Self { buy, sell }
    }

    /// Build a pair by evaluating `f` once per direction.
    pub fn build(mut f: impl FnMut(Dir) -> T) -> Self {
        Self {
            buy: f(Dir::Buy),
            sell: f(Dir::Sell),
        }
    }

    pub fn get(&self, dir: Dir) -> &T {
        match dir {
            Dir::Buy => &self.buy,
            Dir::Sell => &self.sell,
        }
    }

    pub fn get_mut(&mut self, dir: Dir) -> &mut T {
        match dir {
            Dir::Buy => &mut self.buy,
            Dir::Sell => &mut self.sell,
        }
    }

    /// Apply `f` to the value for `dir`, returning its result.
    pub fn modify<R>(&mut self, dir: Dir, f: impl FnOnce(&mut T) -> R) -> R {
        f(self.get_mut(dir))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dir, &T)> {
        [(Dir::Buy, &self.buy), (Dir::Sell, &self.sell)].into_iter()
    }
}

/// A total map `Suit → T` backed by a fixed array.
///
/// Iteration follows [`Suit::ALL`], which keeps every traversal in the
/// engine deterministic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuitMap<T>([T; 4]);

impl<T> SuitMap<T> {
    /// Build a map by evaluating `f` once per suit in canonical order.
    pub fn build(mut f: impl FnMut(Suit) -> T) -> Self {
        Self(Suit::ALL.map(&mut f))
    }

    pub fn get(&self, suit: Suit) -> &T {
        &self.0[suit.index()]
    }

    pub fn get_mut(&mut self, suit: Suit) -> &mut T {
        &mut self.0[suit.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Suit, &T)> {
        Suit::ALL.iter().map(move |&s| (s, self.get(s)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> SuitMap<U> {
        SuitMap::build(|s| f(self.get(s)))
    }

    /// Pointwise combination of two maps.
    pub fn map2<U, V>(a: &SuitMap<T>, b: &SuitMap<U>, mut f: impl FnMut(&T, &U) -> V) -> SuitMap<V> {
        SuitMap::build(|s| f(a.get(s), b.get(s)))
    }
}

impl<T> std::ops::Index<Suit> for SuitMap<T> {
    type Output = T;

    fn index(&self, suit: Suit) -> &T {
        self.get(suit)
    }
}

impl<T> std::ops::IndexMut<Suit> for SuitMap<T> {
    fn index_mut(&mut self, suit: Suit) -> &mut T {
        self.get_mut(suit)
    }
}
