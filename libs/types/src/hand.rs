//! Hands and the observer's partial view of them
//!
//! A `Hand` is a total per-suit card count. Trading moves cards between
//! hands; the deck total per suit is invariant across players, which the
//! engine audits after every command.

use serde::{Deserialize, Serialize};

use crate::numeric::Size;
use crate::suit::{Suit, SuitMap};

/// Per-suit card counts for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand(SuitMap<Size>);

impl Hand {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(f: impl FnMut(Suit) -> Size) -> Self {
        Self(SuitMap::build(f))
    }

    pub fn get(&self, suit: Suit) -> Size {
        *self.0.get(suit)
    }

    /// Total cards across all suits.
    pub fn total(&self) -> Size {
        self.0.iter().map(|(_, s)| *s).sum()
    }

    pub fn add(&mut self, suit: Suit, size: Size) {
        *self.0.get_mut(suit) += size;
    }

    /// Remove cards of one suit. `None` means the hand did not hold that
    /// many, which callers must treat as a conservation failure.
    pub fn remove(&mut self, suit: Suit, size: Size) -> Option<()> {
        let held = *self.0.get(suit);
        let left = held.checked_sub(size)?;
        *self.0.get_mut(suit) = left;
        Some(())
    }

    /// Pointwise combination of two hands.
    pub fn map2(a: &Hand, b: &Hand, f: impl FnMut(&Size, &Size) -> Size) -> Hand {
        Hand(SuitMap::map2(&a.0, &b.0, f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Suit, Size)> + '_ {
        self.0.iter().map(|(s, v)| (s, *v))
    }
}

/// What an observer knows about another player's hand.
///
/// `known` accumulates only from public executions; `unknown_total` is the
/// count of cards never revealed. `known.total() + unknown_total` equals
/// the player's current hand size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialHand {
    pub known: Hand,
    pub unknown_total: Size,
}

impl PartialHand {
    /// Fresh view of an unseen hand of `total` cards.
    pub fn unseen(total: Size) -> Self {
        Self {
            known: Hand::empty(),
            unknown_total: total,
        }
    }

    /// The player publicly bought `size` of `suit`.
    pub fn observe_gain(&mut self, suit: Suit, size: Size) {
        self.known.add(suit, size);
    }

    /// The player publicly sold `size` of `suit`.
    ///
    /// Cards beyond what we had already seen must have come from the
    /// unseen remainder, so sells reveal hidden holdings.
    pub fn observe_loss(&mut self, suit: Suit, size: Size) {
        let seen = self.known.get(suit);
        if self.known.remove(suit, size).is_none() {
            let from_unknown = size.checked_sub(seen).unwrap_or(Size::ZERO);
            self.known.remove(suit, seen);
            self.unknown_total = self
                .unknown_total
                .checked_sub(from_unknown)
                .unwrap_or(Size::ZERO);
        }
    }

    /// Lower bound on how many of `suit` the player currently holds.
    pub fn min_held(&self, suit: Suit) -> Size {
        self.known.get(suit)
    }

    /// Total cards the player currently holds.
    pub fn total(&self) -> Size {
        self.known.total() + self.unknown_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(spades: u32, hearts: u32, diamonds: u32, clubs: u32) -> Hand {
        Hand::build(|s| {
            Size::new(match s {
                Suit::Spades => spades,
                Suit::Hearts => hearts,
                Suit::Diamonds => diamonds,
                Suit::Clubs => clubs,
            })
        })
    }

    #[test]
    fn test_total() {
        assert_eq!(hand(2, 3, 4, 1).total(), Size::new(10));
    }

    #[test]
    fn test_add_remove() {
        let mut h = hand(2, 3, 4, 1);
        h.add(Suit::Hearts, Size::new(2));
        assert_eq!(h.get(Suit::Hearts), Size::new(5));

        assert!(h.remove(Suit::Clubs, Size::new(1)).is_some());
        assert_eq!(h.get(Suit::Clubs), Size::ZERO);

        // Underflow is reported, not clamped
        assert!(h.remove(Suit::Clubs, Size::new(1)).is_none());
    }

    #[test]
    fn test_map2() {
        let sum = Hand::map2(&hand(1, 1, 1, 1), &hand(0, 2, 0, 2), |a, b| *a + *b);
        assert_eq!(sum, hand(1, 3, 1, 3));
    }

    #[test]
    fn test_partial_hand_gain() {
        let mut view = PartialHand::unseen(Size::new(10));
        view.observe_gain(Suit::Spades, Size::new(2));

        assert_eq!(view.min_held(Suit::Spades), Size::new(2));
        assert_eq!(view.total(), Size::new(12));
    }

    #[test]
    fn test_partial_hand_loss_reveals_hidden_cards() {
        // We have never seen this player touch Hearts; a 3-lot sell proves
        // three of their unseen cards were Hearts.
        let mut view = PartialHand::unseen(Size::new(10));
        view.observe_loss(Suit::Hearts, Size::new(3));

        assert_eq!(view.min_held(Suit::Hearts), Size::ZERO);
        assert_eq!(view.unknown_total, Size::new(7));
        assert_eq!(view.total(), Size::new(7));
    }

    #[test]
    fn test_partial_hand_loss_spends_known_first() {
        let mut view = PartialHand::unseen(Size::new(10));
        view.observe_gain(Suit::Hearts, Size::new(2));
        view.observe_loss(Suit::Hearts, Size::new(3));

        // 2 from known, 1 from unknown
        assert_eq!(view.min_held(Suit::Hearts), Size::ZERO);
        assert_eq!(view.unknown_total, Size::new(9));
        assert_eq!(view.total(), Size::new(9));
    }
}
