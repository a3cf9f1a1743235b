//! The full order book: four suits, two sides each

pub mod half_book;

pub use half_book::{HalfBook, RestingEntry};

use protocol::{BookSnapshot, RestingOrder};
use types::prelude::*;

/// All resting orders for a round.
#[derive(Debug, Clone)]
pub struct Book {
    suits: SuitMap<DirPair<HalfBook>>,
}

impl Book {
    pub fn new() -> Self {
        Self {
            suits: SuitMap::build(|_| DirPair::build(HalfBook::new)),
        }
    }

    pub fn half(&self, suit: Suit, dir: Dir) -> &HalfBook {
        self.suits.get(suit).get(dir)
    }

    pub fn half_mut(&mut self, suit: Suit, dir: Dir) -> &mut HalfBook {
        self.suits.get_mut(suit).get_mut(dir)
    }

    /// Find and remove one resting order by `(owner, id)` across all books.
    pub fn remove_by_id(&mut self, owner: &Username, id: OrderId) -> Option<RestingEntry> {
        for suit in Suit::ALL {
            for dir in [Dir::Buy, Dir::Sell] {
                if let Some(entry) = self.half_mut(suit, dir).remove(owner, id) {
                    return Some(entry);
                }
            }
        }
        None
    }

    /// Remove every resting order for `owner`, suits in canonical order,
    /// buys before sells, priority order within each half-book.
    pub fn cancel_by_owner(&mut self, owner: &Username) -> Vec<RestingEntry> {
        let mut removed = Vec::new();
        for suit in Suit::ALL {
            for dir in [Dir::Buy, Dir::Sell] {
                removed.extend(self.half_mut(suit, dir).cancel_by_owner(owner));
            }
        }
        removed
    }

    /// Drain the whole book in the same deterministic order, for round end.
    pub fn drain_all(&mut self) -> Vec<RestingEntry> {
        let mut drained = Vec::new();
        for suit in Suit::ALL {
            for dir in [Dir::Buy, Dir::Sell] {
                drained.extend(self.half_mut(suit, dir).drain());
            }
        }
        drained
    }

    /// Total unfilled sell size `owner` has resting on `suit`. Drives the
    /// sell-coverage check: a player may never promise more cards than
    /// they hold.
    pub fn resting_sells_for(&self, owner: &Username, suit: Suit) -> Size {
        self.half(suit, Dir::Sell).resting_size_for(owner)
    }

    pub fn is_empty(&self) -> bool {
        self.suits
            .iter()
            .all(|(_, pair)| pair.iter().all(|(_, half)| half.is_empty()))
    }

    /// Public view of the book.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot(SuitMap::build(|suit| {
            DirPair::build(|dir| {
                self.half(suit, dir)
                    .iter()
                    .map(|e| RestingOrder {
                        id: e.order.id,
                        owner: e.order.owner.clone(),
                        price: e.order.price,
                        size: e.remaining,
                    })
                    .collect()
            })
        }))
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting(owner: &str, id: u64, suit: Suit, dir: Dir, price: u32, size: u32, seq: u64) -> RestingEntry {
        RestingEntry {
            order: Order {
                id: OrderId::new(id),
                owner: Username::new(owner).unwrap(),
                suit,
                dir,
                price: Price::new(price),
                size: Size::new(size),
            },
            remaining: Size::new(size),
            seq,
        }
    }

    #[test]
    fn test_remove_by_id_searches_all_books() {
        let mut book = Book::new();
        book.half_mut(Suit::Clubs, Dir::Sell)
            .add(resting("a", 3, Suit::Clubs, Dir::Sell, 9, 1, 1));

        let alice = Username::new("a").unwrap();
        assert!(book.remove_by_id(&alice, OrderId::new(3)).is_some());
        assert!(book.remove_by_id(&alice, OrderId::new(3)).is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn test_drain_all_is_deterministic() {
        let mut book = Book::new();
        book.half_mut(Suit::Clubs, Dir::Buy)
            .add(resting("a", 1, Suit::Clubs, Dir::Buy, 5, 1, 3));
        book.half_mut(Suit::Spades, Dir::Sell)
            .add(resting("b", 2, Suit::Spades, Dir::Sell, 7, 1, 2));
        book.half_mut(Suit::Spades, Dir::Buy)
            .add(resting("c", 3, Suit::Spades, Dir::Buy, 4, 1, 1));

        let suits: Vec<(Suit, Dir)> = book
            .drain_all()
            .into_iter()
            .map(|e| (e.order.suit, e.order.dir))
            .collect();
        assert_eq!(
            suits,
            vec![
                (Suit::Spades, Dir::Buy),
                (Suit::Spades, Dir::Sell),
                (Suit::Clubs, Dir::Buy),
            ]
        );
        assert!(book.is_empty());
    }

    #[test]
    fn test_snapshot_reflects_remaining_size() {
        let mut book = Book::new();
        let mut entry = resting("a", 1, Suit::Hearts, Dir::Buy, 10, 5, 1);
        entry.remaining = Size::new(2);
        book.half_mut(Suit::Hearts, Dir::Buy).add(entry);

        let snapshot = book.snapshot();
        let best = snapshot.best(Suit::Hearts, Dir::Buy).unwrap();
        assert_eq!(best.size, Size::new(2));
        assert_eq!(best.price, Price::new(10));
    }
}
