//! Price-time-priority matching
//!
//! Matches one inbound order against the opposite half-book. The resting
//! order's price always stands. A resting order from the same owner is
//! cancelled instead of filled, and the loop continues past it.

use types::prelude::*;

use crate::book::{Book, RestingEntry};

/// Whether an inbound order at `taker` crosses a resting order at `resting`.
pub fn crosses(dir: Dir, taker: Price, resting: Price) -> bool {
    match dir {
        Dir::Buy => taker >= resting,
        Dir::Sell => taker <= resting,
    }
}

/// One fill from the maker's side: who was hit and what remains of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerFill {
    pub maker: Order,
    pub maker_remaining_after: Size,
    pub fill: Fill,
}

/// Everything one inbound order did to the book.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Resting orders of the same owner cancelled by the self-cross rule,
    /// in the order they were encountered.
    pub self_cancelled: Vec<Order>,
    /// Fills in match order.
    pub maker_fills: Vec<MakerFill>,
    /// Unmatched size that was posted to the book.
    pub remainder_posted: Size,
}

impl MatchOutcome {
    /// The wire-shaped report for the `Exec` broadcast.
    pub fn exec_report(&self) -> ExecReport {
        ExecReport {
            fills: self.maker_fills.iter().map(|mf| mf.fill).collect(),
            remainder_posted: self.remainder_posted,
        }
    }
}

/// Match `taker` against the book, posting any remainder.
///
/// `next_seq` is the room-monotonic entry sequence; it advances only when
/// a remainder actually rests. The caller settles hand and cash transfers
/// from the returned fills.
pub fn match_order(book: &mut Book, taker: &Order, next_seq: &mut u64) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let mut remaining = taker.size;

    let opposite = book.half_mut(taker.suit, taker.dir.other());
    while !remaining.is_zero() {
        let Some(best) = opposite.peek_best() else {
            break;
        };
        if !crosses(taker.dir, taker.price, best.order.price) {
            break;
        }

        if best.order.owner == taker.owner {
            // Self-cross: the resting order comes out, no fill.
            let cancelled = opposite.pop_best().expect("peeked entry exists");
            outcome.self_cancelled.push(cancelled.order);
            continue;
        }

        let fill_size = remaining.min(best.remaining);
        let fill_price = best.order.price;
        let maker = best.order.clone();
        let maker_remaining_after = best
            .remaining
            .checked_sub(fill_size)
            .expect("fill never exceeds resting size");

        outcome.maker_fills.push(MakerFill {
            maker,
            maker_remaining_after,
            fill: Fill {
                counterparty: best.order.id,
                size: fill_size,
                price: fill_price,
            },
        });

        remaining = remaining
            .checked_sub(fill_size)
            .expect("fill never exceeds taker size");

        if maker_remaining_after.is_zero() {
            opposite.pop_best();
        } else {
            opposite
                .peek_best_mut()
                .expect("peeked entry exists")
                .remaining = maker_remaining_after;
        }
    }

    if !remaining.is_zero() {
        *next_seq += 1;
        book.half_mut(taker.suit, taker.dir).add(RestingEntry {
            order: taker.clone(),
            remaining,
            seq: *next_seq,
        });
        outcome.remainder_posted = remaining;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(owner: &str, id: u64, dir: Dir, price: u32, size: u32) -> Order {
        Order {
            id: OrderId::new(id),
            owner: Username::new(owner).unwrap(),
            suit: Suit::Hearts,
            dir,
            price: Price::new(price),
            size: Size::new(size),
        }
    }

    fn place(book: &mut Book, seq: &mut u64, o: Order) -> MatchOutcome {
        match_order(book, &o, seq)
    }

    #[test]
    fn test_no_cross_rests() {
        let mut book = Book::new();
        let mut seq = 0;

        place(&mut book, &mut seq, order("a", 1, Dir::Sell, 10, 2));
        let outcome = place(&mut book, &mut seq, order("b", 1, Dir::Buy, 9, 2));

        assert!(outcome.maker_fills.is_empty());
        assert_eq!(outcome.remainder_posted, Size::new(2));
        assert_eq!(book.half(Suit::Hearts, Dir::Buy).len(), 1);
        assert_eq!(book.half(Suit::Hearts, Dir::Sell).len(), 1);
    }

    #[test]
    fn test_resting_price_stands() {
        // Resting buy at 10, inbound sell at 8: trade prints at 10.
        let mut book = Book::new();
        let mut seq = 0;

        place(&mut book, &mut seq, order("a", 1, Dir::Buy, 10, 3));
        let outcome = place(&mut book, &mut seq, order("b", 1, Dir::Sell, 8, 2));

        assert_eq!(outcome.maker_fills.len(), 1);
        let mf = &outcome.maker_fills[0];
        assert_eq!(mf.fill.price, Price::new(10));
        assert_eq!(mf.fill.size, Size::new(2));
        assert_eq!(mf.maker_remaining_after, Size::new(1));
        assert_eq!(outcome.remainder_posted, Size::ZERO);

        // Buy still rests with 1 remaining
        let best = book.half(Suit::Hearts, Dir::Buy).peek_best().unwrap();
        assert_eq!(best.remaining, Size::new(1));
    }

    #[test]
    fn test_walks_multiple_levels_in_priority_order() {
        let mut book = Book::new();
        let mut seq = 0;

        place(&mut book, &mut seq, order("a", 1, Dir::Sell, 5, 1));
        place(&mut book, &mut seq, order("b", 1, Dir::Sell, 6, 1));
        place(&mut book, &mut seq, order("c", 1, Dir::Sell, 7, 1));

        let outcome = place(&mut book, &mut seq, order("d", 1, Dir::Buy, 6, 3));

        // Fills the 5 then the 6; the 7 does not cross.
        let prices: Vec<u32> = outcome
            .maker_fills
            .iter()
            .map(|mf| mf.fill.price.get())
            .collect();
        assert_eq!(prices, vec![5, 6]);
        assert_eq!(outcome.remainder_posted, Size::new(1));
        assert_eq!(book.half(Suit::Hearts, Dir::Sell).len(), 1);
        assert_eq!(book.half(Suit::Hearts, Dir::Buy).len(), 1);
    }

    #[test]
    fn test_fifo_at_equal_price() {
        let mut book = Book::new();
        let mut seq = 0;

        place(&mut book, &mut seq, order("a", 1, Dir::Sell, 5, 1));
        place(&mut book, &mut seq, order("b", 1, Dir::Sell, 5, 1));

        let outcome = place(&mut book, &mut seq, order("c", 1, Dir::Buy, 5, 1));

        assert_eq!(outcome.maker_fills.len(), 1);
        assert_eq!(
            outcome.maker_fills[0].maker.owner,
            Username::new("a").unwrap()
        );
    }

    #[test]
    fn test_self_cross_cancels_resting_without_fill() {
        let mut book = Book::new();
        let mut seq = 0;

        place(&mut book, &mut seq, order("a", 1, Dir::Buy, 9, 5));
        let outcome = place(&mut book, &mut seq, order("a", 2, Dir::Sell, 9, 2));

        assert_eq!(outcome.self_cancelled.len(), 1);
        assert_eq!(outcome.self_cancelled[0].id, OrderId::new(1));
        assert!(outcome.maker_fills.is_empty());
        assert_eq!(outcome.remainder_posted, Size::new(2));

        assert!(book.half(Suit::Hearts, Dir::Buy).is_empty());
        assert_eq!(book.half(Suit::Hearts, Dir::Sell).len(), 1);
    }

    #[test]
    fn test_self_cross_skips_to_next_maker() {
        // Own order is best; behind it rests a crossing order from
        // someone else. The own order cancels, the other one fills.
        let mut book = Book::new();
        let mut seq = 0;

        place(&mut book, &mut seq, order("a", 1, Dir::Buy, 10, 1));
        place(&mut book, &mut seq, order("b", 1, Dir::Buy, 9, 1));

        let outcome = place(&mut book, &mut seq, order("a", 2, Dir::Sell, 9, 1));

        assert_eq!(outcome.self_cancelled.len(), 1);
        assert_eq!(outcome.maker_fills.len(), 1);
        assert_eq!(
            outcome.maker_fills[0].maker.owner,
            Username::new("b").unwrap()
        );
        assert_eq!(outcome.maker_fills[0].fill.price, Price::new(9));
        assert_eq!(outcome.remainder_posted, Size::ZERO);
    }

    #[test]
    fn test_zero_price_orders_match() {
        let mut book = Book::new();
        let mut seq = 0;

        place(&mut book, &mut seq, order("a", 1, Dir::Sell, 0, 1));
        let outcome = place(&mut book, &mut seq, order("b", 1, Dir::Buy, 0, 1));

        assert_eq!(outcome.maker_fills.len(), 1);
        assert_eq!(outcome.maker_fills[0].fill.price, Price::ZERO);
    }
}
