//! Fundamentalist — trades toward the inferred gold suit
//!
//! Estimates which suit is the twelve from everything publicly revealed,
//! then accumulates the partner suit below its bonus value and sheds
//! everything else. Quotes skew harder as more of the deck is revealed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use types::prelude::*;

use crate::tracker::Tracker;

use super::{Quote, Strategy};

#[derive(Debug, Clone)]
pub struct FundamentalConfig {
    /// Value of one gold card at settlement.
    pub gold_card_value: u32,
    /// Top price paid for a suspected gold card.
    pub max_gold_bid: u32,
    /// Floor when dumping non-gold suits.
    pub min_dump_ask: u32,
}

impl Default for FundamentalConfig {
    fn default() -> Self {
        Self {
            gold_card_value: 10,
            max_gold_bid: 9,
            min_dump_ask: 2,
        }
    }
}

pub struct Fundamentalist {
    config: FundamentalConfig,
    rng: ChaCha8Rng,
}

impl Fundamentalist {
    pub fn new(config: FundamentalConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Confidence in the gold guess: share of the deck accounted for,
    /// from 0 to 100.
    fn confidence(&self, tracker: &Tracker) -> u32 {
        let revealed: Size = Suit::ALL
            .into_iter()
            .map(|s| tracker.known_count(s))
            .sum();
        (revealed.get() * 100 / 40).min(100)
    }
}

impl Strategy for Fundamentalist {
    fn name(&self) -> &'static str {
        "fundamental"
    }

    fn quotes(&mut self, tracker: &Tracker) -> Vec<Quote> {
        let gold = tracker.gold_guess();
        let confidence = self.confidence(tracker);
        let mut quotes = Vec::new();

        // Bid for the suspected gold suit, up to just under its bonus
        // value, creeping higher as the picture firms up.
        let bid = (self.config.gold_card_value * confidence / 100)
            .clamp(1, self.config.max_gold_bid);
        let improve = tracker
            .best(gold, Dir::Buy)
            .map(|p| p.get() + 1)
            .unwrap_or(bid);
        quotes.push(Quote {
            suit: gold,
            dir: Dir::Buy,
            price: Price::new(improve.min(bid)),
            size: Size::new(1),
        });

        // Dump one lot of the largest non-gold holding at a jittered ask.
        let dump = Suit::ALL
            .into_iter()
            .filter(|&s| s != gold)
            .max_by_key(|&s| tracker.hand.get(s));
        if let Some(suit) = dump {
            if !tracker.hand.get(suit).is_zero() {
                let ask = self.config.min_dump_ask + self.rng.random_range(0..3);
                quotes.push(Quote {
                    suit,
                    dir: Dir::Sell,
                    price: Price::new(ask),
                    size: Size::new(1),
                });
            }
        }

        quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Broadcast, PlayerUpdate};

    fn username(s: &str) -> Username {
        Username::new(s).unwrap()
    }

    fn tracker() -> Tracker {
        let mut t = Tracker::new(username("me"));
        t.observe(&PlayerUpdate::Broadcast(Broadcast::PlayerJoined {
            username: username("opp"),
        }));
        t.observe(&PlayerUpdate::Broadcast(Broadcast::NewRound));
        t
    }

    #[test]
    fn test_bids_partner_of_biggest_suit() {
        let mut t = tracker();
        // Our own hand is heavy in diamonds; gold guess is hearts.
        t.hand = Hand::build(|s| Size::new(if s == Suit::Diamonds { 6 } else { 1 }));

        let mut bot = Fundamentalist::new(FundamentalConfig::default(), 1);
        let quotes = bot.quotes(&t);

        let gold_bid = quotes.iter().find(|q| q.dir == Dir::Buy).unwrap();
        assert_eq!(gold_bid.suit, Suit::Hearts);
        assert!(gold_bid.price <= Price::new(9));
    }

    #[test]
    fn test_never_bids_above_bonus_value() {
        let mut t = tracker();
        t.hand = Hand::build(|_| Size::new(2));

        let mut bot = Fundamentalist::new(FundamentalConfig::default(), 2);
        for _ in 0..50 {
            for quote in bot.quotes(&t) {
                if quote.dir == Dir::Buy {
                    assert!(quote.price <= Price::new(9));
                }
            }
        }
    }

    #[test]
    fn test_dumps_only_held_suits() {
        let mut t = tracker();
        t.hand = Hand::build(|s| Size::new(if s == Suit::Clubs { 3 } else { 0 }));

        let mut bot = Fundamentalist::new(FundamentalConfig::default(), 3);
        let quotes = bot.quotes(&t);

        for quote in quotes.iter().filter(|q| q.dir == Dir::Sell) {
            assert!(!t.hand.get(quote.suit).is_zero());
        }
    }

    #[test]
    fn test_deterministic_under_seed() {
        let mut t = tracker();
        t.hand = Hand::build(|_| Size::new(2));

        let mut a = Fundamentalist::new(FundamentalConfig::default(), 5);
        let mut b = Fundamentalist::new(FundamentalConfig::default(), 5);
        for _ in 0..20 {
            assert_eq!(a.quotes(&t), b.quotes(&t));
        }
    }
}
