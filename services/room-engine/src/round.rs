//! One deal-to-scoring cycle
//!
//! A round owns the dealt hands, the realized cash, the live book, and the
//! clock. The deal picks the twelve-card suit at random; its same-color
//! partner gets eight cards and is the gold suit, the other color's suits
//! get ten each.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use types::config::{DECK_SHAPE, HAND_SIZE, PLAYERS_PER_ROOM};
use types::prelude::*;

use crate::book::Book;

/// The outcome of shuffling and dealing one deck.
#[derive(Debug, Clone)]
pub struct Deal {
    pub gold: Suit,
    /// How many cards of each suit the deck held.
    pub counts: SuitMap<Size>,
    /// One ten-card hand per player, in seating order.
    pub hands: Vec<Hand>,
}

/// Assign suit sizes, build the deck, and deal four hands.
///
/// The twelve-card suit is drawn at random; the eight always lands on its
/// same-color partner, so the gold suit is the eight-card suit.
pub fn deal(rng: &mut ChaCha8Rng) -> Deal {
    let twelve_suit = Suit::ALL[rng.random_range(0..4)];
    let gold = twelve_suit.same_color_partner();
    let counts = SuitMap::build(|s| {
        Size::new(if s == twelve_suit {
            12
        } else if s == gold {
            8
        } else {
            10
        })
    });

    let mut deck = Vec::with_capacity(40);
    for suit in Suit::ALL {
        for _ in 0..counts[suit].get() {
            deck.push(suit);
        }
    }
    deck.shuffle(rng);

    let hands = deck
        .chunks(HAND_SIZE as usize)
        .map(|cards| {
            let mut hand = Hand::empty();
            for &suit in cards {
                hand.add(suit, Size::new(1));
            }
            hand
        })
        .collect();

    Deal {
        gold,
        counts,
        hands,
    }
}

/// Live state of a round in progress.
#[derive(Debug)]
pub struct Round {
    pub gold: Suit,
    /// Per-suit deck totals at the deal; the conservation baseline.
    pub initial_counts: SuitMap<Size>,
    pub hands: BTreeMap<Username, Hand>,
    pub cash: BTreeMap<Username, Cash>,
    pub book: Book,
    pub next_entry_seq: u64,
    used_ids: BTreeMap<Username, BTreeSet<OrderId>>,
    started_at: Instant,
    duration: Duration,
}

impl Round {
    /// Deal a new round for exactly four players.
    pub fn start(
        players: &[Username],
        rng: &mut ChaCha8Rng,
        now: Instant,
        duration: Duration,
    ) -> Self {
        assert_eq!(players.len(), PLAYERS_PER_ROOM, "rounds take four players");

        let dealt = deal(rng);
        let hands: BTreeMap<Username, Hand> = players
            .iter()
            .cloned()
            .zip(dealt.hands.iter().copied())
            .collect();
        let cash = players.iter().cloned().map(|u| (u, Cash::ZERO)).collect();

        Self {
            gold: dealt.gold,
            initial_counts: dealt.counts,
            hands,
            cash,
            book: Book::new(),
            next_entry_seq: 0,
            used_ids: BTreeMap::new(),
            started_at: now,
            duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.started_at) >= self.duration
    }

    pub fn time_remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.duration_since(self.started_at))
    }

    pub fn deadline(&self) -> Instant {
        self.started_at + self.duration
    }

    pub fn is_player(&self, username: &Username) -> bool {
        self.hands.contains_key(username)
    }

    /// Mark an order id used, rejecting reuse within the round.
    pub fn claim_order_id(&mut self, owner: &Username, id: OrderId) -> Result<(), GameError> {
        let used = self.used_ids.entry(owner.clone()).or_default();
        if !used.insert(id) {
            return Err(GameError::DuplicateOrderId);
        }
        Ok(())
    }

    /// A sell must be covered by cards on hand net of sells already resting.
    pub fn check_sell_coverage(
        &self,
        owner: &Username,
        suit: Suit,
        size: Size,
    ) -> Result<(), GameError> {
        let held = self
            .hands
            .get(owner)
            .map(|h| h.get(suit))
            .unwrap_or(Size::ZERO);
        let resting = self.book.resting_sells_for(owner, suit);
        let free = held.checked_sub(resting).unwrap_or(Size::ZERO);
        if free < size {
            return Err(GameError::NotEnoughToSell);
        }
        Ok(())
    }

    /// Move cards and cash for one fill. Buyer gains cards and pays;
    /// seller loses cards and collects. Cash nets to zero by construction;
    /// a card underflow means corrupted state and is fatal.
    pub fn apply_fill(
        &mut self,
        buyer: &Username,
        seller: &Username,
        suit: Suit,
        size: Size,
        price: Price,
    ) -> Result<(), AuditViolation> {
        let seller_hand = self
            .hands
            .get_mut(seller)
            .ok_or_else(|| AuditViolation::HandUnderflow {
                owner: seller.clone(),
                suit,
            })?;
        seller_hand
            .remove(suit, size)
            .ok_or_else(|| AuditViolation::HandUnderflow {
                owner: seller.clone(),
                suit,
            })?;
        self.hands
            .get_mut(buyer)
            .expect("fill parties hold hands")
            .add(suit, size);

        let value = Cash::from_fill(price, size);
        *self.cash.get_mut(buyer).expect("fill parties hold cash") -= value;
        *self.cash.get_mut(seller).expect("fill parties hold cash") += value;
        Ok(())
    }

    /// Per-player scores for this round: trading cash, plus the per-card
    /// gold bonus, plus an even pot split (truncated) among the players
    /// holding the most gold.
    pub fn settle(&self, config: &GameConfig) -> BTreeMap<Username, Cash> {
        let gold_counts: BTreeMap<&Username, Size> = self
            .hands
            .iter()
            .map(|(u, h)| (u, h.get(self.gold)))
            .collect();
        let most = gold_counts
            .values()
            .copied()
            .max()
            .unwrap_or(Size::ZERO);
        let winners = gold_counts.values().filter(|&&c| c == most).count() as i64;
        let share = Cash::new(config.pot_cash().get() / winners.max(1));

        self.hands
            .iter()
            .map(|(username, hand)| {
                let cash = self.cash.get(username).copied().unwrap_or(Cash::ZERO);
                let gold_held = hand.get(self.gold);
                let bonus =
                    Cash::new(config.bonus_cash().get() * i64::from(gold_held.get()));
                let pot = if gold_held == most { share } else { Cash::ZERO };
                (username.clone(), cash + bonus + pot)
            })
            .collect()
    }
}
