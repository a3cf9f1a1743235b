//! Market and opponent state from the public stream
//!
//! Rebuilds everything a player is allowed to know from broadcasts: the
//! resting book (every posted order is announced through its `Exec`), a
//! `PartialHand` per opponent fed by public executions, and the player's
//! own hand from private updates. Feeds the strategies.

use std::collections::BTreeMap;

use tracing::trace;

use protocol::{Broadcast, PlayerUpdate};
use types::prelude::*;

/// A resting order reconstructed from the broadcast stream.
#[derive(Debug, Clone)]
pub struct TrackedOrder {
    pub id: OrderId,
    pub owner: Username,
    pub suit: Suit,
    pub dir: Dir,
    pub price: Price,
    pub remaining: Size,
}

#[derive(Debug)]
pub struct Tracker {
    pub me: Username,
    pub hand: Hand,
    pub in_round: bool,
    pub opponents: BTreeMap<Username, PartialHand>,
    resting: Vec<TrackedOrder>,
    /// Last trade price per suit, a cheap value anchor.
    pub last_trade: SuitMap<Option<Price>>,
}

impl Tracker {
    pub fn new(me: Username) -> Self {
        Self {
            me,
            hand: Hand::empty(),
            in_round: false,
            opponents: BTreeMap::new(),
            resting: Vec::new(),
            last_trade: SuitMap::build(|_| None),
        }
    }

    /// Best resting price on `(suit, dir)` as reconstructed from the stream.
    pub fn best(&self, suit: Suit, dir: Dir) -> Option<Price> {
        let prices = self
            .resting
            .iter()
            .filter(|o| o.suit == suit && o.dir == dir)
            .map(|o| o.price);
        match dir {
            Dir::Buy => prices.max(),
            Dir::Sell => prices.min(),
        }
    }

    /// Cards of `suit` known to exist: our hand plus every opponent's
    /// publicly revealed holdings.
    pub fn known_count(&self, suit: Suit) -> Size {
        let seen: Size = self.opponents.values().map(|p| p.min_held(suit)).sum();
        self.hand.get(suit) + seen
    }

    /// Best guess at the gold suit: partner of the suit that looks most
    /// like the twelve-card suit.
    pub fn gold_guess(&self) -> Suit {
        let twelve_guess = Suit::ALL
            .into_iter()
            .max_by_key(|&s| self.known_count(s))
            .expect("four suits");
        twelve_guess.same_color_partner()
    }

    pub fn observe(&mut self, update: &PlayerUpdate) {
        match update {
            PlayerUpdate::Hand(hand) => {
                self.hand = *hand;
            }
            PlayerUpdate::Market(snapshot) => {
                self.resting.clear();
                for (suit, pair) in snapshot.0.iter() {
                    for (dir, orders) in pair.iter() {
                        for o in orders {
                            self.resting.push(TrackedOrder {
                                id: o.id,
                                owner: o.owner.clone(),
                                suit,
                                dir,
                                price: o.price,
                                remaining: o.size,
                            });
                        }
                    }
                }
            }
            PlayerUpdate::Broadcast(broadcast) => self.observe_broadcast(broadcast),
        }
    }

    fn observe_broadcast(&mut self, broadcast: &Broadcast) {
        match broadcast {
            Broadcast::PlayerJoined { username } | Broadcast::PlayerSat { username, .. } => {
                if *username != self.me {
                    self.opponents
                        .entry(username.clone())
                        .or_insert_with(|| PartialHand::unseen(Size::ZERO));
                }
            }
            Broadcast::NewRound => {
                self.in_round = true;
                self.resting.clear();
                self.last_trade = SuitMap::build(|_| None);
                for view in self.opponents.values_mut() {
                    *view = PartialHand::unseen(Size::new(10));
                }
            }
            Broadcast::Exec { order, exec } => self.observe_exec(order, exec),
            Broadcast::Out { order } => {
                self.resting
                    .retain(|o| !(o.owner == order.owner && o.id == order.id));
            }
            Broadcast::RoundOver(_) => {
                self.in_round = false;
                self.resting.clear();
            }
            Broadcast::PlayerReady { .. } | Broadcast::Chat { .. } | Broadcast::Scores { .. } => {}
        }
    }

    fn observe_exec(&mut self, order: &Order, exec: &ExecReport) {
        for fill in &exec.fills {
            self.last_trade[order.suit] = Some(fill.price);

            // The taker's side of the transfer.
            if order.owner != self.me {
                if let Some(view) = self.opponents.get_mut(&order.owner) {
                    match order.dir {
                        Dir::Buy => view.observe_gain(order.suit, fill.size),
                        Dir::Sell => view.observe_loss(order.suit, fill.size),
                    }
                }
            }

            // The maker is identified through the resting order the fill hit.
            let maker = self
                .resting
                .iter_mut()
                .find(|o| {
                    o.suit == order.suit && o.dir == order.dir.other() && o.id == fill.counterparty
                })
                .map(|o| {
                    o.remaining = o.remaining.checked_sub(fill.size).unwrap_or(Size::ZERO);
                    o.owner.clone()
                });
            if let Some(maker) = maker {
                self.resting
                    .retain(|o| !(o.remaining.is_zero() && o.owner == maker && o.id == fill.counterparty));
                if maker != self.me {
                    if let Some(view) = self.opponents.get_mut(&maker) {
                        match order.dir {
                            // Taker bought, so the maker sold.
                            Dir::Buy => view.observe_loss(order.suit, fill.size),
                            Dir::Sell => view.observe_gain(order.suit, fill.size),
                        }
                    }
                }
            } else {
                trace!(?fill, "fill against unknown resting order");
            }
        }

        if !exec.remainder_posted.is_zero() {
            self.resting.push(TrackedOrder {
                id: order.id,
                owner: order.owner.clone(),
                suit: order.suit,
                dir: order.dir,
                price: order.price,
                remaining: exec.remainder_posted,
            });
        }
    }
}
