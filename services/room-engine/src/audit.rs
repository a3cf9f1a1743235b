//! Post-command invariant audit
//!
//! Runs after every accepted command that touches round state. A failure
//! here means the engine corrupted itself; the owning task must log the
//! record and tear the room down.

use std::collections::BTreeSet;

use types::prelude::*;

use crate::round::Round;

/// Validate every round invariant. Cheap relative to a command: hands and
/// books are tiny.
pub fn check_round(round: &Round) -> Result<(), AuditViolation> {
    check_card_conservation(round)?;
    check_cash_conservation(round)?;
    check_book(round)?;
    Ok(())
}

fn check_card_conservation(round: &Round) -> Result<(), AuditViolation> {
    for suit in Suit::ALL {
        let total: Size = round.hands.values().map(|h| h.get(suit)).sum();
        let expected = round.initial_counts[suit];
        if total != expected {
            return Err(AuditViolation::CardConservation {
                suit,
                expected,
                actual: total,
            });
        }
    }
    Ok(())
}

fn check_cash_conservation(round: &Round) -> Result<(), AuditViolation> {
    let net: Cash = round.cash.values().copied().sum();
    if net != Cash::ZERO {
        return Err(AuditViolation::CashConservation { net });
    }
    Ok(())
}

fn check_book(round: &Round) -> Result<(), AuditViolation> {
    let mut seen_ids: BTreeSet<(Username, OrderId)> = BTreeSet::new();

    for suit in Suit::ALL {
        let buys = round.book.half(suit, Dir::Buy);
        let sells = round.book.half(suit, Dir::Sell);

        // Priority ordering within each half
        for (dir, half) in [(Dir::Buy, buys), (Dir::Sell, sells)] {
            if !half.is_priority_ordered() {
                return Err(AuditViolation::PriorityOrder { suit, dir });
            }
        }

        // The book never rests crossed
        if let (Some(best_buy), Some(best_sell)) = (buys.peek_best(), sells.peek_best()) {
            if best_buy.order.price >= best_sell.order.price {
                return Err(AuditViolation::BookCross {
                    suit,
                    best_buy: best_buy.order.price,
                    best_sell: best_sell.order.price,
                });
            }
        }

        // No owner rests a buy at or above their own sell
        for buy in buys.iter() {
            for sell in sells.iter() {
                if buy.order.owner == sell.order.owner && buy.order.price >= sell.order.price {
                    return Err(AuditViolation::RestingSelfCross {
                        suit,
                        owner: buy.order.owner.clone(),
                    });
                }
            }
        }

        // Sell coverage: resting sells never exceed the hand
        for (owner, hand) in &round.hands {
            let resting = round.book.resting_sells_for(owner, suit);
            let held = hand.get(suit);
            if resting > held {
                return Err(AuditViolation::SellCoverage {
                    owner: owner.clone(),
                    suit,
                    held,
                    resting,
                });
            }
        }

        // (owner, id) unique among everything resting
        for half in [buys, sells] {
            for entry in half.iter() {
                let key = (entry.order.owner.clone(), entry.order.id);
                if !seen_ids.insert(key) {
                    return Err(AuditViolation::DuplicateRestingId {
                        owner: entry.order.owner.clone(),
                        id: entry.order.id,
                    });
                }
            }
        }
    }
    Ok(())
}
