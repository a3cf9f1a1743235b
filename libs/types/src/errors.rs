//! Error taxonomy
//!
//! `GameError` covers every recoverable rejection a command can produce;
//! each RPC declares the subset it may return. `AuditViolation` is the
//! fatal class: an internal invariant breach that tears the room down and
//! is never surfaced to clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{OrderId, Username};
use crate::numeric::{Cash, Price, Size};
use crate::suit::{Dir, Suit};

/// Recoverable rejection returned to the sender of a command.
///
/// None of these mutate room state. The wire tags are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameError {
    // Auth / session
    #[error("not logged in")]
    NotLoggedIn,
    #[error("already logged in")]
    AlreadyLoggedIn,
    #[error("invalid username")]
    InvalidUsername,
    #[error("not in a room")]
    NotInARoom,
    #[error("game is full")]
    GameIsFull,

    // Lifecycle
    #[error("game not in progress")]
    GameNotInProgress,
    #[error("game already started")]
    GameAlreadyStarted,
    #[error("you're not playing")]
    YoureNotPlaying,
    #[error("you're already playing")]
    YoureAlreadyPlaying,
    #[error("already playing")]
    AlreadyPlaying,
    #[error("seat occupied")]
    SeatOccupied,

    // Order validity
    #[error("owner is not sender")]
    OwnerIsNotSender,
    #[error("duplicate order id")]
    DuplicateOrderId,
    #[error("price too high")]
    PriceTooHigh,
    #[error("size must be positive")]
    SizeMustBePositive,
    #[error("not enough to sell")]
    NotEnoughToSell,
    #[error("no such order")]
    NoSuchOrder,
}

/// Fatal internal invariant violation.
///
/// Observing one of these means engine state is corrupt: the owning task
/// must log the structured record, terminate the room, and close every
/// subscriber. Never returned as an RPC error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum AuditViolation {
    #[error("card conservation broken for {suit}: expected {expected}, found {actual}")]
    CardConservation {
        suit: Suit,
        expected: Size,
        actual: Size,
    },

    #[error("cash conservation broken: players net to {net}")]
    CashConservation { net: Cash },

    #[error("book crossed on {suit}: best buy {best_buy} >= best sell {best_sell}")]
    BookCross {
        suit: Suit,
        best_buy: Price,
        best_sell: Price,
    },

    #[error("priority order broken in {suit} {dir} half-book")]
    PriorityOrder { suit: Suit, dir: Dir },

    #[error("resting self-cross on {suit} by {owner}")]
    RestingSelfCross { suit: Suit, owner: Username },

    #[error("sell coverage broken: {owner} holds {held} {suit} against {resting} resting")]
    SellCoverage {
        owner: Username,
        suit: Suit,
        held: Size,
        resting: Size,
    },

    #[error("hand underflow: {owner} has no {suit} to give")]
    HandUnderflow { owner: Username, suit: Suit },

    #[error("duplicate resting order id {id} for {owner}")]
    DuplicateRestingId { owner: Username, id: OrderId },
}
