//! Client commands and per-RPC reply values
//!
//! Nine RPCs, all at version 1. Each method declares the error kinds it
//! may return; a client that receives an undeclared kind must treat the
//! peer as protocol-mismatched and disconnect.

use serde::{Deserialize, Serialize};

use types::prelude::*;

/// Seat selection for `start-playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "seat", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatRequest {
    SitAnywhere,
    SitIn(Seat),
}

/// What `get-update` should push onto the caller's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateKind {
    Hand,
    Market,
}

/// A client command, tagged by method name on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "payload", rename_all = "kebab-case")]
pub enum Command {
    Login { username: Username },
    StartPlaying(SeatRequest),
    Ready { is_ready: bool },
    Order(Order),
    Cancel { id: OrderId },
    CxlAll,
    Chat { msg: String },
    GetUpdate(UpdateKind),
    TimeLeft,
}

impl Command {
    pub fn method(&self) -> Method {
        match self {
            Command::Login { .. } => Method::Login,
            Command::StartPlaying(_) => Method::StartPlaying,
            Command::Ready { .. } => Method::Ready,
            Command::Order(_) => Method::Order,
            Command::Cancel { .. } => Method::Cancel,
            Command::CxlAll => Method::CxlAll,
            Command::Chat { .. } => Method::Chat,
            Command::GetUpdate(_) => Method::GetUpdate,
            Command::TimeLeft => Method::TimeLeft,
        }
    }
}

/// Successful reply value, per RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reply {
    /// login, ready, chat, get-update (the value arrives on the stream)
    Unit,
    /// start-playing: the seat actually taken
    Seat(Seat),
    /// order, cancel, cxl-all
    Ack,
    /// time-left: remaining round time in milliseconds
    TimeLeftMs(u64),
}

/// RPC method identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Login,
    StartPlaying,
    Ready,
    Order,
    Cancel,
    CxlAll,
    Chat,
    GetUpdate,
    TimeLeft,
}

impl Method {
    /// The error kinds this RPC is allowed to return.
    ///
    /// The dispatcher is tested against these sets; clients receiving a
    /// kind outside the set disconnect.
    pub fn declared_errors(self) -> &'static [GameError] {
        use GameError::*;
        match self {
            Method::Login => &[
                GameIsFull,
                GameAlreadyStarted,
                AlreadyLoggedIn,
                InvalidUsername,
            ],
            Method::StartPlaying => &[
                NotLoggedIn,
                NotInARoom,
                SeatOccupied,
                GameAlreadyStarted,
                YoureAlreadyPlaying,
            ],
            Method::Ready => &[
                NotLoggedIn,
                NotInARoom,
                YoureNotPlaying,
                AlreadyPlaying,
                GameAlreadyStarted,
            ],
            Method::Order => &[
                YoureNotPlaying,
                GameNotInProgress,
                OwnerIsNotSender,
                DuplicateOrderId,
                PriceTooHigh,
                SizeMustBePositive,
                NotEnoughToSell,
            ],
            Method::Cancel => &[YoureNotPlaying, GameNotInProgress, NoSuchOrder],
            Method::CxlAll => &[YoureNotPlaying, GameNotInProgress],
            Method::Chat => &[NotLoggedIn],
            Method::GetUpdate => &[NotLoggedIn, YoureNotPlaying],
            Method::TimeLeft => &[GameNotInProgress],
        }
    }
}
