//! Authoritative Figgie room engine
//!
//! A pure state machine driven by commands and a clock: lobby and seating,
//! the per-suit limit-order books, price-time-priority matching, round
//! timing and scoring, and the totally-ordered update fan-out. No I/O
//! happens here; the server owns one engine per room on a single task and
//! wires the fan-out queues to sockets.
//!
//! **Key invariants, audited after every command:**
//! - Cards are conserved per suit across all hands
//! - Trading cash sums to zero
//! - The book never rests crossed, and half-books stay priority-ordered
//! - Resting sells never exceed the seller's hand

pub mod audit;
pub mod book;
pub mod dispatch;
pub mod fanout;
pub mod matching;
pub mod room;
pub mod round;

pub use dispatch::RoomEngine;
pub use fanout::ConnectionId;
