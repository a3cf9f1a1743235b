//! Wire protocol for the Figgie game server
//!
//! The boundary contract between the room engine and its clients (web UI,
//! bots): command envelopes in, reply/update frames out, all versioned.
//!
//! # Modules
//! - `commands`: the nine RPCs, their replies, and declared error sets
//! - `updates`: the `PlayerUpdate` stream and broadcast variants
//! - `envelope`: framing, version gating, encode/decode helpers

pub mod commands;
pub mod envelope;
pub mod updates;

pub use commands::{Command, Method, Reply, SeatRequest, UpdateKind};
pub use envelope::{
    decode_envelope, decode_server_frame, encode, Envelope, ProtocolError, ServerFrame,
    PROTOCOL_VERSION,
};
pub use updates::{BookSnapshot, Broadcast, PlayerUpdate, RestingOrder, RoundResults};
