//! Frame envelopes and version gating
//!
//! Every frame carries the protocol version; a receiver rejects any frame
//! whose version does not match its own and closes the connection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use types::errors::GameError;

use crate::commands::{Command, Reply};
use crate::updates::PlayerUpdate;

/// Version spoken by this build. Bumped on any wire-visible change.
pub const PROTOCOL_VERSION: u32 = 1;

/// Client → server frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    /// Client-assigned request sequence, echoed on the reply.
    pub seq: u64,
    #[serde(flatten)]
    pub command: Command,
}

impl Envelope {
    pub fn new(seq: u64, command: Command) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            seq,
            command,
        }
    }
}

/// Server → client frame: either the reply to a request or a stream update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerFrame {
    Reply {
        version: u32,
        seq: u64,
        result: Result<Reply, GameError>,
    },
    Update {
        version: u32,
        update: PlayerUpdate,
    },
}

impl ServerFrame {
    pub fn reply(seq: u64, result: Result<Reply, GameError>) -> Self {
        ServerFrame::Reply {
            version: PROTOCOL_VERSION,
            seq,
            result,
        }
    }

    pub fn update(update: PlayerUpdate) -> Self {
        ServerFrame::Update {
            version: PROTOCOL_VERSION,
            update,
        }
    }

    fn version(&self) -> u32 {
        match self {
            ServerFrame::Reply { version, .. } => *version,
            ServerFrame::Update { version, .. } => *version,
        }
    }
}

/// Frame-level failures. All of them end the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("protocol version mismatch: got {got}, speaking {PROTOCOL_VERSION}")]
    VersionMismatch { got: u32 },
}

/// Decode a client frame, enforcing the version gate.
pub fn decode_envelope(text: &str) -> Result<Envelope, ProtocolError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if envelope.version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch {
            got: envelope.version,
        });
    }
    Ok(envelope)
}

/// Decode a server frame, enforcing the version gate.
pub fn decode_server_frame(text: &str) -> Result<ServerFrame, ProtocolError> {
    let frame: ServerFrame = serde_json::from_str(text)?;
    if frame.version() != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch {
            got: frame.version(),
        });
    }
    Ok(frame)
}

/// Encode any serializable frame as one websocket text payload.
pub fn encode<T: Serialize>(frame: &T) -> String {
    // Only fails on non-string map keys or similar, which our types rule out.
    serde_json::to_string(frame).expect("frame serialization is infallible")
}
