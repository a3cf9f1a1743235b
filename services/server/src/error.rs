use thiserror::Error;

/// Failures on the connection path. All of them end the connection; the
/// engine never sees them.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("room channel closed")]
    RoomGone,

    #[error(transparent)]
    Protocol(#[from] protocol::ProtocolError),
}
