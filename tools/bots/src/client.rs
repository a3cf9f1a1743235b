//! Websocket RPC client
//!
//! Sends versioned envelopes, correlates replies by sequence number, and
//! buffers stream updates that arrive while a call is in flight. A reply
//! carrying an error kind the method never declared means the server and
//! this client disagree about the protocol, so the client disconnects.

use std::collections::VecDeque;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use protocol::{
    decode_server_frame, encode, Command, Envelope, Method, PlayerUpdate, ProtocolError, Reply,
    ServerFrame,
};
use types::errors::GameError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("server closed the stream")]
    StreamClosed,

    #[error("reply for unknown seq {got}, awaiting {expected}")]
    SeqMismatch { got: u64, expected: u64 },

    #[error("{method:?} returned undeclared error {kind:?}: protocol mismatch")]
    UndeclaredError { method: Method, kind: GameError },

    #[error("{method:?} rejected: {kind}")]
    Rejected { method: Method, kind: GameError },
}

pub struct RpcClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_seq: u64,
    /// Updates that arrived while a reply was pending.
    buffered: VecDeque<PlayerUpdate>,
}

impl RpcClient {
    pub async fn connect(url: &str) -> Result<Self, BotError> {
        let (socket, _) = connect_async(url).await?;
        Ok(Self {
            socket,
            next_seq: 1,
            buffered: VecDeque::new(),
        })
    }

    async fn next_frame(&mut self) -> Result<ServerFrame, BotError> {
        loop {
            match self.socket.next().await {
                None => return Err(BotError::StreamClosed),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => return Ok(decode_server_frame(&text)?),
                Some(Ok(Message::Close(_))) => return Err(BotError::StreamClosed),
                Some(Ok(_)) => continue,
            }
        }
    }

    /// Issue one RPC and wait for its reply, buffering any updates that
    /// land in between.
    pub async fn call(&mut self, command: Command) -> Result<Result<Reply, GameError>, BotError> {
        let method = command.method();
        let seq = self.next_seq;
        self.next_seq += 1;

        let envelope = Envelope::new(seq, command);
        self.socket
            .send(Message::Text(encode(&envelope).into()))
            .await?;

        loop {
            match self.next_frame().await? {
                ServerFrame::Update { update, .. } => self.buffered.push_back(update),
                ServerFrame::Reply {
                    seq: reply_seq,
                    result,
                    ..
                } => {
                    if reply_seq != seq {
                        return Err(BotError::SeqMismatch {
                            got: reply_seq,
                            expected: seq,
                        });
                    }
                    if let Err(kind) = &result {
                        if !method.declared_errors().contains(kind) {
                            return Err(BotError::UndeclaredError {
                                method,
                                kind: *kind,
                            });
                        }
                        debug!(?method, ?kind, "rpc rejected");
                    }
                    return Ok(result);
                }
            }
        }
    }

    /// Like `call`, but treats a rejection as fatal.
    pub async fn call_ok(&mut self, command: Command) -> Result<Reply, BotError> {
        let method = command.method();
        self.call(command)
            .await?
            .map_err(|kind| BotError::Rejected { method, kind })
    }

    /// The next stream update, in order.
    pub async fn next_update(&mut self) -> Result<PlayerUpdate, BotError> {
        if let Some(update) = self.buffered.pop_front() {
            return Ok(update);
        }
        loop {
            match self.next_frame().await? {
                ServerFrame::Update { update, .. } => return Ok(update),
                // A reply with nothing awaited: the server is confused.
                ServerFrame::Reply { seq, .. } => {
                    return Err(BotError::SeqMismatch {
                        got: seq,
                        expected: 0,
                    })
                }
            }
        }
    }
}
