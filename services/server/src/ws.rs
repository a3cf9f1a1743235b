//! Per-connection websocket loop
//!
//! Decodes envelopes off the socket and forwards them to the room task;
//! pumps the outbound channel back onto the socket. The connection owns no
//! game state: a malformed or wrong-version frame just closes it.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use protocol::{decode_envelope, encode};

use crate::error::ServerError;
use crate::room_task::{self, RoomMessage};
use crate::state::AppState;

/// Websocket upgrade at `/ws/{room}`. Rooms are created on first join.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room: String) {
    let conn = state.next_conn_id();
    let inbox = state.room_inbox(&room);
    let (out_tx, mut out_rx) = room_task::outbound_channel();

    if inbox
        .send(RoomMessage::Connect {
            conn,
            outbound: out_tx,
        })
        .await
        .is_err()
    {
        warn!(%room, conn, "room task gone before connect");
        return;
    }
    info!(%room, conn, "connection established");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Pump the room's outbound channel onto the socket. The channel
    // closing (room drop or backpressure disconnect) closes the socket.
    let send_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if ws_tx
                .send(Message::Text(encode(&frame).into()))
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(message) = ws_rx.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if let Err(e) = forward_command(&inbox, conn, &text).await {
                    warn!(conn, %e, "closing connection");
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            // Pings are answered by axum; binary frames are not spoken here.
            Ok(_) => {}
        }
    }

    let _ = inbox.send(RoomMessage::Disconnect { conn }).await;
    send_task.abort();
    info!(%room, conn, "connection closed");
}

/// Decode one frame and hand it to the room task. Any error here is
/// terminal for the connection: bad version, bad JSON, or a dead room.
async fn forward_command(
    inbox: &mpsc::Sender<RoomMessage>,
    conn: u64,
    text: &str,
) -> Result<(), ServerError> {
    let envelope = decode_envelope(text)?;
    debug!(conn, seq = envelope.seq, "command received");
    inbox
        .send(RoomMessage::Command {
            conn,
            seq: envelope.seq,
            command: envelope.command,
        })
        .await
        .map_err(|_| ServerError::RoomGone)
}

/// Health probe: rooms and names currently live.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    format!(
        r#"{{"status":"ok","rooms":{},"users":{}}}"#,
        state.rooms.len(),
        state.usernames.len()
    )
}
