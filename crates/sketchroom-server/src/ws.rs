//! WebSocket endpoint: one task per connected peer.

use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use sketchroom_core::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    pub room: String,
    pub token: Option<String>,
}

/// Upgrade handler for `/ws?room=<id>&token=<jwt>`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let room = params.room.trim().to_string();
    if room.is_empty() {
        return (StatusCode::BAD_REQUEST, "missing room").into_response();
    }
    if let Err(e) = state.authorize(&room, params.token.as_deref()) {
        warn!(room = %room, "connection refused: {}", e);
        return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state, room))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room: String) {
    let peer_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();

    let joined = state.join_room(&room, &peer_id);
    let mut rx = joined.rx;
    info!(peer = %peer_id, room = %room, color = %joined.peer.color, "peer joined");

    let greeted = send_json(&mut sender, &joined.initial_state).await
        && send_json(&mut sender, &joined.roster).await;

    if greeted {
        loop {
            tokio::select! {
                msg = receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match ClientMessage::from_json(text.as_str()) {
                                Ok(client_msg) => state.handle_message(&room, &peer_id, client_msg),
                                Err(e) => {
                                    warn!(peer = %peer_id, "invalid message: {}", e);
                                    let err = ServerMessage::Error {
                                        message: format!("invalid message: {e}"),
                                    };
                                    if !send_json(&mut sender, &err).await {
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        // Ping/pong is answered by axum; binary frames are not part of the protocol.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(peer = %peer_id, "websocket error: {}", e);
                            break;
                        }
                    }
                }

                relayed = rx.recv() => {
                    match relayed {
                        Ok((from, msg)) => {
                            if from != peer_id && !send_json(&mut sender, &msg).await {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(peer = %peer_id, skipped, "peer lagging, frames dropped");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    state.leave_room(&room, &peer_id);
    info!(peer = %peer_id, room = %room, "peer left");
}

/// Serialize and send one frame. `false` means the socket is gone.
async fn send_json(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    let json = match msg.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!("failed to encode frame: {}", e);
            return true;
        }
    };
    if let Err(e) = sender.send(Message::Text(json.into())).await {
        debug!("send failed: {}", e);
        return false;
    }
    true
}
