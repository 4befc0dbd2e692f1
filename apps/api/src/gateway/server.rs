//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use ladle_common::id::{prefix, prefixed_ulid};
use ladle_common::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;

use crate::AppState;

use super::broadcast::RoomEvent;
use super::ConnectionId;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// One task per connection. Connections start anonymous and stay anonymous:
/// `post` carries its own credential and is verified per message, because the
/// socket outlives the short-lived bearer token.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let conn_id: ConnectionId = prefixed_ulid(prefix::CONNECTION);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Arc<ServerMessage>>();
    state.connections.register(conn_id.clone(), out_tx);

    tracing::debug!(%conn_id, "realtime connection opened");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Client sends us a message.
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(&state, &conn_id, &text).await;
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, %conn_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Event queued for this connection (broadcast or direct reply).
            outbound = out_rx.recv() => {
                match outbound {
                    Some(msg) => {
                        let json = serde_json::to_string(&*msg).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Disconnect is the only cancellation primitive: drop every room
    // membership immediately. Mutations already submitted on this
    // connection's behalf still complete and broadcast; only the reply
    // destined here is dropped.
    state.rooms.leave_all(&conn_id);
    state.connections.unregister(&conn_id);

    tracing::debug!(%conn_id, "realtime connection closed");
}

async fn handle_client_message(state: &AppState, conn_id: &str, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::debug!(%conn_id, %err, "unparseable client message");
            reply(
                state,
                conn_id,
                ServerMessage::Error {
                    code: "BAD_MESSAGE".to_string(),
                    message: "Unrecognized or malformed message".to_string(),
                },
            );
            return;
        }
    };

    match msg {
        // Joining and leaving are public; reading comments requires no
        // credential.
        ClientMessage::Join { room_id } => {
            state.rooms.join(&room_id, conn_id);
            tracing::debug!(%conn_id, room_id, "joined room");
        }
        ClientMessage::Leave { room_id } => {
            state.rooms.leave(&room_id, conn_id);
            tracing::debug!(%conn_id, room_id, "left room");
        }
        ClientMessage::Post {
            room_id,
            token,
            body,
        } => handle_post(state, conn_id, &room_id, &token, &body).await,
    }
}

async fn handle_post(state: &AppState, conn_id: &str, room_id: &str, token: &str, body: &str) {
    // Trust is re-derived for every post; a token that expired mid-session
    // fails here exactly as it would on the REST path.
    let principal = match state.verifier.verify(token) {
        Ok(principal) => principal,
        Err(failure) => {
            tracing::debug!(%conn_id, reason = failure.reason, "rejected unauthenticated post");
            reply(
                state,
                conn_id,
                ServerMessage::AuthError {
                    reason: failure.reason.to_string(),
                },
            );
            return;
        }
    };

    match state.comments.create(room_id, &principal.user_id, body).await {
        Ok(comment) => {
            // The comment is durable by now; broadcast to everyone in the
            // room, the poster included.
            state.broadcast.publish(room_id, RoomEvent::Created(comment));
        }
        Err(err) => {
            tracing::debug!(%conn_id, room_id, %err, "comment rejected");
            reply(
                state,
                conn_id,
                ServerMessage::Error {
                    code: err.code().to_string(),
                    message: err.to_string(),
                },
            );
        }
    }
}

/// Queue an event for the originating connection only.
fn reply(state: &AppState, conn_id: &str, msg: ServerMessage) {
    if !state.connections.send_to(conn_id, Arc::new(msg)) {
        tracing::debug!(%conn_id, "reply dropped; connection already gone");
    }
}
