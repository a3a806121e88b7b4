//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use super::directory::{ChannelDirectory, HubError};
use super::messages::{ClientMessage, ServerMessage};
use super::session::ConnectionSession;
use crate::api::AppState;

/// WebSocket upgrade handler
///
/// This is the entry point for WebSocket connections.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let directory = Arc::clone(&state.directory);
    ws.on_upgrade(move |socket| handle_socket(socket, directory))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, directory: Arc<ChannelDirectory>) {
    let (mut sender, mut receiver) = socket.split();

    let (mut session, mut rx) = match directory.register() {
        Ok(registered) => registered,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            if let Ok(text) = serde_json::to_string(&ServerMessage::error(e.to_string())) {
                let _ = sender.send(Message::Text(text)).await;
            }
            let _ = sender.close().await;
            return;
        }
    };

    let conn_id_for_send = session.id().to_string();

    // Task to forward queued messages to the WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            connection_id = %conn_id_for_send,
                            "WebSocket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                }
            }
        }
    });

    // Task to receive client messages; owns the session
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&mut session, msg) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %session.id(),
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
        session.close();
    });

    // Whichever side finishes first ends the connection. Aborting the
    // receive task drops the session, which leaves its room.
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
pub(crate) fn handle_ws_message(session: &mut ConnectionSession, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_client_message(session, client_msg),
                Err(e) => {
                    tracing::debug!(
                        connection_id = %session.id(),
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Keep the connection open
                    reply(session, ServerMessage::error(format!("Invalid message format: {}", e)));
                }
            }
            true
        }
        Message::Binary(_) => {
            reply(session, ServerMessage::error("Binary messages not supported"));
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %session.id(), "Client requested close");
            false
        }
    }
}

/// Handle a parsed client message
fn handle_client_message(session: &mut ConnectionSession, message: ClientMessage) {
    match message {
        ClientMessage::SwitchRoom(room) => {
            if let Err(e) = session.switch_room(&room) {
                tracing::warn!(
                    connection_id = %session.id(),
                    room = %room,
                    error = %e,
                    "Switch-room rejected"
                );
                reply(session, ServerMessage::error(e.to_string()));
            }
        }
        ClientMessage::Ping => reply(session, ServerMessage::Pong),
    }
}

fn reply(session: &ConnectionSession, message: ServerMessage) {
    if let Err(HubError::SendFailed) = session.send(message) {
        tracing::debug!(connection_id = %session.id(), "Dropped reply to client");
    }
}
