//! Connection Session
//!
//! Server-side state of one live connection: which room, if any, it is in.
//!
//! ```text
//!   connect ──▶ NoRoom ──switch-room(r)──▶ InRoom(r) ──switch-room(r')──▶ InRoom(r')
//!                  │                           │
//!                  └────────── close ──────────┴──▶ (discarded)
//! ```
//!
//! A switch always leaves the current room before joining the requested one,
//! even when both are the same. Only the session itself changes its
//! membership; `&mut self` serializes switches on one connection.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::directory::{ChannelDirectory, ConnectionId, HubError, Outbox};
use super::messages::ServerMessage;

/// Room membership of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomState {
    NoRoom,
    InRoom(String),
}

/// One live client connection
pub struct ConnectionSession {
    id: ConnectionId,
    /// Membership handle given to the directory for room broadcasts
    outbox: Outbox,
    /// Direct replies to this client
    replies: mpsc::UnboundedSender<ServerMessage>,
    state: RoomState,
    directory: Arc<ChannelDirectory>,
    closed: bool,
}

impl ConnectionSession {
    pub(super) fn new(
        id: ConnectionId,
        outbox: Outbox,
        replies: mpsc::UnboundedSender<ServerMessage>,
        directory: Arc<ChannelDirectory>,
    ) -> Self {
        Self {
            id,
            outbox,
            replies,
            state: RoomState::NoRoom,
            directory,
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    /// Room the session is currently in
    pub fn room(&self) -> Option<&str> {
        match &self.state {
            RoomState::InRoom(room) => Some(room),
            RoomState::NoRoom => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Leave the current room (if any), join `room` and confirm to the client
    ///
    /// Empty room names are rejected and leave the session untouched.
    pub fn switch_room(&mut self, room: &str) -> Result<(), HubError> {
        if self.closed {
            return Err(HubError::SessionClosed);
        }
        if room.is_empty() {
            return Err(HubError::Validation("room name must not be empty".to_string()));
        }

        tracing::info!(connection_id = %self.id, "Received 'switch-room'");

        if let RoomState::InRoom(current) = std::mem::replace(&mut self.state, RoomState::NoRoom)
        {
            tracing::info!(connection_id = %self.id, room = %current, "Leaving current room");
            self.directory.leave(&current, &self.id);
        }

        tracing::info!(connection_id = %self.id, room = %room, "Joining new room");
        self.directory.join(room, &self.id, self.outbox.clone());
        self.state = RoomState::InRoom(room.to_string());

        if let Err(e) = self.send(ServerMessage::switched_room(room)) {
            tracing::warn!(
                connection_id = %self.id,
                room = %room,
                error = %e,
                "Failed to confirm room switch"
            );
        }
        Ok(())
    }

    /// Reply to this connection only
    ///
    /// Replies bypass the broadcast queue, so a backlog of room traffic
    /// never drops them. Fails only once the connection's writer is gone.
    pub fn send(&self, message: ServerMessage) -> Result<(), HubError> {
        self.replies
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Tear the session down: leave the current room and free the slot
    ///
    /// Idempotent. Also runs on drop, so an aborted connection task still
    /// cleans up.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let RoomState::InRoom(room) = std::mem::replace(&mut self.state, RoomState::NoRoom) {
            tracing::debug!(connection_id = %self.id, room = %room, "Leaving room on disconnect");
            self.directory.leave(&room, &self.id);
        }
        self.directory.release(&self.id);
    }
}

impl Drop for ConnectionSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("closed", &self.closed)
            .finish()
    }
}
