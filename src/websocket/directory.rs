//! Channel Directory
//!
//! Maps a room key (network id) to the connections currently in that room
//! and fans messages out to them. Also admits new connections, handing each
//! one a [`ConnectionSession`] and the [`Outbound`] receiver it writes from.
//!
//! Rooms are implicit: a key exists only while at least one connection is in
//! it. Membership is stored in a [`DashMap`], so joins, leaves and publishes
//! on one room never serialize against unrelated rooms.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{
    self,
    error::{TryRecvError, TrySendError},
};
use uuid::Uuid;

use super::messages::ServerMessage;
use super::session::ConnectionSession;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Sending half of a connection's outbound queue
pub type Outbox = mpsc::Sender<ServerMessage>;

/// Receiving side of a connection's outbound traffic
///
/// Direct replies (room confirmations, pongs, errors) travel on their own
/// unbounded lane and are never dropped; room broadcasts use the bounded
/// queue fed by [`ChannelDirectory::publish`]. Replies are drained first.
pub struct Outbound {
    replies: mpsc::UnboundedReceiver<ServerMessage>,
    broadcasts: mpsc::Receiver<ServerMessage>,
}

impl Outbound {
    /// Wait for the next message; `None` once the session is gone
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        tokio::select! {
            biased;
            Some(message) = self.replies.recv() => Some(message),
            Some(message) = self.broadcasts.recv() => Some(message),
            else => None,
        }
    }

    pub fn try_recv(&mut self) -> Result<ServerMessage, TryRecvError> {
        match self.replies.try_recv() {
            Ok(message) => Ok(message),
            Err(_) => self.broadcasts.try_recv(),
        }
    }
}

/// Configuration for the channel directory
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Broadcasts buffered per connection before new ones are dropped
    pub outbound_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            outbound_buffer: 256,
        }
    }
}

/// Room membership and connection admission
pub struct ChannelDirectory {
    /// Room key → members of that room
    channels: DashMap<String, HashMap<ConnectionId, Outbox>>,
    /// Live sessions
    connections: AtomicUsize,
    config: HubConfig,
}

impl ChannelDirectory {
    pub fn new(config: HubConfig) -> Self {
        Self {
            channels: DashMap::new(),
            connections: AtomicUsize::new(0),
            config,
        }
    }

    /// Admit a new connection
    ///
    /// The session starts outside any room. Returns an error if the
    /// connection limit has been reached.
    pub fn register(self: &Arc<Self>) -> Result<(ConnectionSession, Outbound), HubError> {
        let limit = self.config.max_connections;
        self.connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < limit).then_some(count + 1)
            })
            .map_err(|_| HubError::TooManyConnections(limit))?;

        let id = Uuid::new_v4().to_string();
        let (broadcast_tx, broadcasts) = mpsc::channel(self.config.outbound_buffer.max(1));
        let (reply_tx, replies) = mpsc::unbounded_channel();

        tracing::info!(connection_id = %id, "New connection");
        let session = ConnectionSession::new(id, broadcast_tx, reply_tx, Arc::clone(self));
        Ok((session, Outbound { replies, broadcasts }))
    }

    /// Release a slot taken by [`register`](Self::register)
    pub(super) fn release(&self, id: &str) {
        let _ = self
            .connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        tracing::info!(connection_id = %id, "Connection closed");
    }

    /// Add a connection to a room, creating the room if needed
    pub fn join(&self, room: &str, id: &str, outbox: Outbox) {
        self.channels
            .entry(room.to_string())
            .or_default()
            .insert(id.to_string(), outbox);
    }

    /// Remove a connection from a room
    ///
    /// Returns whether the connection was a member. Empty rooms are dropped.
    pub fn leave(&self, room: &str, id: &str) -> bool {
        let removed = match self.channels.get_mut(room) {
            Some(mut members) => members.remove(id).is_some(),
            None => false,
        };

        if removed {
            self.channels.remove_if(room, |_, members| members.is_empty());
        }
        removed
    }

    /// Deliver a message to every connection currently in `room`
    ///
    /// Never waits on a connection: a member whose queue is full misses this
    /// message. Unknown or empty rooms are a no-op. Returns the number of
    /// members the message was queued for.
    pub fn publish(&self, room: &str, message: &ServerMessage) -> usize {
        let Some(members) = self.channels.get(room) else {
            return 0;
        };

        let mut delivered = 0;
        for (id, outbox) in members.iter() {
            match outbox.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %id,
                        room = %room,
                        event = message.event_name(),
                        "Outbound queue full, dropping message"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = %id, room = %room, "Connection gone");
                }
            }
        }

        tracing::trace!(
            room = %room,
            event = message.event_name(),
            recipients = delivered,
            "Published to room"
        );
        delivered
    }

    /// Whether `id` is currently in `room`
    pub fn is_member(&self, room: &str, id: &str) -> bool {
        self.channels
            .get(room)
            .map(|members| members.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of connections in `room`
    pub fn member_count(&self, room: &str) -> usize {
        self.channels.get(room).map(|m| m.len()).unwrap_or(0)
    }

    /// Number of rooms with at least one member
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Get the current connection count
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

impl Default for ChannelDirectory {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// Errors that can occur in the realtime layer
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Failed to send message")]
    SendFailed,
}
