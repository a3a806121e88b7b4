//! Event Bridge
//!
//! Links expansion workers to the rooms named after their network. At
//! startup every worker in the registry is inspected once; for each
//! broadcast-eligible worker the bridge subscribes to its event source and
//! spawns a forwarding task that republishes `tx-processed` and
//! `rescan-scheduled` events into the worker's room.
//!
//! Workers added to the registry later are not picked up.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::websocket::{ChannelDirectory, ServerMessage};
use crate::worker::{WorkerEvent, WorkerRegistry};

/// Forwarding tasks for every linked worker
pub struct EventBridge {
    links: Vec<Link>,
}

struct Link {
    indy_network_id: String,
    task: JoinHandle<()>,
}

impl EventBridge {
    /// Scan the registry and link every expansion worker to its room
    ///
    /// Subscriptions are taken before this returns, so no event emitted
    /// afterwards is missed. Must be called within a tokio runtime.
    pub fn attach(registry: &dyn WorkerRegistry, directory: Arc<ChannelDirectory>) -> Self {
        let mut links = Vec::new();

        for worker in registry.workers() {
            let info = worker.info();
            if !info.operation_type.is_broadcast_eligible() {
                tracing::debug!(
                    operation_type = %info.operation_type,
                    indy_network_id = %info.indy_network_id,
                    "Worker not eligible for broadcast"
                );
                continue;
            }

            tracing::info!(
                indy_network_id = %info.indy_network_id,
                subledger = %info.subledger,
                "Linking worker events to room"
            );

            let rx = worker.subscribe();
            let room = info.indy_network_id.clone();
            let task = tokio::spawn(forward(rx, room.clone(), Arc::clone(&directory)));

            links.push(Link {
                indy_network_id: room,
                task,
            });
        }

        tracing::info!(linked = links.len(), "Event bridge attached");
        Self { links }
    }

    /// Network ids of linked workers, in registry order
    pub fn linked_networks(&self) -> Vec<&str> {
        self.links
            .iter()
            .map(|link| link.indy_network_id.as_str())
            .collect()
    }

    pub fn linked_count(&self) -> usize {
        self.links.len()
    }

    /// Stop all forwarding tasks
    pub fn shutdown(self) {
        for link in &self.links {
            link.task.abort();
        }
        tracing::info!(linked = self.links.len(), "Event bridge stopped");
    }
}

/// Forward one worker's events into `room` until its source closes
///
/// A single task handles both event kinds so a worker's events reach the
/// room in emission order.
async fn forward(
    mut rx: broadcast::Receiver<WorkerEvent>,
    room: String,
    directory: Arc<ChannelDirectory>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                let name = event.name();
                let recipients = directory.publish(&room, &ServerMessage::from(event));
                tracing::debug!(
                    room = %room,
                    event = %name,
                    recipients,
                    "Broadcasting worker event"
                );
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(room = %room, lagged = n, "Event bridge lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!(room = %room, "Worker event source closed");
                break;
            }
        }
    }
}
