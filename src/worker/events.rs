//! Worker Event Source
//!
//! Typed replacement for a worker's event emitter. Uses a tokio broadcast
//! channel so any number of listeners can observe one worker.

use serde_json::Value;
use std::fmt;
use tokio::sync::broadcast;

/// Default capacity of a worker's event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Names of the events a worker emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    TxProcessed,
    RescanScheduled,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::TxProcessed => "tx-processed",
            EventName::RescanScheduled => "rescan-scheduled",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted by a worker
///
/// Field contents are opaque and forwarded as received.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// A transaction finished processing
    TxProcessed { worker_data: Value, tx_data: Value },
    /// The worker scheduled its next rescan
    RescanScheduled {
        worker_data: Value,
        ms_till_rescan: Value,
    },
}

impl WorkerEvent {
    pub fn name(&self) -> EventName {
        match self {
            WorkerEvent::TxProcessed { .. } => EventName::TxProcessed,
            WorkerEvent::RescanScheduled { .. } => EventName::RescanScheduled,
        }
    }
}

/// Producer side of a worker's events
#[derive(Debug, Clone)]
pub struct EventSource {
    sender: broadcast::Sender<WorkerEvent>,
}

impl EventSource {
    /// Create a source buffering up to `capacity` events per listener
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Emit an event to all current listeners
    ///
    /// Returns the number of listeners. Emitting with none is fine.
    pub fn emit(&self, event: WorkerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn emit_tx_processed(&self, worker_data: Value, tx_data: Value) -> usize {
        self.emit(WorkerEvent::TxProcessed {
            worker_data,
            tx_data,
        })
    }

    pub fn emit_rescan_scheduled(&self, worker_data: Value, ms_till_rescan: Value) -> usize {
        self.emit(WorkerEvent::RescanScheduled {
            worker_data,
            ms_till_rescan,
        })
    }

    /// Attach a new listener
    pub fn subscribe(&self) -> broadcast::Receiver<WorkerEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventSource {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
