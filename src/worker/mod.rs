//! Worker Registry
//!
//! The ledger workers themselves live outside this crate. What the realtime
//! layer needs from them is small:
//!
//! - static metadata ([`WorkerInfo`]): operation kind, network id, subledger
//! - an [`EventSource`] it can subscribe to
//!
//! [`WorkerRegistry`] is the read-only handle to the set of workers, scanned
//! once at startup. [`WorkerHandle`] and [`ServiceWorkers`] are the concrete
//! in-process implementations used by the binary and the tests.

mod events;

pub use events::{EventName, EventSource, WorkerEvent, DEFAULT_EVENT_CAPACITY};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Kind of operation a worker performs
///
/// Only [`OperationType::Expansion`] workers are broadcast to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationType {
    /// Expands raw ledger transactions; its events reach realtime clients
    Expansion,
    /// Any other operation kind, kept verbatim
    Other(String),
}

impl OperationType {
    pub const EXPANSION: &'static str = "expansion";

    /// Whether events from workers of this kind are bridged to clients
    pub fn is_broadcast_eligible(&self) -> bool {
        matches!(self, OperationType::Expansion)
    }

    pub fn as_str(&self) -> &str {
        match self {
            OperationType::Expansion => Self::EXPANSION,
            OperationType::Other(kind) => kind,
        }
    }
}

impl From<String> for OperationType {
    fn from(kind: String) -> Self {
        if kind == Self::EXPANSION {
            OperationType::Expansion
        } else {
            OperationType::Other(kind)
        }
    }
}

impl From<&str> for OperationType {
    fn from(kind: &str) -> Self {
        OperationType::from(kind.to_string())
    }
}

impl From<OperationType> for String {
    fn from(kind: OperationType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata of a worker, fixed at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerInfo {
    pub operation_type: OperationType,
    /// Network the worker processes; also the room key for its events
    pub indy_network_id: String,
    /// Informational only
    pub subledger: String,
}

impl WorkerInfo {
    pub fn new(
        operation_type: impl Into<OperationType>,
        indy_network_id: impl Into<String>,
        subledger: impl Into<String>,
    ) -> Self {
        Self {
            operation_type: operation_type.into(),
            indy_network_id: indy_network_id.into(),
            subledger: subledger.into(),
        }
    }
}

/// A unit of work producing ledger events
pub trait Worker: Send + Sync {
    /// Metadata of this worker
    fn info(&self) -> &WorkerInfo;

    /// Subscribe to the worker's event source
    ///
    /// The receiver observes every event emitted after this call returns.
    fn subscribe(&self) -> broadcast::Receiver<WorkerEvent>;
}

/// Read-only view over the set of workers
pub trait WorkerRegistry: Send + Sync {
    /// All workers, in a stable order
    fn workers(&self) -> Vec<Arc<dyn Worker>>;
}

/// In-process worker: metadata plus its own event source
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    info: WorkerInfo,
    events: EventSource,
}

impl WorkerHandle {
    /// Create a worker with the default event capacity
    pub fn new(info: WorkerInfo) -> Self {
        Self::with_capacity(info, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(info: WorkerInfo, capacity: usize) -> Self {
        Self {
            info,
            events: EventSource::new(capacity),
        }
    }

    /// Event source used to emit this worker's events
    pub fn events(&self) -> &EventSource {
        &self.events
    }
}

impl Worker for WorkerHandle {
    fn info(&self) -> &WorkerInfo {
        &self.info
    }

    fn subscribe(&self) -> broadcast::Receiver<WorkerEvent> {
        self.events.subscribe()
    }
}

/// Fixed set of workers, enumerated once at startup
#[derive(Clone, Default)]
pub struct ServiceWorkers {
    workers: Vec<Arc<dyn Worker>>,
}

impl ServiceWorkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worker to the set
    pub fn with_worker(mut self, worker: Arc<dyn Worker>) -> Self {
        self.workers.push(worker);
        self
    }

    pub fn push(&mut self, worker: Arc<dyn Worker>) {
        self.workers.push(worker);
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

impl FromIterator<Arc<dyn Worker>> for ServiceWorkers {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Worker>>>(iter: I) -> Self {
        Self {
            workers: iter.into_iter().collect(),
        }
    }
}

impl WorkerRegistry for ServiceWorkers {
    fn workers(&self) -> Vec<Arc<dyn Worker>> {
        self.workers.clone()
    }
}
