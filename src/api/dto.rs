//! Data Transfer Objects
//!
//! Response types for the HTTP endpoints.

use serde::Serialize;

use crate::worker::{OperationType, WorkerInfo};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy"
    pub status: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
    /// Live WebSocket connections
    pub connections: usize,
    /// Rooms with at least one member
    pub channels: usize,
    /// Workers whose events are broadcast
    pub linked_workers: usize,
}

/// One worker as listed by `GET /api/v1/workers`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    pub operation_type: OperationType,
    pub indy_network_id: String,
    pub subledger: String,
    /// Whether this worker's events reach realtime clients
    pub broadcasting: bool,
}

impl From<&WorkerInfo> for WorkerResponse {
    fn from(info: &WorkerInfo) -> Self {
        Self {
            operation_type: info.operation_type.clone(),
            indy_network_id: info.indy_network_id.clone(),
            subledger: info.subledger.clone(),
            broadcasting: info.operation_type.is_broadcast_eligible(),
        }
    }
}

/// Worker list response
#[derive(Debug, Serialize)]
pub struct WorkerListResponse {
    pub workers: Vec<WorkerResponse>,
    pub total: usize,
}
