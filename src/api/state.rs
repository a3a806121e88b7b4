//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::websocket::{ChannelDirectory, HubConfig};
use crate::worker::WorkerRegistry;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Room directory shared with the event bridge
    pub directory: Arc<ChannelDirectory>,
    /// Read-only handle to the worker set
    pub workers: Arc<dyn WorkerRegistry>,
    /// Server configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an existing directory
    pub fn new(
        directory: Arc<ChannelDirectory>,
        workers: Arc<dyn WorkerRegistry>,
        config: ApiConfig,
    ) -> Self {
        Self {
            directory,
            workers,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Create state with a fresh directory built from `hub_config`
    pub fn with_hub_config(
        workers: Arc<dyn WorkerRegistry>,
        config: ApiConfig,
        hub_config: HubConfig,
    ) -> Self {
        Self::new(Arc::new(ChannelDirectory::new(hub_config)), workers, config)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Number of workers whose events reach clients
    pub fn broadcasting_workers(&self) -> usize {
        self.workers
            .workers()
            .iter()
            .filter(|w| w.info().operation_type.is_broadcast_eligible())
            .count()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3708,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
