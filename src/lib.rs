//! # Indyscan Realtime
//!
//! Fans ledger worker events out to WebSocket clients. Clients are grouped
//! into rooms keyed by network id and may switch rooms at any time.
//!
//! ## Modules
//!
//! - [`worker`]: Worker registry interface and in-process worker handles
//! - [`websocket`]: Room directory, connection sessions and the `/ws` transport
//! - [`bridge`]: Links expansion workers' events to their network's room
//! - [`api`]: HTTP server hosting the transport
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use indyscan_realtime::bridge::EventBridge;
//! use indyscan_realtime::websocket::{ChannelDirectory, HubConfig};
//! use indyscan_realtime::worker::{ServiceWorkers, Worker, WorkerHandle, WorkerInfo};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let worker = Arc::new(WorkerHandle::new(WorkerInfo::new("expansion", "sovmain", "domain")));
//!     let workers = ServiceWorkers::new().with_worker(worker.clone() as Arc<dyn Worker>);
//!
//!     let directory = Arc::new(ChannelDirectory::new(HubConfig::default()));
//!     let bridge = EventBridge::attach(&workers, Arc::clone(&directory));
//!
//!     let (mut session, mut rx) = directory.register().unwrap();
//!     session.switch_room("sovmain").unwrap();
//!
//!     worker.events().emit_tx_processed(json!({"id": 1}), json!({"seqNo": 42}));
//!
//!     while let Some(message) = rx.recv().await {
//!         println!("{}", serde_json::to_string(&message).unwrap());
//!     }
//!     bridge.shutdown();
//! }
//! ```

pub mod api;
pub mod bridge;
pub mod config;
pub mod websocket;
pub mod worker;

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use bridge::EventBridge;

pub use websocket::{
    websocket_handler, ChannelDirectory, ClientMessage, ConnectionSession, HubConfig, HubError,
    RoomState, ServerMessage,
};

pub use worker::{
    EventName, EventSource, OperationType, ServiceWorkers, Worker, WorkerEvent, WorkerHandle,
    WorkerInfo, WorkerRegistry,
};

pub use config::{Config, ConfigError, HubSettings, LoadedConfig, LoggingConfig, ServerConfig};
