//! HTTP Surface
//!
//! Hosts the realtime WebSocket endpoint plus a few read-only routes,
//! built with Axum.
//!
//! # Endpoints
//!
//! ## WebSocket
//! - `GET /ws` - Realtime connection (rooms per network)
//!
//! ## Workers
//! - `GET /api/v1/workers` - List workers
//! - `GET /api/v1/workers/:network_id` - Workers of one network
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Connection and room counts
//!
//! # Example
//!
//! ```rust,ignore
//! use indyscan_realtime::api::{serve, ApiConfig, AppState};
//! use indyscan_realtime::bridge::EventBridge;
//! use indyscan_realtime::websocket::HubConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let workers = Arc::new(load_workers());
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::with_hub_config(workers.clone(), config.clone(), HubConfig::default());
//!     let bridge = EventBridge::attach(workers.as_ref(), Arc::clone(&state.directory));
//!     serve(state, &config).await?;
//!     bridge.shutdown();
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/workers", get(routes::workers::list_workers))
        .route("/workers/:network_id", get(routes::workers::network_workers));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/ws", get(websocket_handler))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the server and run until a shutdown signal arrives
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Realtime server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Realtime server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
