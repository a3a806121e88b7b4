//! Worker Routes
//!
//! Read-only view of the worker set.
//!
//! - GET /api/v1/workers - All workers
//! - GET /api/v1/workers/:network_id - Workers of one network

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{WorkerListResponse, WorkerResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/v1/workers
pub async fn list_workers(State(state): State<Arc<AppState>>) -> Json<WorkerListResponse> {
    let workers: Vec<WorkerResponse> = state
        .workers
        .workers()
        .iter()
        .map(|w| WorkerResponse::from(w.info()))
        .collect();

    Json(WorkerListResponse {
        total: workers.len(),
        workers,
    })
}

/// GET /api/v1/workers/:network_id
pub async fn network_workers(
    State(state): State<Arc<AppState>>,
    Path(network_id): Path<String>,
) -> ApiResult<Json<WorkerListResponse>> {
    let workers: Vec<WorkerResponse> = state
        .workers
        .workers()
        .iter()
        .filter(|w| w.info().indy_network_id == network_id)
        .map(|w| WorkerResponse::from(w.info()))
        .collect();

    if workers.is_empty() {
        return Err(ApiError::NotFound(format!("No workers for network {}", network_id)));
    }

    Ok(Json(WorkerListResponse {
        total: workers.len(),
        workers,
    }))
}
