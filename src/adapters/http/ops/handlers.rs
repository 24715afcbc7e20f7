//! HTTP handlers for operational endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::adapters::pool::PoolMonitor;
use crate::ports::SessionStateStore;

use super::dto::{HealthResponse, StatusResponse};

/// Application state for operational endpoints.
#[derive(Clone)]
pub struct OpsAppState {
    /// Pool whose occupancy is reported
    pub pool: Arc<dyn PoolMonitor>,
    /// Session store whose size is reported
    pub sessions: Arc<dyn SessionStateStore>,
}

/// Liveness probe.
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Pool occupancy and in-flight session count.
///
/// GET /status
pub async fn status(State(state): State<OpsAppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        pool: state.pool.status().into(),
        active_sessions: state.sessions.active_sessions().await,
    })
}
