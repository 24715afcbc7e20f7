//! Response bodies for the operational endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::pool::PoolStatus;

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Pool occupancy as reported by `GET /status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatusDto {
    pub size: usize,
    pub available: usize,
    pub checked_out: usize,
}

impl From<PoolStatus> for PoolStatusDto {
    fn from(status: PoolStatus) -> Self {
        Self {
            size: status.size,
            available: status.available,
            checked_out: status.checked_out,
        }
    }
}

/// `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub pool: PoolStatusDto,
    pub active_sessions: usize,
}
