//! Operational HTTP adapter - health and status probes.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{HealthResponse, PoolStatusDto, StatusResponse};
pub use handlers::OpsAppState;
pub use routes::ops_router;
