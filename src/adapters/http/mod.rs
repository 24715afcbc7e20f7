//! HTTP adapters - operational endpoints.

pub mod ops;

pub use ops::{ops_router, OpsAppState};
