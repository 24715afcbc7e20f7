//! Connection pool error types.

use thiserror::Error;

use crate::ports::ConnectorError;

/// Errors returned by the connection pool.
///
/// Once a pool is running, `acquire` only fails with `Closed`; every other
/// variant is a startup failure.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Pool size must be at least 1")]
    InvalidSize,

    #[error("Failed to open connection for slot {slot}: {source}")]
    Connect {
        slot: usize,
        #[source]
        source: ConnectorError,
    },

    #[error("Connection pool is closed")]
    Closed,
}
