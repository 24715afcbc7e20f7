//! Connection pool adapter.
//!
//! A fixed set of backend handles opened once at startup and lent out one
//! caller at a time.
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::pool::{ConnectionPool, PoolOptions};
//!
//! let pool = ConnectionPool::connect(connector, PoolOptions::default()).await?;
//!
//! let mut conn = pool.acquire().await?;
//! run_query(&mut *conn).await;
//! conn.release(); // or let it drop
//! ```

mod connection_pool;
mod error;

pub use connection_pool::{ConnectionPool, PoolMonitor, PoolOptions, PoolStatus, PooledHandle};
pub use error::PoolError;
