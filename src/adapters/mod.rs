//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `pool` - Fixed-size connection pool shared by every gateway call
//! - `postgres` - PostgreSQL connector, gateway, and migrations
//! - `memory` - In-process catalog for tests and local runs
//! - `storage` - Session progress store
//! - `telegram` - Bot API transport
//! - `http` - Health and status endpoints

pub mod http;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod storage;
pub mod telegram;
