//! Storage Adapters
//!
//! Implementations of the SessionStateStore port.
//!
//! - **InMemorySessionStore** - Keeps session progress in process memory

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
