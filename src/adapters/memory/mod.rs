//! In-memory questionnaire backend.
//!
//! A process-local catalog reached through the same connection pool the
//! PostgreSQL adapter uses, so tests and local runs exercise real pool
//! behavior without a database.
//!
//! ## Usage
//!
//! ```ignore
//! let db = MemoryDatabase::builder()
//!     .category("Love")
//!     .question("Will I meet someone?", ["Yes", "No"])
//!     .outcome("Soon.")
//!     .build();
//! let gateway = InMemoryQuestionnaireGateway::connect(db, PoolOptions::default()).await?;
//! ```

mod database;
mod gateway;

pub use database::{MemoryConnection, MemoryConnector, MemoryDatabase, MemoryDatabaseBuilder};
pub use gateway::InMemoryQuestionnaireGateway;
