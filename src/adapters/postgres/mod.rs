//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PgConnector` - Opens the connections the pool lends out
//! - `PostgresQuestionnaireGateway` - Questionnaire reads and writes
//! - `run_migrations` - Applies the embedded schema

mod connector;
mod migrations;
mod questionnaire_gateway;

pub use connector::PgConnector;
pub use migrations::{run_migrations, MigrationError, MIGRATOR};
pub use questionnaire_gateway::PostgresQuestionnaireGateway;
