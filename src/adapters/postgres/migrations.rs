//! Embedded schema migrations.

use sqlx::migrate::{MigrateError, Migrator};

use crate::adapters::pool::{ConnectionPool, PoolError};

use super::PgConnector;

/// Migrations under `migrations/`, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Could not borrow a connection: {0}")]
    Pool(#[from] PoolError),

    #[error("Migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Applies pending migrations on one pooled connection.
pub async fn run_migrations(pool: &ConnectionPool<PgConnector>) -> Result<(), MigrationError> {
    let mut conn = pool.acquire().await?;
    MIGRATOR.run(&mut *conn).await?;
    tracing::info!(count = MIGRATOR.iter().count(), "Database migrations applied");
    Ok(())
}
