//! PostgreSQL connector for the connection pool.

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};

use crate::ports::{Connector, ConnectorError};

/// Opens single `PgConnection`s for the connection pool.
///
/// The pool owns connection lifetimes; this type only knows how to dial
/// the server and ping an existing connection.
#[derive(Clone)]
pub struct PgConnector {
    url: String,
}

impl std::fmt::Debug for PgConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL may carry credentials.
        f.debug_struct("PgConnector").field("url", &"<redacted>").finish()
    }
}

impl PgConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgConnection;

    async fn connect(&self) -> Result<PgConnection, ConnectorError> {
        PgConnection::connect(&self.url)
            .await
            .map_err(|e| ConnectorError::new(e.to_string()))
    }

    async fn is_valid(&self, handle: &mut PgConnection) -> bool {
        match handle.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "PostgreSQL ping failed");
                false
            }
        }
    }
}
