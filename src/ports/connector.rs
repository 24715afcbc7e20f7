//! Connector port - Interface for opening and checking pooled backend handles.
//!
//! The connection pool is generic over this trait. A connector knows how to
//! open one exclusive handle (a database connection, for instance) and how
//! to tell whether an existing handle still works.

use async_trait::async_trait;

/// Errors that can occur while opening a backend handle.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to open backend connection: {message}")]
pub struct ConnectorError {
    pub message: String,
}

impl ConnectorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for opening exclusive backend handles.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The handle a pool slot holds.
    type Handle: Send + 'static;

    /// Opens a fresh handle.
    ///
    /// # Errors
    /// Returns `ConnectorError` if the backend cannot be reached.
    async fn connect(&self) -> Result<Self::Handle, ConnectorError>;

    /// Checks that a handle can still serve queries.
    ///
    /// Called on acquire when the pool is configured to test handles.
    async fn is_valid(&self, handle: &mut Self::Handle) -> bool;
}
