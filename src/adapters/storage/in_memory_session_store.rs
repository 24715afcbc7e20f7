//! In-Memory Session Store Adapter
//!
//! Keeps per-session questionnaire progress in a process-local map.
//! Progress is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::SessionProgress;
use crate::domain::foundation::{CategoryIndex, SessionId};
use crate::ports::SessionStateStore;

/// In-memory storage for session progress.
///
/// Every mutation holds the write lock for its whole read-modify-write,
/// so operations on one session are linearized.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionProgress>>>,
}

impl InMemorySessionStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStateStore for InMemorySessionStore {
    async fn get(&self, session: SessionId) -> Option<SessionProgress> {
        self.sessions.read().await.get(&session).copied()
    }

    async fn set_category(&self, session: SessionId, category: CategoryIndex) {
        let previous = self
            .sessions
            .write()
            .await
            .insert(session, SessionProgress::started(category));
        if let Some(previous) = previous {
            tracing::debug!(
                session_id = %session,
                previous_category = %previous.category.as_usize(),
                "Replaced session progress"
            );
        }
    }

    async fn advance(&self, session: SessionId) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&session).map(SessionProgress::advance)
    }

    async fn clear(&self, session: SessionId) -> Option<SessionProgress> {
        self.sessions.write().await.remove(&session)
    }

    async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}
