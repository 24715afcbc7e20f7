//! Session state store port - Interface for per-session questionnaire progress.
//!
//! Every inbound message reads or writes this store, so implementations must
//! be safe under concurrent access. Operations on the same session id are
//! linearized: each call observes the effects of every call that completed
//! before it, and `advance` never loses an increment.

use async_trait::async_trait;

use crate::domain::conversation::SessionProgress;
use crate::domain::foundation::{CategoryIndex, SessionId};

/// Port for transient session progress.
#[async_trait]
pub trait SessionStateStore: Send + Sync {
    /// Current progress of a session, if it has any.
    async fn get(&self, session: SessionId) -> Option<SessionProgress>;

    /// Starts a run in `category`, replacing any previous progress.
    async fn set_category(&self, session: SessionId, category: CategoryIndex);

    /// Moves to the next question and returns its index.
    ///
    /// Returns `None` if the session has no progress (it was cleared).
    async fn advance(&self, session: SessionId) -> Option<usize>;

    /// Removes a session's progress, returning what was there.
    async fn clear(&self, session: SessionId) -> Option<SessionProgress>;

    /// Number of sessions with progress.
    async fn active_sessions(&self) -> usize;
}
