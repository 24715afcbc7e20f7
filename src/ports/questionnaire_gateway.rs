//! Questionnaire gateway port - The fixed set of reads and writes the
//! conversation flow needs.
//!
//! # Failure policy
//!
//! Operations never return errors. Implementations catch backend failures,
//! log them, and hand back an empty or `None` result. Callers treat those as
//! "nothing available" and keep the conversation alive.

use async_trait::async_trait;

use crate::domain::foundation::{AnswerOptionId, CategoryIndex, QuestionId};
use crate::domain::questionnaire::{AnswerEvent, UserRecord};

/// Errors adapters hit internally before degrading to an empty result.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("Connection pool unavailable: {0}")]
    PoolUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Referenced user does not exist: {0}")]
    MissingUser(i64),
}

/// Port for questionnaire data access.
///
/// Each call borrows one pooled handle for the duration of a single
/// statement and returns it before the call completes.
#[async_trait]
pub trait QuestionnaireGateway: Send + Sync {
    /// Category names in storage order.
    async fn list_categories(&self) -> Vec<String>;

    /// Question texts of a category in storage order.
    ///
    /// Empty when the category has no questions or does not exist.
    async fn list_questions(&self, category: CategoryIndex) -> Vec<String>;

    /// Answer option texts of the question with exactly this text.
    async fn list_answer_options(&self, question: &str) -> Vec<String>;

    /// One outcome of the category, picked uniformly at random.
    async fn random_outcome(&self, category: CategoryIndex) -> Option<String>;

    /// Stores a user. Storing an id that already exists is a no-op.
    async fn record_user(&self, user: &UserRecord);

    /// Stores an answer. Skipped (and logged) when the user does not exist.
    async fn record_answer(&self, answer: &AnswerEvent);

    /// Id of the question with exactly this text.
    async fn resolve_question_id(&self, question: &str) -> Option<QuestionId>;

    /// Id of the option with exactly this text under the question with exactly this text.
    async fn resolve_option_id(&self, question: &str, option: &str) -> Option<AnswerOptionId>;
}

/// Unwraps a gateway result, logging the error and substituting `fallback`.
pub fn recover<T>(operation: &'static str, result: Result<T, GatewayError>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(operation, error = %e, "Questionnaire gateway operation failed");
            fallback
        }
    }
}
