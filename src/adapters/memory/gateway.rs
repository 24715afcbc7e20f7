//! In-memory implementation of QuestionnaireGateway.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::adapters::pool::{ConnectionPool, PoolError, PoolOptions, PooledHandle};
use crate::domain::foundation::{AnswerOptionId, CategoryIndex, QuestionId};
use crate::domain::questionnaire::{AnswerEvent, UserRecord};
use crate::ports::{recover, GatewayError, QuestionnaireGateway};

use super::{MemoryConnector, MemoryDatabase};

/// Questionnaire gateway over a [`MemoryDatabase`], reached through a
/// [`ConnectionPool`].
#[derive(Debug, Clone)]
pub struct InMemoryQuestionnaireGateway {
    pool: ConnectionPool<MemoryConnector>,
    db: Arc<MemoryDatabase>,
}

impl InMemoryQuestionnaireGateway {
    /// Opens a pool over `db` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns `PoolError` if the pool cannot be opened (zero size, or the
    /// database is offline).
    pub async fn connect(db: Arc<MemoryDatabase>, options: PoolOptions) -> Result<Self, PoolError> {
        let pool = ConnectionPool::connect(MemoryConnector::new(Arc::clone(&db)), options).await?;
        Ok(Self { pool, db })
    }

    pub fn pool(&self) -> &ConnectionPool<MemoryConnector> {
        &self.pool
    }

    pub fn database(&self) -> &Arc<MemoryDatabase> {
        &self.db
    }

    async fn conn(&self) -> Result<PooledHandle<MemoryConnector>, GatewayError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| GatewayError::PoolUnavailable(e.to_string()))
    }

    async fn try_list_categories(&self) -> Result<Vec<String>, GatewayError> {
        let conn = self.conn().await?;
        conn.read(|t| t.categories.iter().map(|c| c.name.clone()).collect())
    }

    async fn try_list_questions(&self, category: CategoryIndex) -> Result<Vec<String>, GatewayError> {
        let conn = self.conn().await?;
        conn.read(|t| {
            let Some(category_id) = t.category_at(category.as_usize()) else {
                return Vec::new();
            };
            t.questions
                .iter()
                .filter(|q| q.category_id == category_id)
                .map(|q| q.text.clone())
                .collect()
        })
    }

    async fn try_list_answer_options(&self, question: &str) -> Result<Vec<String>, GatewayError> {
        let conn = self.conn().await?;
        conn.read(|t| {
            let Some(question_id) = t.question_by_text(question) else {
                return Vec::new();
            };
            t.options
                .iter()
                .filter(|o| o.question_id == question_id)
                .map(|o| o.text.clone())
                .collect()
        })
    }

    async fn try_random_outcome(&self, category: CategoryIndex) -> Result<Option<String>, GatewayError> {
        let conn = self.conn().await?;
        conn.read(|t| {
            let category_id = t.category_at(category.as_usize())?;
            let candidates: Vec<&String> = t
                .outcomes
                .iter()
                .filter(|o| o.category_id == category_id)
                .map(|o| &o.text)
                .collect();
            candidates
                .choose(&mut rand::thread_rng())
                .map(|text| (*text).clone())
        })
    }

    async fn try_record_user(&self, user: &UserRecord) -> Result<(), GatewayError> {
        let conn = self.conn().await?;
        conn.write(|t| {
            if t.user_exists(user.id.as_i64()) {
                tracing::debug!(user_id = %user.id, "User already recorded");
            } else {
                t.users.push((user.id.as_i64(), user.name.clone()));
            }
        })
    }

    async fn try_record_answer(&self, answer: &AnswerEvent) -> Result<(), GatewayError> {
        let conn = self.conn().await?;
        conn.write(|t| {
            if !t.user_exists(answer.user_id.as_i64()) {
                return Err(GatewayError::MissingUser(answer.user_id.as_i64()));
            }
            t.answers.push(*answer);
            Ok(())
        })?
    }

    async fn try_resolve_question_id(&self, question: &str) -> Result<Option<QuestionId>, GatewayError> {
        let conn = self.conn().await?;
        conn.read(|t| t.question_by_text(question).map(QuestionId::new))
    }

    async fn try_resolve_option_id(
        &self,
        question: &str,
        option: &str,
    ) -> Result<Option<AnswerOptionId>, GatewayError> {
        let conn = self.conn().await?;
        conn.read(|t| {
            let question_id = t.question_by_text(question)?;
            t.options
                .iter()
                .find(|o| o.question_id == question_id && o.text == option)
                .map(|o| AnswerOptionId::new(o.id))
        })
    }
}

#[async_trait]
impl QuestionnaireGateway for InMemoryQuestionnaireGateway {
    async fn list_categories(&self) -> Vec<String> {
        recover("list_categories", self.try_list_categories().await, Vec::new())
    }

    async fn list_questions(&self, category: CategoryIndex) -> Vec<String> {
        recover("list_questions", self.try_list_questions(category).await, Vec::new())
    }

    async fn list_answer_options(&self, question: &str) -> Vec<String> {
        recover(
            "list_answer_options",
            self.try_list_answer_options(question).await,
            Vec::new(),
        )
    }

    async fn random_outcome(&self, category: CategoryIndex) -> Option<String> {
        recover("random_outcome", self.try_random_outcome(category).await, None)
    }

    async fn record_user(&self, user: &UserRecord) {
        recover("record_user", self.try_record_user(user).await, ())
    }

    async fn record_answer(&self, answer: &AnswerEvent) {
        recover("record_answer", self.try_record_answer(answer).await, ())
    }

    async fn resolve_question_id(&self, question: &str) -> Option<QuestionId> {
        recover(
            "resolve_question_id",
            self.try_resolve_question_id(question).await,
            None,
        )
    }

    async fn resolve_option_id(&self, question: &str, option: &str) -> Option<AnswerOptionId> {
        recover(
            "resolve_option_id",
            self.try_resolve_option_id(question, option).await,
            None,
        )
    }
}
