//! PostgreSQL implementation of QuestionnaireGateway.
//!
//! Every operation borrows one connection from the pool, runs one
//! statement, and returns the connection before mapping the result.
//! Category indexes are positions in `question_categories` ordered by id.

use async_trait::async_trait;
use sqlx::PgConnection;

use crate::adapters::pool::{ConnectionPool, PooledHandle};
use crate::domain::foundation::{AnswerOptionId, CategoryIndex, QuestionId};
use crate::domain::questionnaire::{AnswerEvent, UserRecord};
use crate::ports::{recover, GatewayError, QuestionnaireGateway};

use super::PgConnector;

/// Resolves a category index to its id inside a statement.
const CATEGORY_AT_INDEX: &str =
    "(SELECT id FROM question_categories ORDER BY id OFFSET $1 LIMIT 1)";

/// PostgreSQL implementation of the QuestionnaireGateway port.
#[derive(Debug, Clone)]
pub struct PostgresQuestionnaireGateway {
    pool: ConnectionPool<PgConnector>,
}

impl PostgresQuestionnaireGateway {
    /// Creates a new gateway over an opened pool.
    pub fn new(pool: ConnectionPool<PgConnector>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool<PgConnector> {
        &self.pool
    }

    async fn conn(&self) -> Result<PooledHandle<PgConnector>, GatewayError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| GatewayError::PoolUnavailable(e.to_string()))
    }

    async fn try_list_categories(&self) -> Result<Vec<String>, GatewayError> {
        let mut conn = self.conn().await?;
        sqlx::query_scalar::<_, String>("SELECT category_name FROM question_categories ORDER BY id")
            .fetch_all(conn_mut(&mut conn))
            .await
            .map_err(db_error)
    }

    async fn try_list_questions(&self, category: CategoryIndex) -> Result<Vec<String>, GatewayError> {
        let mut conn = self.conn().await?;
        let sql = format!(
            "SELECT question_text FROM questions WHERE question_category_id = {} ORDER BY id",
            CATEGORY_AT_INDEX
        );
        sqlx::query_scalar::<_, String>(&sql)
            .bind(category.as_offset())
            .fetch_all(conn_mut(&mut conn))
            .await
            .map_err(db_error)
    }

    async fn try_list_answer_options(&self, question: &str) -> Result<Vec<String>, GatewayError> {
        let mut conn = self.conn().await?;
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT answer_text FROM answer_options
            WHERE question_id = (
                SELECT id FROM questions WHERE question_text = $1 ORDER BY id LIMIT 1
            )
            ORDER BY id
            "#,
        )
        .bind(question)
        .fetch_all(conn_mut(&mut conn))
        .await
        .map_err(db_error)
    }

    async fn try_random_outcome(&self, category: CategoryIndex) -> Result<Option<String>, GatewayError> {
        let mut conn = self.conn().await?;
        let sql = format!(
            "SELECT prophecy_text FROM prophecies WHERE category_id = {} ORDER BY random() LIMIT 1",
            CATEGORY_AT_INDEX
        );
        sqlx::query_scalar::<_, String>(&sql)
            .bind(category.as_offset())
            .fetch_optional(conn_mut(&mut conn))
            .await
            .map_err(db_error)
    }

    async fn try_record_user(&self, user: &UserRecord) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;
        let result = sqlx::query(
            "INSERT INTO users (id, username) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(user.id.as_i64())
        .bind(&user.name)
        .execute(conn_mut(&mut conn))
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            tracing::debug!(user_id = %user.id, "User already recorded");
        }
        Ok(())
    }

    async fn try_record_answer(&self, answer: &AnswerEvent) -> Result<(), GatewayError> {
        let mut conn = self.conn().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO user_answers (user_id, question_id, answer_option_id)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM users WHERE id = $1)
            "#,
        )
        .bind(answer.user_id.as_i64())
        .bind(answer.question_id.as_i64())
        .bind(answer.option_id.as_i64())
        .execute(conn_mut(&mut conn))
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::MissingUser(answer.user_id.as_i64()));
        }
        Ok(())
    }

    async fn try_resolve_question_id(&self, question: &str) -> Result<Option<QuestionId>, GatewayError> {
        let mut conn = self.conn().await?;
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM questions WHERE question_text = $1 ORDER BY id LIMIT 1",
        )
        .bind(question)
        .fetch_optional(conn_mut(&mut conn))
        .await
        .map_err(db_error)?;
        Ok(id.map(QuestionId::new))
    }

    async fn try_resolve_option_id(
        &self,
        question: &str,
        option: &str,
    ) -> Result<Option<AnswerOptionId>, GatewayError> {
        let mut conn = self.conn().await?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM answer_options
            WHERE question_id = (
                SELECT id FROM questions WHERE question_text = $1 ORDER BY id LIMIT 1
            )
            AND answer_text = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(question)
        .bind(option)
        .fetch_optional(conn_mut(&mut conn))
        .await
        .map_err(db_error)?;
        Ok(id.map(AnswerOptionId::new))
    }
}

fn conn_mut(conn: &mut PooledHandle<PgConnector>) -> &mut PgConnection {
    conn
}

fn db_error(e: sqlx::Error) -> GatewayError {
    GatewayError::Database(e.to_string())
}

#[async_trait]
impl QuestionnaireGateway for PostgresQuestionnaireGateway {
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
