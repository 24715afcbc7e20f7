//! Tables and connections of the in-memory backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::questionnaire::AnswerEvent;
use crate::ports::{Connector, ConnectorError, GatewayError};

#[derive(Debug, Clone)]
pub(super) struct CategoryRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub(super) struct QuestionRow {
    pub id: i64,
    pub category_id: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub(super) struct OptionRow {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub(super) struct OutcomeRow {
    pub category_id: i64,
    pub text: String,
}

/// Table contents. Rows keep insertion order, which is storage order.
#[derive(Debug, Default)]
pub(super) struct Tables {
    pub categories: Vec<CategoryRow>,
    pub questions: Vec<QuestionRow>,
    pub options: Vec<OptionRow>,
    pub outcomes: Vec<OutcomeRow>,
    pub users: Vec<(i64, String)>,
    pub answers: Vec<AnswerEvent>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Id of the category at a zero-based storage position.
    pub fn category_at(&self, index: usize) -> Option<i64> {
        self.categories.get(index).map(|c| c.id)
    }

    /// Id of the first question with exactly this text.
    pub fn question_by_text(&self, text: &str) -> Option<i64> {
        self.questions.iter().find(|q| q.text == text).map(|q| q.id)
    }

    pub fn user_exists(&self, id: i64) -> bool {
        self.users.iter().any(|(user_id, _)| *user_id == id)
    }
}

/// Shared in-memory store.
///
/// Can be switched offline to make every connection fail, which is how
/// tests drive the gateway's failure policy.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn builder() -> MemoryDatabaseBuilder {
        MemoryDatabaseBuilder::default()
    }

    /// Makes every query and connect attempt fail while `offline` is true.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Adds a category and returns its id.
    pub fn add_category(&self, name: impl Into<String>) -> i64 {
        let mut tables = self.write_tables();
        let id = tables.next_id();
        tables.categories.push(CategoryRow {
            id,
            name: name.into(),
        });
        id
    }

    /// Adds a question to a category and returns its id.
    pub fn add_question(&self, category_id: i64, text: impl Into<String>) -> i64 {
        let mut tables = self.write_tables();
        let id = tables.next_id();
        tables.questions.push(QuestionRow {
            id,
            category_id,
            text: text.into(),
        });
        id
    }

    /// Adds an answer option to a question and returns its id.
    pub fn add_option(&self, question_id: i64, text: impl Into<String>) -> i64 {
        let mut tables = self.write_tables();
        let id = tables.next_id();
        tables.options.push(OptionRow {
            id,
            question_id,
            text: text.into(),
        });
        id
    }

    pub fn add_outcome(&self, category_id: i64, text: impl Into<String>) {
        self.write_tables().outcomes.push(OutcomeRow {
            category_id,
            text: text.into(),
        });
    }

    /// Stored users as `(id, name)` pairs.
    pub fn users(&self) -> Vec<(i64, String)> {
        self.read_tables().users.clone()
    }

    /// Stored answers in insertion order.
    pub fn answers(&self) -> Vec<AnswerEvent> {
        self.read_tables().answers.clone()
    }

    pub(super) fn read_tables(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn write_tables(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds a catalog category by category.
///
/// `question` and `outcome` attach to the most recent `category`; calls made
/// before any category are ignored.
#[derive(Debug, Default)]
pub struct MemoryDatabaseBuilder {
    categories: Vec<(String, Vec<(String, Vec<String>)>, Vec<String>)>,
}

impl MemoryDatabaseBuilder {
    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.categories.push((name.into(), Vec::new(), Vec::new()));
        self
    }

    pub fn question<I, S>(mut self, text: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some((_, questions, _)) = self.categories.last_mut() {
            questions.push((text.into(), options.into_iter().map(Into::into).collect()));
        }
        self
    }

    pub fn outcome(mut self, text: impl Into<String>) -> Self {
        if let Some((_, _, outcomes)) = self.categories.last_mut() {
            outcomes.push(text.into());
        }
        self
    }

    pub fn build(self) -> Arc<MemoryDatabase> {
        let db = MemoryDatabase::new();
        for (name, questions, outcomes) in self.categories {
            let category_id = db.add_category(name);
            for (text, options) in questions {
                let question_id = db.add_question(category_id, text);
                for option in options {
                    db.add_option(question_id, option);
                }
            }
            for outcome in outcomes {
                db.add_outcome(category_id, outcome);
            }
        }
        db
    }
}

/// One "connection" to the in-memory store.
#[derive(Debug)]
pub struct MemoryConnection {
    db: Arc<MemoryDatabase>,
}

impl MemoryConnection {
    pub(super) fn read<T>(&self, query: impl FnOnce(&Tables) -> T) -> Result<T, GatewayError> {
        self.check_online()?;
        Ok(query(&self.db.read_tables()))
    }

    pub(super) fn write<T>(&self, statement: impl FnOnce(&mut Tables) -> T) -> Result<T, GatewayError> {
        self.check_online()?;
        Ok(statement(&mut self.db.write_tables()))
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.db.is_offline() {
            return Err(GatewayError::Database("in-memory database is offline".to_string()));
        }
        Ok(())
    }
}

/// Opens connections to a shared [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryConnector {
    db: Arc<MemoryDatabase>,
    opened: AtomicUsize,
}

impl MemoryConnector {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self {
            db,
            opened: AtomicUsize::new(0),
        }
    }

    /// Number of successful connect calls so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Handle = MemoryConnection;

    async fn connect(&self) -> Result<MemoryConnection, ConnectorError> {
        if self.db.is_offline() {
            return Err(ConnectorError::new("in-memory database is offline"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            db: Arc::clone(&self.db),
        })
    }

    async fn is_valid(&self, handle: &mut MemoryConnection) -> bool {
        !handle.db.is_offline()
    }
}
