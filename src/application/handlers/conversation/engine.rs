//! ConversationEngine - drives one session through a questionnaire run.
//!
//! Every inbound message is handled independently: the engine reads the
//! session's stored progress, decides the transition, calls the gateway for
//! the data it needs, writes the new progress back, and returns the replies.
//! Sessions never share state here; the gateway and the session store are
//! the only shared collaborators.

use std::sync::Arc;

use crate::domain::conversation::{
    replies, BotCommand, ConversationPhase, InboundMessage, OutboundMessage, ReplyMarkup,
};
use crate::domain::foundation::{CategoryIndex, SessionId, StateMachine, UserId};
use crate::domain::questionnaire::{AnswerEvent, MenuSelection, SelectionError, UserRecord};
use crate::ports::{QuestionnaireGateway, SessionStateStore};

/// Behaviour switches for the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Clear in-flight progress when `/start` arrives mid-run.
    pub reset_on_start: bool,
}

/// The conversation state machine driver.
#[derive(Clone)]
pub struct ConversationEngine {
    gateway: Arc<dyn QuestionnaireGateway>,
    sessions: Arc<dyn SessionStateStore>,
    config: EngineConfig,
}

impl ConversationEngine {
    pub fn new(
        gateway: Arc<dyn QuestionnaireGateway>,
        sessions: Arc<dyn SessionStateStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            gateway,
            sessions,
            config,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStateStore> {
        &self.sessions
    }

    /// Handles one inbound message and returns the replies, in send order.
    pub async fn handle(&self, message: InboundMessage) -> Vec<OutboundMessage> {
        let session = message.session_id;
        let text = message.text.trim();

        if let Some(command) = BotCommand::parse(text) {
            return self.handle_command(command, &message).await;
        }

        let progress = self.sessions.get(session).await;
        match progress.and_then(|p| p.phase().question_index().map(|index| (p.category, index))) {
            Some((category, index)) => self.handle_answer(session, category, index, text).await,
            None => self.handle_category_choice(session, text).await,
        }
    }

    async fn handle_command(
        &self,
        command: BotCommand,
        message: &InboundMessage,
    ) -> Vec<OutboundMessage> {
        let session = message.session_id;
        tracing::debug!(session_id = %session, command = command.command(), "Command received");

        match command {
            BotCommand::Start => {
                let user = UserRecord::new(UserId::from(session), message.display_name.as_str());
                self.gateway.record_user(&user).await;

                if self.config.reset_on_start {
                    if let Some(previous) = self.sessions.clear(session).await {
                        tracing::info!(
                            session_id = %session,
                            category = previous.category.as_usize(),
                            "Discarded in-flight run on /start"
                        );
                    }
                }

                let categories = self.gateway.list_categories().await;
                vec![
                    OutboundMessage::text(session, replies::greeting(&user.name)),
                    OutboundMessage::text(session, replies::category_list(&categories))
                        .with_markup(ReplyMarkup::CommandKeyboard),
                ]
            }
            BotCommand::Info => vec![OutboundMessage::text(session, replies::info())],
        }
    }

    async fn handle_category_choice(&self, session: SessionId, text: &str) -> Vec<OutboundMessage> {
        let categories = self.gateway.list_categories().await;
        if categories.is_empty() {
            return vec![OutboundMessage::text(session, replies::category_list(&categories))];
        }

        let selection = match MenuSelection::parse(text, categories.len()) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::debug!(session_id = %session, error = %e, "Rejected category reply");
                let reply = match e {
                    SelectionError::NotANumber => replies::CATEGORY_NOT_A_NUMBER,
                    SelectionError::OutOfRange { .. } => replies::INVALID_CATEGORY_NUMBER,
                };
                return vec![OutboundMessage::text(session, reply)];
            }
        };

        let category = CategoryIndex::new(selection.index());
        let questions = self.gateway.list_questions(category).await;
        if questions.is_empty() {
            tracing::info!(session_id = %session, category = category.as_usize(), "Category has no questions");
            return vec![OutboundMessage::text(session, replies::NO_QUESTIONS_IN_CATEGORY)];
        }

        self.sessions.set_category(session, category).await;
        let Some(index) = self.sessions.advance(session).await else {
            tracing::debug!(session_id = %session, "Session cleared while starting a run");
            return Vec::new();
        };
        log_transition(session, ConversationPhase::AwaitingCategory, ConversationPhase::InQuestion(index));

        match questions.get(index) {
            Some(question) => self.present_question(session, question).await,
            None => self.restart_after_change(session).await,
        }
    }

    async fn handle_answer(
        &self,
        session: SessionId,
        category: CategoryIndex,
        index: usize,
        text: &str,
    ) -> Vec<OutboundMessage> {
        let questions = self.gateway.list_questions(category).await;
        let Some(question) = questions.get(index) else {
            tracing::warn!(
                session_id = %session,
                category = category.as_usize(),
                question_index = index,
                question_count = questions.len(),
                "Stored question index no longer fits the category"
            );
            return self.restart_after_change(session).await;
        };

        let options = self.gateway.list_answer_options(question).await;
        let selection = match MenuSelection::parse(text, options.len()) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::debug!(session_id = %session, error = %e, "Rejected answer reply");
                let reply = match e {
                    SelectionError::NotANumber => replies::ANSWER_NOT_A_NUMBER,
                    SelectionError::OutOfRange { .. } => replies::INVALID_ANSWER_NUMBER,
                };
                return vec![OutboundMessage::text(session, reply)];
            }
        };

        self.record_answer(session, question, &options[selection.index()])
            .await;

        let Some(next) = self.sessions.advance(session).await else {
            tracing::debug!(session_id = %session, "Session cleared while answering");
            return Vec::new();
        };

        let current = ConversationPhase::InQuestion(index);
        match questions.get(next) {
            Some(question) => {
                log_transition(session, current, ConversationPhase::InQuestion(next));
                self.present_question(session, question).await
            }
            None => {
                log_transition(session, current, ConversationPhase::Finalizing);
                self.finalize(session, category).await
            }
        }
    }

    /// Persists the answer when both identifiers still resolve.
    async fn record_answer(&self, session: SessionId, question: &str, option: &str) {
        let question_id = self.gateway.resolve_question_id(question).await;
        let option_id = self.gateway.resolve_option_id(question, option).await;

        match AnswerEvent::resolved(UserId::from(session), question_id, option_id) {
            Ok(answer) => self.gateway.record_answer(&answer).await,
            Err(e) => {
                tracing::warn!(session_id = %session, error = %e, "Answer not persisted");
            }
        }
    }

    async fn present_question(&self, session: SessionId, question: &str) -> Vec<OutboundMessage> {
        let options = self.gateway.list_answer_options(question).await;
        if options.is_empty() {
            tracing::warn!(session_id = %session, "Question has no answer options");
        }
        vec![
            OutboundMessage::text(session, replies::question(question)),
            OutboundMessage::text(session, replies::answer_options(&options)),
        ]
    }

    async fn finalize(&self, session: SessionId, category: CategoryIndex) -> Vec<OutboundMessage> {
        let outcome = self.gateway.random_outcome(category).await;
        if outcome.is_none() {
            tracing::warn!(session_id = %session, category = category.as_usize(), "No outcome for category");
        }
        let categories = self.gateway.list_categories().await;

        self.sessions.clear(session).await;
        log_transition(session, ConversationPhase::Finalizing, ConversationPhase::AwaitingCategory);

        vec![
            OutboundMessage::text(session, replies::prophecy(outcome.as_deref())),
            OutboundMessage::text(session, replies::category_list(&categories)),
        ]
    }

    async fn restart_after_change(&self, session: SessionId) -> Vec<OutboundMessage> {
        self.sessions.clear(session).await;
        let categories = self.gateway.list_categories().await;
        vec![
            OutboundMessage::text(session, replies::QUESTIONS_CHANGED),
            OutboundMessage::text(session, replies::category_list(&categories)),
        ]
    }
}

fn log_transition(session: SessionId, from: ConversationPhase, to: ConversationPhase) {
    match from.transition_to(to) {
        Ok(phase) => tracing::debug!(session_id = %session, ?phase, "Session advanced"),
        // Only reachable when one session's messages are handled concurrently.
        Err(e) => tracing::warn!(session_id = %session, error = %e, "Unexpected phase change"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryQuestionnaireGateway, MemoryDatabase};
    use crate::adapters::pool::PoolOptions;
    use crate::adapters::storage::InMemorySessionStore;

    struct Harness {
        engine: ConversationEngine,
        db: Arc<MemoryDatabase>,
        store: InMemorySessionStore,
    }

    async fn harness_with(db: Arc<MemoryDatabase>, config: EngineConfig) -> Harness {
        let gateway = InMemoryQuestionnaireGateway::connect(Arc::clone(&db), PoolOptions::default())
            .await
            .unwrap();
        let store = InMemorySessionStore::new();
        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(store.clone()), config);
        Harness { engine, db, store }
    }

    fn love_and_career() -> Arc<MemoryDatabase> {
        MemoryDatabase::builder()
            .category("Love")
            .question("Q1", ["A", "B"])
            .outcome("Romance ahead")
            .category("Career")
            .build()
    }

    fn two_question_catalog() -> Arc<MemoryDatabase> {
        MemoryDatabase::builder()
            .category("Travel")
            .question("Where to?", ["North", "South"])
            .question("When?", ["Now", "Later", "Never"])
            .outcome("A long road")
            .build()
    }

    async fn harness(db: Arc<MemoryDatabase>) -> Harness {
        harness_with(db, EngineConfig::default()).await
    }

    const SESSION: SessionId = SessionId::new(42);

    async fn send(h: &Harness, text: &str) -> Vec<String> {
        h.engine
            .handle(InboundMessage::new(SESSION, text, "Ann"))
            .await
            .into_iter()
            .map(|m| m.text)
            .collect()
    }

    #[tokio::test]
    async fn start_greets_records_user_and_lists_categories() {
        let h = harness(love_and_career()).await;
        let out = h.engine.handle(InboundMessage::new(SESSION, "/start", "Ann")).await;

        assert_eq!(out.len(), 2);
        assert!(out[0].text.starts_with("Hello, Ann!"));
        assert_eq!(out[1].text, "Categories:\n1. Love\n2. Career\n");
        assert_eq!(out[1].markup, ReplyMarkup::CommandKeyboard);
        assert_eq!(h.db.users(), vec![(42, "Ann".to_string())]);
    }

    #[tokio::test]
    async fn info_explains_usage_without_state() {
        let h = harness(love_and_career()).await;
        let out = send(&h, "/info").await;
        assert_eq!(out, vec![replies::info()]);
        assert_eq!(h.store.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn selecting_category_presents_first_question() {
        let h = harness(love_and_career()).await;
        let out = send(&h, "1").await;

        assert_eq!(
            out,
            vec![
                "Question:\nQ1".to_string(),
                "Enter the number of your answer:\n1. A\n2. B\n".to_string(),
            ]
        );
        let progress = h.store.get(SESSION).await.unwrap();
        assert_eq!(progress.category, CategoryIndex::new(0));
        assert_eq!(progress.question_index, Some(0));
    }

    #[tokio::test]
    async fn answering_last_question_delivers_prophecy_and_clears() {
        let h = harness(love_and_career()).await;
        send(&h, "/start").await;
        send(&h, "1").await;
        let out = send(&h, "2").await;

        assert_eq!(
            out,
            vec![
                "Your prophecy:\nRomance ahead".to_string(),
                "Categories:\n1. Love\n2. Career\n".to_string(),
            ]
        );
        assert_eq!(h.store.get(SESSION).await, None);

        let answers = h.db.answers();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].user_id, UserId::new(42));
    }

    #[tokio::test]
    async fn out_of_range_category_stores_nothing() {
        let h = harness(love_and_career()).await;
        for _ in 0..3 {
            assert_eq!(send(&h, "99").await, vec![replies::INVALID_CATEGORY_NUMBER.to_string()]);
        }
        assert_eq!(send(&h, "0").await, vec![replies::INVALID_CATEGORY_NUMBER.to_string()]);
        assert_eq!(h.store.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn non_numeric_category_is_rejected() {
        let h = harness(love_and_career()).await;
        assert_eq!(send(&h, "love").await, vec![replies::CATEGORY_NOT_A_NUMBER.to_string()]);
        assert_eq!(h.store.get(SESSION).await, None);
    }

    #[tokio::test]
    async fn empty_category_reports_and_stays_stateless() {
        let h = harness(love_and_career()).await;
        assert_eq!(send(&h, "2").await, vec![replies::NO_QUESTIONS_IN_CATEGORY.to_string()]);
        assert_eq!(h.store.get(SESSION).await, None);
    }

    #[tokio::test]
    async fn invalid_answer_keeps_progress() {
        let h = harness(two_question_catalog()).await;
        send(&h, "1").await;

        assert_eq!(send(&h, "3").await, vec![replies::INVALID_ANSWER_NUMBER.to_string()]);
        assert_eq!(send(&h, "x").await, vec![replies::ANSWER_NOT_A_NUMBER.to_string()]);
        assert_eq!(h.store.get(SESSION).await.unwrap().question_index, Some(0));
    }

    #[tokio::test]
    async fn answers_advance_through_questions() {
        let h = harness(two_question_catalog()).await;
        send(&h, "/start").await;
        send(&h, "1").await;

        let out = send(&h, " 2 ").await;
        assert_eq!(out[0], "Question:\nWhen?");
        assert_eq!(out[1], "Enter the number of your answer:\n1. Now\n2. Later\n3. Never\n");
        assert_eq!(h.store.get(SESSION).await.unwrap().question_index, Some(1));

        let out = send(&h, "3").await;
        assert_eq!(out[0], "Your prophecy:\nA long road");
        assert_eq!(h.db.answers().len(), 2);
    }

    #[tokio::test]
    async fn start_mid_run_keeps_progress_by_default() {
        let h = harness(two_question_catalog()).await;
        send(&h, "1").await;
        send(&h, "/start").await;
        assert_eq!(h.store.get(SESSION).await.unwrap().question_index, Some(0));
    }

    #[tokio::test]
    async fn start_mid_run_resets_when_configured() {
        let h = harness_with(two_question_catalog(), EngineConfig { reset_on_start: true }).await;
        send(&h, "1").await;
        send(&h, "/start").await;
        assert_eq!(h.store.get(SESSION).await, None);
    }

    #[tokio::test]
    async fn answer_without_registered_user_still_advances() {
        let h = harness(two_question_catalog()).await;
        send(&h, "1").await;
        send(&h, "1").await;

        assert!(h.db.answers().is_empty());
        assert_eq!(h.store.get(SESSION).await.unwrap().question_index, Some(1));
    }

    #[tokio::test]
    async fn missing_outcome_uses_fallback() {
        let db = MemoryDatabase::builder()
            .category("Silence")
            .question("Q", ["Yes"])
            .build();
        let h = harness(db).await;
        send(&h, "1").await;
        let out = send(&h, "1").await;
        assert_eq!(out[0], replies::prophecy(None));
    }

    #[tokio::test]
    async fn shrunk_category_restarts_selection() {
        let h = harness(two_question_catalog()).await;
        send(&h, "1").await;
        h.store.clear(SESSION).await;
        h.store.set_category(SESSION, CategoryIndex::new(0)).await;
        for _ in 0..5 {
            h.store.advance(SESSION).await;
        }

        let out = send(&h, "1").await;
        assert_eq!(out[0], replies::QUESTIONS_CHANGED);
        assert_eq!(out[1], "Categories:\n1. Travel\n");
        assert_eq!(h.store.get(SESSION).await, None);
    }

    #[tokio::test]
    async fn no_categories_is_explained() {
        let h = harness(MemoryDatabase::new()).await;
        assert_eq!(send(&h, "1").await, vec![replies::NO_CATEGORIES.to_string()]);
    }

    #[tokio::test]
    async fn offline_backend_degrades_gracefully() {
        let h = harness(love_and_career()).await;
        h.db.set_offline(true);
        assert_eq!(send(&h, "1").await, vec![replies::NO_CATEGORIES.to_string()]);
        assert_eq!(h.store.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn sessions_progress_independently() {
        let h = harness(two_question_catalog()).await;
        let other = SessionId::new(7);

        send(&h, "1").await;
        h.engine.handle(InboundMessage::new(other, "1", "Bo")).await;
        h.engine.handle(InboundMessage::new(other, "1", "Bo")).await;

        assert_eq!(h.store.get(SESSION).await.unwrap().question_index, Some(0));
        assert_eq!(h.store.get(other).await.unwrap().question_index, Some(1));
    }
}
