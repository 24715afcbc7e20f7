//! Per-session questionnaire progress.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CategoryIndex;

use super::ConversationPhase;

/// Where one session is in its current run.
///
/// Lives only in process memory; a restart drops every in-flight run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub category: CategoryIndex,
    pub question_index: Option<usize>,
}

impl SessionProgress {
    /// Progress right after a category was chosen, before any question is shown.
    pub fn started(category: CategoryIndex) -> Self {
        Self {
            category,
            question_index: None,
        }
    }

    /// Moves to the next question and returns its index.
    ///
    /// The first advance after `started` lands on question 0.
    pub fn advance(&mut self) -> usize {
        let next = self.question_index.map_or(0, |i| i + 1);
        self.question_index = Some(next);
        next
    }

    /// The phase this progress represents.
    pub fn phase(&self) -> ConversationPhase {
        match self.question_index {
            Some(i) => ConversationPhase::InQuestion(i),
            None => ConversationPhase::AwaitingCategory,
        }
    }
}
