//! Conversation phase state machine.
//!
//! A session cycles through these phases once per questionnaire run:
//!
//! ```text
//! AwaitingCategory --[valid category]--> InQuestion(0)
//! InQuestion(i)    --[valid answer]----> InQuestion(i + 1)
//! InQuestion(i)    --[last answer]-----> Finalizing
//! Finalizing       --[outcome sent]----> AwaitingCategory
//! ```
//!
//! `AwaitingCategory` is implicit: it is what a session with no stored
//! progress is in.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// No category chosen; the next numeric reply picks one.
    #[default]
    AwaitingCategory,

    /// The question at this zero-based index has been presented.
    InQuestion(usize),

    /// All questions answered; the outcome is being delivered.
    Finalizing,
}

impl ConversationPhase {
    /// Index of the presented question, if any.
    pub fn question_index(&self) -> Option<usize> {
        match self {
            Self::InQuestion(i) => Some(*i),
            _ => None,
        }
    }
}

impl StateMachine for ConversationPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationPhase::*;
        match (self, target) {
            (AwaitingCategory, InQuestion(0)) => true,
            (InQuestion(i), InQuestion(j)) => *j == i + 1,
            (InQuestion(_), Finalizing) => true,
            (Finalizing, AwaitingCategory) => true,
            _ => false,
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationPhase::*;
        match self {
            AwaitingCategory => vec![InQuestion(0)],
            InQuestion(i) => vec![InQuestion(i + 1), Finalizing],
            Finalizing => vec![AwaitingCategory],
        }
    }
}
