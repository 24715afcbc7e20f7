//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, validation errors, and the state machine trait
//! that form the vocabulary of the questionnaire domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::ValidationError;
pub use ids::{AnswerOptionId, CategoryIndex, QuestionId, SessionId, UserId};
pub use state_machine::StateMachine;
