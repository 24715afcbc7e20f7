//! Conversation handlers.
//!
//! Turns inbound chat messages into questionnaire progress and replies.

mod engine;

pub use engine::{ConversationEngine, EngineConfig};
