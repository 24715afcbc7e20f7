//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine trait)
//! - `questionnaire` - Persisted records and numbered-menu conventions
//! - `conversation` - Session progress, phases, commands, and transport messages

pub mod conversation;
pub mod foundation;
pub mod questionnaire;
