//! Questionnaire domain module.
//!
//! The persisted facts of a questionnaire run (users and their answers)
//! and the numbered-menu conventions users reply with.

mod menu;
mod records;

pub use menu::{format_numbered, MenuSelection, SelectionError};
pub use records::{AnswerEvent, UserRecord};
