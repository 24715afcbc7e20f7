//! Conversation domain module.
//!
//! Per-session progress through a questionnaire, the phases that progress
//! moves through, and the messages exchanged with the chat transport.

mod command;
mod message;
mod phase;
mod progress;
pub mod replies;

pub use command::BotCommand;
pub use message::{InboundMessage, OutboundMessage, ReplyMarkup};
pub use phase::ConversationPhase;
pub use progress::SessionProgress;
