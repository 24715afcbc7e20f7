//! Telegram transport adapter.
//!
//! Long-polls the Bot API, turns text updates into inbound messages for the
//! conversation engine, and sends the engine's replies back.

mod client;
mod error;
mod poller;
pub mod types;

pub use client::{BotApi, TelegramClient};
pub use error::TelegramError;
pub use poller::TelegramPoller;
