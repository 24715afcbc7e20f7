//! Bot API wire types.
//!
//! Only the fields the bot reads or writes are modelled; unknown fields are
//! ignored on input.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{BotCommand, InboundMessage, ReplyMarkup};
use crate::domain::foundation::SessionId;

/// Envelope every Bot API method answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub first_name: String,
}

impl Update {
    /// The text message this update carries, keyed by chat.
    ///
    /// Updates without text (stickers, edits, joins) yield `None`.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let text = message.text?;
        let display_name = message.from.map(|u| u.first_name).unwrap_or_default();
        Some(InboundMessage::new(
            SessionId::new(message.chat.id),
            text,
            display_name,
        ))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    /// One row with a button per bot command.
    pub fn commands() -> Self {
        Self {
            keyboard: vec![BotCommand::ALL
                .iter()
                .map(|c| KeyboardButton {
                    text: c.command().to_string(),
                })
                .collect()],
            resize_keyboard: true,
        }
    }

    pub fn for_markup(markup: ReplyMarkup) -> Option<Self> {
        match markup {
            ReplyMarkup::None => None,
            ReplyMarkup::CommandKeyboard => Some(Self::commands()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelegramBotCommand {
    /// Command name without the leading slash
    pub command: String,
    pub description: String,
}

impl From<BotCommand> for TelegramBotCommand {
    fn from(command: BotCommand) -> Self {
        Self {
            command: command.command().trim_start_matches('/').to_string(),
            description: command.description().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetMyCommandsRequest {
    pub commands: Vec<TelegramBotCommand>,
}
