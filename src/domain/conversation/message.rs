//! Messages crossing the transport boundary.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionId;

/// A text message received from a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub session_id: SessionId,
    pub text: String,
    pub display_name: String,
}

impl InboundMessage {
    pub fn new(
        session_id: SessionId,
        text: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            text: text.into(),
            display_name: display_name.into(),
        }
    }
}

/// Extra presentation the transport may attach to a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMarkup {
    #[default]
    None,
    /// Persistent keyboard with one button per bot command.
    CommandKeyboard,
}

/// A text message to deliver to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub session_id: SessionId,
    pub text: String,
    #[serde(default)]
    pub markup: ReplyMarkup,
}

impl OutboundMessage {
    pub fn text(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            text: text.into(),
            markup: ReplyMarkup::None,
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = markup;
        self
    }
}
