//! Telegram adapter errors.

use thiserror::Error;

/// Errors talking to the Bot API.
///
/// Messages never contain the request URL, which embeds the bot token.
#[derive(Debug, Clone, Error)]
pub enum TelegramError {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Malformed Bot API response: {0}")]
    Decode(String),
}

impl TelegramError {
    /// Converts a transport error, dropping the URL it carries.
    pub fn network(err: reqwest::Error) -> Self {
        TelegramError::Network(err.without_url().to_string())
    }

    pub fn decode(err: reqwest::Error) -> Self {
        TelegramError::Decode(err.without_url().to_string())
    }
}
