//! Telegram Bot API configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Telegram configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot username, without the leading `@`
    pub bot_name: String,

    /// Bot token issued by BotFather
    pub token: SecretString,

    /// Long-poll timeout for getUpdates, in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Bot API endpoint
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Register the command list with setMyCommands on startup
    #[serde(default = "default_register_commands")]
    pub register_commands: bool,
}

impl TelegramConfig {
    /// Get poll timeout as Duration
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Validate Telegram configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM_BOT_NAME"));
        }
        if self.token.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM_TOKEN"));
        }
        if !(1..=50).contains(&self.poll_timeout_secs) {
            return Err(ValidationError::InvalidPollTimeout);
        }
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://") {
            return Err(ValidationError::InvalidApiBaseUrl);
        }
        Ok(())
    }
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_register_commands() -> bool {
    true
}
