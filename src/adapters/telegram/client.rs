//! Bot API client over reqwest.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::conversation::{BotCommand, OutboundMessage};

use super::types::{
    ApiResponse, GetUpdatesRequest, ReplyKeyboardMarkup, SendMessageRequest,
    SetMyCommandsRequest, TelegramBotCommand, Update,
};
use super::TelegramError;

/// Slack added on top of the long-poll timeout before the HTTP request gives up.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

/// The Bot API methods the poller needs.
#[async_trait]
pub trait BotApi: Send + Sync + 'static {
    /// Long-polls for updates with id `>= offset`.
    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError>;

    async fn send_message(&self, message: &OutboundMessage) -> Result<(), TelegramError>;

    async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError>;
}

/// HTTP client for one bot.
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: SecretString,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// Builds a client whose requests outlive one long poll.
    ///
    /// # Errors
    ///
    /// Returns `TelegramError::Client` if the TLS backend cannot be set up.
    pub fn new(
        base_url: impl Into<String>,
        token: SecretString,
        poll_timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .timeout(poll_timeout + REQUEST_SLACK)
            .connect_timeout(REQUEST_SLACK)
            .build()
            .map_err(|e| TelegramError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            poll_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token.expose_secret(), method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(TelegramError::network)?;

        let envelope: ApiResponse<T> = response.json().await.map_err(TelegramError::decode)?;
        into_result(envelope)
    }
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

/// Unwraps the Bot API envelope.
fn into_result<T>(envelope: ApiResponse<T>) -> Result<T, TelegramError> {
    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { ok: true, .. } => Err(TelegramError::Decode("missing result".to_string())),
        ApiResponse {
            error_code,
            description,
            ..
        } => Err(TelegramError::Api {
            code: error_code.unwrap_or_default(),
            description: description.unwrap_or_default(),
        }),
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: vec!["message".to_string()],
        };
        self.call("getUpdates", &request).await
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id: message.session_id.as_i64(),
            text: message.text.clone(),
            reply_markup: ReplyKeyboardMarkup::for_markup(message.markup),
        };
        let _sent: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError> {
        let request = SetMyCommandsRequest {
            commands: commands.iter().copied().map(TelegramBotCommand::from).collect(),
        };
        let _accepted: bool = self.call("setMyCommands", &request).await?;
        Ok(())
    }
}
