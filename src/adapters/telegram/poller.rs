//! Long-polling loop that feeds updates into the conversation engine.
//!
//! Each text update is handled on its own task, so a slow database call for
//! one chat never delays another. Updates from the same chat are chained:
//! a handler starts only after the previous handler for that chat finished,
//! and replies for one update are sent in order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::application::ConversationEngine;
use crate::domain::conversation::BotCommand;
use crate::domain::foundation::SessionId;

use super::BotApi;

/// Pause after a failed poll before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Drives one bot: polls, dispatches, replies.
pub struct TelegramPoller<A: BotApi> {
    api: Arc<A>,
    engine: ConversationEngine,
    retry_delay: Duration,
}

impl<A: BotApi> TelegramPoller<A> {
    pub fn new(api: Arc<A>, engine: ConversationEngine) -> Self {
        Self {
            api,
            engine,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Advertises the command list to clients. Failure is logged only.
    pub async fn register_commands(&self) {
        match self.api.set_my_commands(&BotCommand::ALL).await {
            Ok(()) => tracing::info!(count = BotCommand::ALL.len(), "Bot commands registered"),
            Err(e) => tracing::warn!(error = %e, "Failed to register bot commands"),
        }
    }

    /// Polls until `shutdown` flips to true, then waits for in-flight
    /// handlers to finish.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut offset = 0_i64;
        let mut tasks = JoinSet::new();
        // Completion signal of the newest handler queued per chat.
        let mut tails: HashMap<SessionId, oneshot::Receiver<()>> = HashMap::new();

        tracing::info!("Telegram polling started");

        while !*shutdown.borrow() {
            let updates = tokio::select! {
                _ = shutdown.changed() => break,
                result = self.api.get_updates(offset) => result,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(self.retry_delay) => continue,
                    }
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(message) = update.into_inbound() else {
                    continue;
                };

                let session = message.session_id;
                let (done_tx, done_rx) = oneshot::channel();
                let previous = tails.insert(session, done_rx);

                let api = Arc::clone(&self.api);
                let engine = self.engine.clone();
                tasks.spawn(async move {
                    if let Some(previous) = previous {
                        // An error here means the earlier handler panicked.
                        let _ = previous.await;
                    }
                    for reply in engine.handle(message).await {
                        if let Err(e) = api.send_message(&reply).await {
                            tracing::warn!(session_id = %session, error = %e, "Failed to send reply");
                        }
                    }
                    let _ = done_tx.send(());
                });
            }

            while let Some(finished) = tasks.try_join_next() {
                log_join(finished);
            }
            tails.retain(|_, done| matches!(done.try_recv(), Err(TryRecvError::Empty)));
        }

        tracing::info!(in_flight = tasks.len(), "Telegram polling stopped");
        while let Some(finished) = tasks.join_next().await {
            log_join(finished);
        }
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Message handler task failed");
    }
}
