//! Prophecy Bot - Telegram questionnaire bot.
//!
//! Startup order: configuration, logging, connection pool, migrations,
//! conversation engine, operational HTTP server, Telegram polling. Any
//! failure before polling starts aborts the process.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use prophecy_bot::adapters::http::{ops_router, OpsAppState};
use prophecy_bot::adapters::pool::{ConnectionPool, PoolError};
use prophecy_bot::adapters::postgres::{
    run_migrations, MigrationError, PgConnector, PostgresQuestionnaireGateway,
};
use prophecy_bot::adapters::storage::InMemorySessionStore;
use prophecy_bot::adapters::telegram::{TelegramClient, TelegramError, TelegramPoller};
use prophecy_bot::application::ConversationEngine;
use prophecy_bot::config::{AppConfig, ConfigError, ValidationError};

/// Fatal initialization failures.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database unavailable: {0}")]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("Telegram client: {0}")]
    Telegram(#[from] TelegramError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    if config.server.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!(
        bot = %config.telegram.bot_name,
        pool_size = config.database.pool_size,
        http_enabled = config.server.enabled,
        "Starting prophecy bot"
    );

    let pool = ConnectionPool::connect(
        PgConnector::new(config.database.url.clone()),
        config.pool_options(),
    )
    .await?;

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let sessions = Arc::new(InMemorySessionStore::new());
    let gateway = Arc::new(PostgresQuestionnaireGateway::new(pool.clone()));
    let engine = ConversationEngine::new(
        gateway,
        sessions.clone(),
        config.conversation.engine_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_handle = if config.server.enabled {
        let addr = config
            .server
            .socket_addr()
            .map_err(|e| ValidationError::InvalidServerAddress(e.to_string()))?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "Operational HTTP server listening");

        let router = ops_router(OpsAppState {
            pool: Arc::new(pool.clone()),
            sessions: sessions.clone(),
        });
        let mut http_shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = http_shutdown.changed().await;
                })
                .await;
            if let Err(e) = result {
                error!(error = %e, "Operational HTTP server failed");
            }
        }))
    } else {
        None
    };

    let client = TelegramClient::new(
        config.telegram.api_base_url.clone(),
        config.telegram.token.clone(),
        config.telegram.poll_timeout(),
    )?;
    let poller = TelegramPoller::new(Arc::new(client), engine);
    if config.telegram.register_commands {
        poller.register_commands().await;
    }
    let poller_handle = tokio::spawn(poller.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    let _ = shutdown_tx.send(true);

    if let Err(e) = poller_handle.await {
        error!(error = %e, "Polling task failed");
    }
    if let Some(handle) = http_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "HTTP server task failed");
        }
    }

    pool.close();
    info!("Shutdown complete");

    Ok(())
}
