//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PROPHECY_BOT` prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use prophecy_bot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Pool size: {}", config.database.pool_size);
//! ```

mod conversation;
mod database;
mod error;
mod server;
mod telegram;

pub use conversation::ConversationConfig;
pub use database::{DatabaseConfig, MAX_POOL_SIZE};
pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;
pub use telegram::TelegramConfig;

use serde::Deserialize;

use crate::adapters::pool::PoolOptions;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection pool)
    pub database: DatabaseConfig,

    /// Telegram Bot API configuration
    pub telegram: TelegramConfig,

    /// Conversation behaviour
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Operational HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PROPHECY_BOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PROPHECY_BOT__DATABASE__POOL_SIZE=5` -> `database.pool_size = 5`
    /// - `PROPHECY_BOT__TELEGRAM__TOKEN=...` -> `telegram.token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PROPHECY_BOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.telegram.validate()?;
        Ok(())
    }

    /// Pool options derived from the database section.
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions::default()
            .with_size(self.database.pool_size)
            .with_test_on_acquire(self.database.test_on_acquire)
    }
}
