//! Conversation behaviour configuration

use serde::Deserialize;

use crate::application::EngineConfig;

/// Conversation configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationConfig {
    /// Clear in-flight progress when `/start` arrives mid-run
    #[serde(default)]
    pub reset_on_start: bool,
}

impl ConversationConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            reset_on_start: self.reset_on_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_progress_on_start() {
        assert!(!ConversationConfig::default().engine_config().reset_on_start);
    }
}
