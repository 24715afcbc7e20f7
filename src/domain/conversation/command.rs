//! Slash commands recognised in any phase.

/// Commands that short-circuit the questionnaire flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Greet, register the user, list categories.
    Start,
    /// Explain how the bot is used.
    Info,
}

impl BotCommand {
    /// Every command with the description advertised to the transport.
    pub const ALL: [BotCommand; 2] = [BotCommand::Start, BotCommand::Info];

    /// Recognises `/start` and `/info`, also in the `/start@my_bot` form
    /// group chats produce.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim();
        let name = word.split_once('@').map_or(word, |(name, _)| name);
        match name {
            "/start" => Some(Self::Start),
            "/info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            Self::Start => "/start",
            Self::Info => "/info",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Start => "get a welcome message",
            Self::Info => "how to use the bot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/info"), Some(BotCommand::Info));
    }

    #[test]
    fn parses_addressed_commands() {
        assert_eq!(BotCommand::parse("/start@prophecy_bot"), Some(BotCommand::Start));
    }

    #[test]
    fn ignores_other_text() {
        assert_eq!(BotCommand::parse("1"), None);
        assert_eq!(BotCommand::parse("/stop"), None);
        assert_eq!(BotCommand::parse("start"), None);
    }

    #[test]
    fn every_command_has_a_slash_name() {
        for command in BotCommand::ALL {
            assert!(command.command().starts_with('/'));
            assert_eq!(BotCommand::parse(command.command()), Some(command));
        }
    }
}
