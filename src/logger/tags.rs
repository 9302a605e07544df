/// Subsystem tags attached to every log line
use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Api,
    Database,
    Telegram,
    Cli,
}

impl LogTag {
    pub const ALL: [LogTag; 6] = [
        LogTag::System,
        LogTag::Config,
        LogTag::Api,
        LogTag::Database,
        LogTag::Telegram,
        LogTag::Cli,
    ];

    /// Key used by `--debug-<key>` flags and the `logging.debug_tags` setting
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Api => "api",
            LogTag::Database => "database",
            LogTag::Telegram => "telegram",
            LogTag::Cli => "cli",
        }
    }

    pub fn from_debug_key(key: &str) -> Option<LogTag> {
        let key = key.trim().to_ascii_lowercase();
        LogTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.to_debug_key() == key)
    }

    /// Upper-case label without ANSI codes, used for file output
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Api => "API",
            LogTag::Database => "DATABASE",
            LogTag::Telegram => "TELEGRAM",
            LogTag::Cli => "CLI",
        }
    }

    pub fn colored(&self, width: usize) -> ColoredString {
        let label = format!("{:<width$}", self.to_plain_string(), width = width);
        match self {
            LogTag::System => label.bright_yellow().bold(),
            LogTag::Config => label.bright_white().bold(),
            LogTag::Api => label.bright_cyan().bold(),
            LogTag::Database => label.bright_magenta().bold(),
            LogTag::Telegram => label.bright_blue().bold(),
            LogTag::Cli => label.bright_green().bold(),
        }
    }
}
