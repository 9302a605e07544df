/// Runtime logger configuration
///
/// Built once at startup from the `[logging]` config section and the
/// `--debug-<tag>` / `--verbose` command-line flags, then read on every log call.
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    /// Error, Warning and Info lines above this level are dropped; Debug is
    /// gated by tag and Verbose by this being `Verbose`
    pub min_level: LogLevel,
    /// Tags for which Debug lines are shown
    pub debug_tags: HashSet<LogTag>,
    /// Optional file that receives a plain-text copy of every line
    pub file_path: Option<PathBuf>,
    pub show_time: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            file_path: None,
            show_time: true,
        }
    }
}

impl LoggerConfig {
    /// Enable Debug output for a tag; other levels keep their threshold
    pub fn with_debug_tag(mut self, tag: LogTag) -> Self {
        self.debug_tags.insert(tag);
        self
    }

    pub fn with_verbose(mut self) -> Self {
        self.min_level = LogLevel::Verbose;
        self
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.min_level == LogLevel::Verbose || config.debug_tags.contains(tag)
}
