/// Filtering rules applied before a line is formatted
///
/// 1. Errors always pass
/// 2. Debug passes when its tag is debug-enabled, whatever the minimum level
/// 3. Verbose requires the minimum level to be Verbose
/// 4. Warning and Info pass when they are within the minimum level
use super::config::{is_debug_enabled_for_tag, LoggerConfig};
use super::levels::LogLevel;
use super::tags::LogTag;

pub fn should_log_with(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    match level {
        LogLevel::Error => true,
        LogLevel::Debug => {
            config.min_level == LogLevel::Verbose || config.debug_tags.contains(tag)
        }
        LogLevel::Verbose => config.min_level == LogLevel::Verbose,
        LogLevel::Warning | LogLevel::Info => level <= config.min_level,
    }
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    let config = super::config::get_logger_config();
    if !should_log_with(&config, &tag, level) {
        return;
    }

    super::format::format_and_log(&config, tag, level, message);
}

/// Cheap pre-check so callers can skip building expensive debug strings
pub fn is_debug_enabled(tag: LogTag) -> bool {
    is_debug_enabled_for_tag(&tag)
}
