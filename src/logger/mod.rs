//! Structured, tag-based logging for Pools Alerter
//!
//! ```rust,ignore
//! use pools_alerter::logger::{self, LogTag};
//!
//! logger::info(LogTag::Telegram, "Bot started");
//! logger::warning(LogTag::Api, "Pool lookup failed: HTTP 502");
//! logger::debug(LogTag::Database, "Watchlist has 3 entries"); // only with --debug-database
//! logger::verbose(LogTag::Api, "raw body ..."); // only with --verbose
//! ```
//!
//! Call [`init`] once at startup; until then the default configuration
//! (Info level, console only) applies.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Install the configuration and open the log file if one is configured
pub fn init(config: LoggerConfig) {
    if let Some(path) = config.file_path.as_deref() {
        if let Err(e) = file::init_file_logging(path) {
            eprintln!(
                "⚠️  Could not open log file '{}': {} - logging to console only",
                path.display(),
                e
            );
        }
    }
    config::set_logger_config(config);
}

pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Shown only when `--debug-<tag>` (or `--verbose`) is active
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

pub fn is_debug_enabled(tag: LogTag) -> bool {
    core::is_debug_enabled(tag)
}

/// Flush pending file writes; call during shutdown
pub fn flush() {
    file::flush_file_logging();
}
