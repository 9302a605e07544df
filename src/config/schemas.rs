//! Configuration sections
//!
//! Every field has an embedded default, so an empty or partial
//! `config.toml` is valid.

use crate::config_struct;
use std::time::Duration;

// ============================================================================
// API
// ============================================================================

config_struct! {
    /// STON.fi REST API access
    pub struct ApiConfig {
        /// Base URL without a trailing path
        base_url: String = "https://api.ston.fi".to_string(),
        /// Per-request transport timeout; an elapsed timeout counts as a retryable failure
        timeout_secs: u64 = 10,
        /// Total attempts per call (first try included) on connection-level failures
        max_attempts: u32 = 5,
        /// First retry delay; doubled on each further retry
        retry_base_delay_ms: u64 = 100,
        /// Upper bound for a single retry delay
        retry_max_delay_ms: u64 = 2_000,
        user_agent: String = concat!("pools-alerter/", env!("CARGO_PKG_VERSION")).to_string(),
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }
}

// ============================================================================
// TELEGRAM
// ============================================================================

config_struct! {
    /// Telegram bot front-end
    pub struct TelegramConfig {
        enabled: bool = true,
        /// Token from @BotFather; `POOLS_ALERTER_BOT_TOKEN` overrides it
        bot_token: String = String::new(),
        /// Reply to /about
        about_text: String = "Pools Alerter - STON.fi pool tracker".to_string(),
        /// Rows shown by /top10_pools
        top_pools_limit: usize = 10,
    }
}

// ============================================================================
// DATABASE
// ============================================================================

config_struct! {
    /// SQLite file locations
    pub struct DatabaseConfig {
        /// `pools` and `watchlists` tables
        watchlist_path: String = "data/pools.db".to_string(),
        /// Archived wallet operations
        operations_path: String = "data/operations.db".to_string(),
    }
}

// ============================================================================
// LOGGING
// ============================================================================

config_struct! {
    pub struct LoggingConfig {
        /// error | warning | info | debug | verbose
        level: String = "info".to_string(),
        /// Tags with Debug output enabled, e.g. ["api", "telegram"]
        debug_tags: Vec<String> = Vec::new(),
        /// Empty string disables file logging
        file: String = String::new(),
        show_time: bool = true,
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root of `config.toml`
    pub struct Config {
        api: ApiConfig = ApiConfig::default(),
        telegram: TelegramConfig = TelegramConfig::default(),
        database: DatabaseConfig = DatabaseConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
    }
}
