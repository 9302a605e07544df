/// Configuration loading and validation
///
/// A missing file is not an error: the embedded defaults apply. The bot
/// token may come from the environment so it never has to live on disk.
use super::schemas::{Config, LoggingConfig};
use crate::errors::ConfigError;
use crate::logger::{LogLevel, LogTag, LoggerConfig};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Environment variable that overrides `telegram.bot_token`
pub const BOT_TOKEN_ENV: &str = "POOLS_ALERTER_BOT_TOKEN";

/// Load, apply environment overrides, validate
pub fn load_config_from_path(path: &str) -> Result<Config, ConfigError> {
    let mut config = if Path::new(path).exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            source: e,
        })?;
        parse_config(path, &contents)?
    } else {
        eprintln!("⚠️  Config file '{}' not found, using default values", path);
        Config::default()
    };

    if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
        apply_token_override(&mut config, &token);
    }

    validate_config(&config)?;
    Ok(config)
}

pub fn parse_config(path: &str, contents: &str) -> Result<Config, ConfigError> {
    toml::from_str::<Config>(contents).map_err(|e| ConfigError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Blank values leave the configured token untouched
pub fn apply_token_override(config: &mut Config, token: &str) {
    let token = token.trim();
    if !token.is_empty() {
        config.telegram.bot_token = token.to_string();
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let api = &config.api;
    url::Url::parse(&api.base_url).map_err(|e| ConfigError::Invalid {
        field: "api.base_url".to_string(),
        message: e.to_string(),
    })?;
    if api.max_attempts == 0 {
        return Err(invalid("api.max_attempts", "must be at least 1"));
    }
    if api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be at least 1"));
    }
    if api.retry_max_delay_ms < api.retry_base_delay_ms {
        return Err(invalid(
            "api.retry_max_delay_ms",
            "must not be below api.retry_base_delay_ms",
        ));
    }

    LogLevel::from_str(&config.logging.level)
        .map_err(|message| ConfigError::Invalid {
            field: "logging.level".to_string(),
            message,
        })?;
    for key in &config.logging.debug_tags {
        if LogTag::from_debug_key(key).is_none() {
            return Err(invalid(
                "logging.debug_tags",
                &format!("unknown tag '{}'", key),
            ));
        }
    }

    if config.telegram.top_pools_limit == 0 {
        return Err(invalid("telegram.top_pools_limit", "must be at least 1"));
    }
    Ok(())
}

/// Build the runtime logger configuration from the `[logging]` section.
/// Command-line debug flags are layered on top by the caller.
pub fn logger_config_from(logging: &LoggingConfig) -> LoggerConfig {
    let mut config = LoggerConfig {
        min_level: LogLevel::from_str(&logging.level).unwrap_or(LogLevel::Info),
        show_time: logging.show_time,
        file_path: if logging.file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(logging.file.trim()))
        },
        ..LoggerConfig::default()
    };
    for tag in logging
        .debug_tags
        .iter()
        .filter_map(|key| LogTag::from_debug_key(key))
    {
        config = config.with_debug_tag(tag);
    }
    config
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config_from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(config.api.base_url, "https://api.ston.fi");
        assert_eq!(config.api.max_attempts, 5);
        assert_eq!(config.database.watchlist_path, "data/pools.db");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\ntimeout_secs = 3\n\n[logging]\nlevel = \"debug\"").unwrap();
        let config = load_config_from_path(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.api.max_attempts, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.telegram.enabled);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = ").unwrap();
        let err = load_config_from_path(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let mut config = Config::default();
        config.api.max_attempts = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "api.max_attempts"));
    }

    #[test]
    fn test_validation_rejects_unknown_debug_tag() {
        let mut config = Config::default();
        config.logging.debug_tags = vec!["api".into(), "gui".into()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_token_override_ignores_blank() {
        let mut config = Config::default();
        config.telegram.bot_token = "from-file".into();
        apply_token_override(&mut config, "   ");
        assert_eq!(config.telegram.bot_token, "from-file");
        apply_token_override(&mut config, "123:abc");
        assert_eq!(config.telegram.bot_token, "123:abc");
    }

    #[test]
    fn test_logger_config_from_section() {
        let logging = LoggingConfig {
            level: "warning".into(),
            debug_tags: vec!["database".into()],
            file: String::new(),
            show_time: false,
        };
        let logger = logger_config_from(&logging);
        assert_eq!(logger.min_level, LogLevel::Warning);
        assert!(logger.debug_tags.contains(&LogTag::Database));
        assert!(logger.file_path.is_none());
        assert!(!logger.show_time);
    }
}
