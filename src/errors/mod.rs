/// Error types shared across the crate
///
/// `ApiError` is the single failure type of every STON.fi client call.
/// `ConfigError` covers loading `config.toml`. `BotError` is what the
/// Telegram handlers and CLI runners deal with; it wraps the others and
/// knows how to phrase itself for an end user.
use thiserror::Error;

use crate::database::DatabaseError;
use crate::metrics::MetricsError;

// =============================================================================
// API
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No HTTP response was obtained after exhausting every attempt
    #[error("{endpoint}: transport failure after {attempts} attempt(s): {message}")]
    Transport {
        endpoint: String,
        attempts: u32,
        message: String,
    },

    /// The server answered with a non-2xx status
    #[error("{endpoint}: HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("{endpoint}: failed to decode response: {message}")]
    Decode { endpoint: String, message: String },

    /// The envelope was well-formed but the requested record was absent
    #[error("{endpoint}: requested record not found")]
    NotFound { endpoint: String },

    /// Rejected locally before any request was sent
    #[error("invalid request: {0}")]
    Validation(String),
}

impl ApiError {
    /// Only connection-level failures are worth repeating
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ApiError::Transport { endpoint, .. }
            | ApiError::HttpStatus { endpoint, .. }
            | ApiError::Decode { endpoint, .. }
            | ApiError::NotFound { endpoint } => Some(endpoint.as_str()),
            ApiError::Validation(_) => None,
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

// =============================================================================
// FRONT-END
// =============================================================================

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("bot token is not configured")]
    MissingToken,

    #[error("Telegram request failed: {0}")]
    Telegram(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Short text suitable for a chat reply; details go to the log
    pub fn user_message(&self) -> String {
        match self {
            BotError::Api(ApiError::NotFound { .. }) => "Pool not found.".to_string(),
            BotError::Api(ApiError::Validation(msg)) => format!("Invalid input: {}", msg),
            BotError::Api(ApiError::HttpStatus { status, .. }) if *status == 404 => {
                "Pool not found.".to_string()
            }
            BotError::Api(ApiError::HttpStatus { status, .. }) if *status == 400 => {
                "Invalid pool address.".to_string()
            }
            BotError::Api(_) => "STON.fi API is unavailable, try again later.".to_string(),
            BotError::Database(DatabaseError::UnknownPool(_)) => {
                "This pool is not known yet, look it up first.".to_string()
            }
            BotError::Database(_) => "Storage error, try again later.".to_string(),
            BotError::Metrics(_) => "Pool data is malformed.".to_string(),
            BotError::Config(_)
            | BotError::MissingToken
            | BotError::Telegram(_)
            | BotError::Io(_) => "Internal error.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_retryable() {
        let transport = ApiError::Transport {
            endpoint: "get_pools".into(),
            attempts: 1,
            message: "connection reset".into(),
        };
        let status = ApiError::HttpStatus {
            endpoint: "get_pools".into(),
            status: 503,
            body: String::new(),
        };
        assert!(transport.is_retryable());
        assert!(!status.is_retryable());
        assert!(!ApiError::Validation("x".into()).is_retryable());
        assert!(!ApiError::NotFound {
            endpoint: "get_pool".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_user_message_for_not_found() {
        let err = BotError::from(ApiError::NotFound {
            endpoint: "get_pool".into(),
        });
        assert_eq!(err.user_message(), "Pool not found.");
        let err = BotError::from(ApiError::HttpStatus {
            endpoint: "get_pool".into(),
            status: 404,
            body: "{}".into(),
        });
        assert_eq!(err.user_message(), "Pool not found.");
    }

    #[test]
    fn test_display_carries_endpoint() {
        let err = ApiError::Decode {
            endpoint: "get_assets".into(),
            message: "missing field `kind`".into(),
        };
        assert!(err.to_string().starts_with("get_assets:"));
        assert_eq!(err.endpoint(), Some("get_assets"));
    }
}
