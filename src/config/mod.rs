/// Configuration system
///
/// `config.toml` sections map one-to-one onto the structs in [`schemas`];
/// every field carries its default through the `config_struct!` macro.
mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{ApiConfig, Config, DatabaseConfig, LoggingConfig, TelegramConfig};
pub use utils::{
    apply_token_override, load_config_from_path, logger_config_from, parse_config,
    validate_config, BOT_TOKEN_ENV, CONFIG_FILE_PATH,
};
