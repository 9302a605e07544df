/// Command-line arguments
///
/// Global flags select the config file and turn on per-tag debug output;
/// the subcommand picks what to run.
use crate::config::CONFIG_FILE_PATH;
use crate::logger::{LogTag, LoggerConfig};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pools-alerter")]
#[command(version, about = "STON.fi pool tracker: Telegram bot and CLI")]
pub struct Arguments {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_PATH)]
    pub config: String,

    /// Debug output for STON.fi API calls
    #[arg(long, global = true)]
    pub debug_api: bool,

    #[arg(long, global = true)]
    pub debug_telegram: bool,

    #[arg(long, global = true)]
    pub debug_database: bool,

    #[arg(long, global = true)]
    pub debug_config: bool,

    /// Everything, including verbose lines
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Run the Telegram bot until Ctrl+C
    Bot,

    /// Show details and metrics of one pool
    Pool {
        address: String,
    },

    /// Largest non-deprecated pools by reported USD liquidity
    TopPools {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List assets known to the exchange
    Assets {
        /// Only show assets whose symbol contains this text
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },

    /// Exchange-wide statistics over a window (defaults to the last 24 hours)
    DexStats {
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },

    /// Fetch a wallet's operations and store them in the archive database
    ArchiveOperations {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        since: String,
        #[arg(long)]
        until: String,
        #[arg(long)]
        op_type: Option<String>,
        /// Overrides `database.operations_path`
        #[arg(long)]
        db: Option<String>,
    },

    /// Status of a submitted swap
    SwapStatus {
        #[arg(long)]
        router: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        query_id: u64,
    },

    /// Quote a swap without executing it
    Simulate {
        #[arg(long)]
        offer: String,
        #[arg(long)]
        ask: String,
        /// Amount in the smallest unit
        #[arg(long)]
        units: String,
        #[arg(long, default_value = "0.01")]
        slippage: String,
        /// Quote by the asked amount instead of the offered one
        #[arg(long)]
        reverse: bool,
    },
}

impl Arguments {
    /// Tags enabled by `--debug-*` flags
    pub fn debug_tags(&self) -> Vec<LogTag> {
        [
            (self.debug_api, LogTag::Api),
            (self.debug_telegram, LogTag::Telegram),
            (self.debug_database, LogTag::Database),
            (self.debug_config, LogTag::Config),
        ]
        .into_iter()
        .filter_map(|(enabled, tag)| enabled.then_some(tag))
        .collect()
    }

    /// Layer the command-line debug flags over the configured logger settings
    pub fn apply_to_logger(&self, mut config: LoggerConfig) -> LoggerConfig {
        for tag in self.debug_tags() {
            config = config.with_debug_tag(tag);
        }
        if self.verbose {
            config = config.with_verbose();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLevel;

    #[test]
    fn test_defaults_and_global_flags() {
        let args = Arguments::try_parse_from(["pools-alerter", "top-pools", "--debug-api"]).unwrap();
        assert_eq!(args.config, CONFIG_FILE_PATH);
        assert_eq!(args.command, CliCommand::TopPools { limit: 10 });
        assert_eq!(args.debug_tags(), vec![LogTag::Api]);
    }

    #[test]
    fn test_archive_operations_arguments() {
        let args = Arguments::try_parse_from([
            "pools-alerter",
            "--config",
            "custom.toml",
            "archive-operations",
            "--wallet",
            "EQwallet",
            "--since",
            "2024-01-01",
            "--until",
            "2024-01-31",
        ])
        .unwrap();
        assert_eq!(args.config, "custom.toml");
        match args.command {
            CliCommand::ArchiveOperations { wallet, op_type, db, .. } => {
                assert_eq!(wallet, "EQwallet");
                assert!(op_type.is_none());
                assert!(db.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_apply_to_logger() {
        let args =
            Arguments::try_parse_from(["pools-alerter", "bot", "--debug-database", "--verbose"])
                .unwrap();
        let logger = args.apply_to_logger(LoggerConfig::default());
        assert!(logger.debug_tags.contains(&LogTag::Database));
        assert_eq!(logger.min_level, LogLevel::Verbose);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Arguments::try_parse_from(["pools-alerter"]).is_err());
    }
}
