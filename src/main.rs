use anyhow::{Context, Result};
use clap::Parser;
use pools_alerter::apis::stonfi::SwapSimulateData;
use pools_alerter::apis::StonfiClient;
use pools_alerter::arguments::{Arguments, CliCommand};
use pools_alerter::cli;
use pools_alerter::config::{self, Config};
use pools_alerter::database::OperationsArchive;
use pools_alerter::logger::{self, LogTag};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();

    let config = config::load_config_from_path(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;
    logger::init(args.apply_to_logger(config::logger_config_from(&config.logging)));
    logger::debug(
        LogTag::Config,
        &format!("Configuration loaded from {}", args.config),
    );

    let client = Arc::new(StonfiClient::from_config(&config.api)?);
    let outcome = run(&args.command, &config, Arc::clone(&client)).await;

    cli::release_client(client);
    if let Err(e) = &outcome {
        logger::error(LogTag::System, &format!("{:#}", e));
    }
    logger::flush();
    outcome
}

async fn run(command: &CliCommand, config: &Config, client: Arc<StonfiClient>) -> Result<()> {
    match command {
        CliCommand::Bot => run_bot(config, client).await?,
        CliCommand::Pool { address } => cli::show_pool(&client, address).await?,
        CliCommand::TopPools { limit } => cli::show_top_pools(&client, *limit).await?,
        CliCommand::Assets { search, limit } => {
            cli::show_assets(&client, search.as_deref(), *limit).await?
        }
        CliCommand::DexStats { since, until } => {
            cli::show_dex_stats(&client, since.as_deref(), until.as_deref()).await?
        }
        CliCommand::ArchiveOperations {
            wallet,
            since,
            until,
            op_type,
            db,
        } => {
            let path = db.as_deref().unwrap_or(&config.database.operations_path);
            let archive = OperationsArchive::open(path)
                .with_context(|| format!("opening operations archive {}", path))?;
            cli::archive_operations(&client, &archive, wallet, since, until, op_type.as_deref())
                .await?;
        }
        CliCommand::SwapStatus {
            router,
            owner,
            query_id,
        } => cli::show_swap_status(&client, router, owner, *query_id).await?,
        CliCommand::Simulate {
            offer,
            ask,
            units,
            slippage,
            reverse,
        } => {
            let data = SwapSimulateData::new(offer, ask, units, slippage);
            cli::simulate_swap(&client, &data, *reverse).await?
        }
    }
    Ok(())
}

#[cfg(feature = "telegram")]
async fn run_bot(config: &Config, client: Arc<StonfiClient>) -> Result<()> {
    use pools_alerter::database::WatchlistStore;
    use pools_alerter::telegram::{self, BotContext};

    if !config.telegram.enabled {
        anyhow::bail!("Telegram bot is disabled (telegram.enabled = false)");
    }
    let path = &config.database.watchlist_path;
    let watchlist = WatchlistStore::open(path)
        .with_context(|| format!("opening watchlist database {}", path))?;
    logger::info(LogTag::Database, &format!("Watchlist database: {}", path));

    let ctx = Arc::new(BotContext::new(
        client,
        Arc::new(watchlist),
        config.telegram.about_text.clone(),
        config.telegram.top_pools_limit,
    ));
    telegram::run(&config.telegram.bot_token, ctx).await?;
    Ok(())
}

#[cfg(not(feature = "telegram"))]
async fn run_bot(_config: &Config, _client: Arc<StonfiClient>) -> Result<()> {
    anyhow::bail!("built without the `telegram` feature")
}
