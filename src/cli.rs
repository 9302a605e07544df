//! Subcommand runners that print to the terminal
//!
//! Output goes to stdout as `comfy_table` tables; progress and failures go
//! through the logger.
use crate::apis::stonfi::{
    parse_timestamp, Asset, DexStats, Pool, SwapResponse, SwapSimulateData, SwapStatus, TimeWindow,
};
use crate::apis::{StonfiClient, Transport};
use crate::database::OperationsArchive;
use crate::errors::{ApiError, BotError};
use crate::logger::{self, LogTag};
use crate::metrics::TvlSource;
use crate::reports::{self, format_decimal, format_usd, short_address, PoolReport};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::sync::Arc;

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Close the client if this is the last handle; returns whether it was closed
pub fn release_client<T: Transport>(client: Arc<StonfiClient<T>>) -> bool {
    match Arc::try_unwrap(client) {
        Ok(client) => {
            client.close();
            true
        }
        Err(shared) => {
            logger::debug(
                LogTag::Api,
                &format!(
                    "Client still held by {} other owner(s), leaving it to drop",
                    Arc::strong_count(&shared) - 1
                ),
            );
            false
        }
    }
}

// =============================================================================
// POOLS
// =============================================================================

pub async fn show_pool(client: &StonfiClient, address: &str) -> Result<(), BotError> {
    let report = PoolReport::fetch(client, address).await?;
    println!("{}", pool_table(&report));
    Ok(())
}

pub fn pool_table(report: &PoolReport) -> Table {
    let pool = &report.pool;
    let mut table = new_table(&["Field", "Value"]);
    let price = report
        .metrics
        .estimated_price
        .map(|p| format_decimal(p, 9))
        .unwrap_or_else(|| "n/a".to_string());
    let tvl = match report.metrics.tvl_usd {
        Some((value, TvlSource::Reserves)) => format_usd(value),
        Some((value, TvlSource::Reported)) => format!("{} (reported)", format_usd(value)),
        None => "unknown".to_string(),
    };

    let rows: Vec<(&str, String)> = vec![
        ("Pair", report.pair_label()),
        ("Address", pool.address.clone()),
        ("Router", pool.router_address.clone()),
        (report.token0_name(), pool.reserve0.clone()),
        (report.token1_name(), pool.reserve1.clone()),
        ("LP fee", pool.lp_fee.clone()),
        ("Protocol fee", pool.protocol_fee.clone()),
        ("Referral fee", or_dash(pool.ref_fee.as_deref())),
        (
            "Collected fees",
            format!(
                "{} / {}",
                pool.collected_token0_protocol_fee, pool.collected_token1_protocol_fee
            ),
        ),
        (
            "Total fees",
            report
                .metrics
                .total_collected_fees
                .map(|fees| format_decimal(fees, 0))
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        ("Estimated price", price),
        ("TVL", tvl),
        ("APY 1d", or_dash(pool.apy_1d.as_deref())),
        ("APY 7d", or_dash(pool.apy_7d.as_deref())),
        ("APY 30d", or_dash(pool.apy_30d.as_deref())),
        ("Deprecated", pool.deprecated.to_string()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

pub async fn show_top_pools(client: &StonfiClient, limit: usize) -> Result<(), BotError> {
    let pools = reports::top_pools(client, limit).await?;
    println!("{}", top_pools_table(&pools));
    Ok(())
}

pub fn top_pools_table(pools: &[Pool]) -> Table {
    let mut table = new_table(&["#", "Pool", "Token 0", "Token 1", "TVL (USD)", "APY 7d"]);
    for (i, pool) in pools.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&pool.address),
            Cell::new(short_address(&pool.token0_address)),
            Cell::new(short_address(&pool.token1_address)),
            Cell::new(
                pool.reported_tvl_usd()
                    .map(format_usd)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(or_dash(pool.apy_7d.as_deref())),
        ]);
    }
    table
}

// =============================================================================
// ASSETS & STATS
// =============================================================================

pub async fn show_assets(
    client: &StonfiClient,
    search: Option<&str>,
    limit: usize,
) -> Result<(), BotError> {
    let assets = client.get_assets().await?;
    let selected = filter_assets(assets, search, limit);
    println!("{}", assets_table(&selected));
    Ok(())
}

/// Case-insensitive symbol match, highest priority first
pub fn filter_assets(assets: Vec<Asset>, search: Option<&str>, limit: usize) -> Vec<Asset> {
    let needle = search.map(|s| s.trim().to_lowercase());
    let mut selected: Vec<Asset> = assets
        .into_iter()
        .filter(|a| !a.blacklisted)
        .filter(|a| match &needle {
            Some(n) => a.symbol.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .collect();
    selected.sort_by(|a, b| b.priority.cmp(&a.priority));
    selected.truncate(limit);
    selected
}

pub fn assets_table(assets: &[Asset]) -> Table {
    let mut table = new_table(&["Symbol", "Name", "Kind", "Decimals", "USD price", "Address"]);
    for asset in assets {
        table.add_row(vec![
            Cell::new(&asset.symbol),
            Cell::new(asset.name()),
            Cell::new(format!("{:?}", asset.kind)),
            Cell::new(asset.decimals),
            Cell::new(
                asset
                    .usd_price()
                    .map(|p| format_decimal(p, 6))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(&asset.contract_address),
        ]);
    }
    table
}

pub async fn show_dex_stats(
    client: &StonfiClient,
    since: Option<&str>,
    until: Option<&str>,
) -> Result<(), BotError> {
    let window = match (since, until) {
        (Some(since), Some(until)) => TimeWindow::parse(since, until)?,
        (None, None) => TimeWindow::last_days(1)?,
        (Some(since), None) => {
            let now = chrono::Utc::now().naive_utc();
            TimeWindow::new(parse_timestamp("since", since)?, now)?
        }
        (None, Some(_)) => {
            return Err(BotError::from(ApiError::Validation(
                "--until requires --since".to_string(),
            )))
        }
    };
    let stats = client
        .get_dex_stats(&window.since_param(), &window.until_param())
        .await?;
    println!("{}", dex_stats_table(&window, &stats));
    Ok(())
}

pub fn dex_stats_table(window: &TimeWindow, stats: &DexStats) -> Table {
    let mut table = new_table(&["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Window"),
        Cell::new(format!("{} .. {}", window.since_param(), window.until_param())),
    ]);
    table.add_row(vec![Cell::new("Trades"), Cell::new(stats.trades)]);
    table.add_row(vec![Cell::new("Unique wallets"), Cell::new(stats.unique_wallets)]);
    table.add_row(vec![Cell::new("TVL (USD)"), Cell::new(&stats.tvl)]);
    table.add_row(vec![Cell::new("Volume (USD)"), Cell::new(&stats.volume_usd)]);
    table
}

// =============================================================================
// OPERATIONS ARCHIVE
// =============================================================================

pub async fn archive_operations(
    client: &StonfiClient,
    archive: &OperationsArchive,
    wallet: &str,
    since: &str,
    until: &str,
    op_type: Option<&str>,
) -> Result<usize, BotError> {
    let operations = client
        .get_wallet_operations(wallet, since, until, op_type)
        .await?;
    logger::info(
        LogTag::Cli,
        &format!("Fetched {} operation(s) for {}", operations.len(), wallet),
    );
    let inserted = archive.save_operations(&operations)?;
    logger::info(
        LogTag::Cli,
        &format!(
            "Archived {} new operation(s), {} total in archive",
            inserted,
            archive.count()?
        ),
    );
    Ok(inserted)
}

// =============================================================================
// SWAPS
// =============================================================================

pub async fn show_swap_status(
    client: &StonfiClient,
    router: &str,
    owner: &str,
    query_id: u64,
) -> Result<(), BotError> {
    let status = client.get_swap_status(router, owner, query_id).await?;
    println!("{}", swap_status_table(&status));
    Ok(())
}

pub fn swap_status_table(status: &SwapStatus) -> Table {
    let mut table = new_table(&["Field", "Value"]);
    let rows = [
        ("Status", Some(status.status_type.as_str())),
        ("Exit code", status.exit_code.as_deref()),
        ("Tx hash", status.tx_hash.as_deref()),
        ("Logical time", status.logical_time.as_deref()),
        ("Query id", status.query_id.as_deref()),
        ("Address", status.address.as_deref()),
        ("Coins", status.coins.as_deref()),
        ("Balance deltas", status.balance_deltas.as_deref()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(or_dash(value))]);
    }
    table
}

pub async fn simulate_swap(
    client: &StonfiClient,
    data: &SwapSimulateData,
    reverse: bool,
) -> Result<(), BotError> {
    let response = if reverse {
        client.reverse_swap_simulate(data).await?
    } else {
        client.swap_simulate(data).await?
    };
    println!("{}", swap_quote_table(&response));
    Ok(())
}

pub fn swap_quote_table(quote: &SwapResponse) -> Table {
    let mut table = new_table(&["Field", "Value"]);
    let rows = [
        ("Pool", &quote.pool_address),
        ("Offer units", &quote.offer_units),
        ("Ask units", &quote.ask_units),
        ("Min ask units", &quote.min_ask_units),
        ("Swap rate", &quote.swap_rate),
        ("Price impact", &quote.price_impact),
        ("Fee units", &quote.fee_units),
        ("Fee percent", &quote.fee_percent),
        ("Slippage tolerance", &quote.slippage_tolerance),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}
