//! Pool report assembly shared by the bot and the CLI
use crate::apis::client::Transport;
use crate::apis::stonfi::{Asset, Pool, StonfiClient};
use crate::errors::{ApiError, BotError};
use crate::metrics::PoolMetrics;
use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A pool with its two asset snapshots and computed metrics
#[derive(Debug, Clone, PartialEq)]
pub struct PoolReport {
    pub pool: Pool,
    pub asset0: Option<Asset>,
    pub asset1: Option<Asset>,
    pub metrics: PoolMetrics,
}

impl PoolReport {
    pub fn from_parts(
        pool: Pool,
        asset0: Option<Asset>,
        asset1: Option<Asset>,
    ) -> Result<Self, BotError> {
        let metrics = PoolMetrics::compute(&pool, asset0.as_ref(), asset1.as_ref())?;
        Ok(Self {
            pool,
            asset0,
            asset1,
            metrics,
        })
    }

    /// Fetch the pool, then both assets concurrently; an unknown asset is not fatal
    pub async fn fetch<T: Transport>(
        client: &StonfiClient<T>,
        pool_address: &str,
    ) -> Result<Self, BotError> {
        let pool = client.get_pool(pool_address).await?;
        let (asset0, asset1) = futures::join!(
            client.get_asset(&pool.token0_address),
            client.get_asset(&pool.token1_address)
        );
        Self::from_parts(pool, optional_asset(asset0)?, optional_asset(asset1)?)
    }

    pub fn token0_name(&self) -> &str {
        self.asset0
            .as_ref()
            .map(Asset::name)
            .unwrap_or(&self.pool.token0_address)
    }

    pub fn token1_name(&self) -> &str {
        self.asset1
            .as_ref()
            .map(Asset::name)
            .unwrap_or(&self.pool.token1_address)
    }

    /// `TOKEN0/TOKEN1` using symbols when known
    pub fn pair_label(&self) -> String {
        let symbol = |asset: &Option<Asset>, fallback: &str| {
            asset
                .as_ref()
                .map(|a| a.symbol.clone())
                .unwrap_or_else(|| short_address(fallback))
        };
        format!(
            "{}/{}",
            symbol(&self.asset0, &self.pool.token0_address),
            symbol(&self.asset1, &self.pool.token1_address)
        )
    }
}

fn optional_asset(result: Result<Asset, ApiError>) -> Result<Option<Asset>, ApiError> {
    match result {
        Ok(asset) => Ok(Some(asset)),
        Err(ApiError::NotFound { .. }) => Ok(None),
        Err(ApiError::HttpStatus { status: 404, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// First and last characters of a long address, e.g. `EQCx…sDs`
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Round to `dp` places and drop trailing zeros
pub fn format_decimal(value: Decimal, dp: u32) -> String {
    value.round_dp(dp).normalize().to_string()
}

/// USD amount with thousands separators and two decimals, e.g. `-$1,000.50`
pub fn format_usd(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let magnitude = rounded.abs();
    let whole = magnitude.trunc();
    let cents = ((magnitude - whole) * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or(0);
    match whole.to_u128() {
        Some(units) => format!(
            "{}${}.{:02}",
            sign,
            units.to_formatted_string(&Locale::en),
            cents
        ),
        None => format!("{}${}", sign, magnitude),
    }
}

/// Non-deprecated pools ordered by reported USD liquidity, highest first.
/// Pools without a usable value are left out.
pub fn rank_pools(pools: Vec<Pool>, limit: usize) -> Vec<Pool> {
    let mut ranked: Vec<_> = pools
        .into_iter()
        .filter(|p| !p.deprecated)
        .filter_map(|p| p.reported_tvl_usd().map(|tvl| (tvl, p)))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().take(limit).map(|(_, p)| p).collect()
}

pub async fn top_pools<T: Transport>(
    client: &StonfiClient<T>,
    limit: usize,
) -> Result<Vec<Pool>, ApiError> {
    Ok(rank_pools(client.get_pools().await?, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn pool(address: &str, tvl: Option<&str>, deprecated: bool) -> Pool {
        serde_json::from_value(serde_json::json!({
            "address": address,
            "collected_token0_protocol_fee": "0",
            "collected_token1_protocol_fee": "0",
            "deprecated": deprecated,
            "lp_fee": "20",
            "lp_total_supply": "1",
            "lp_total_supply_usd": tvl,
            "protocol_fee": "10",
            "protocol_fee_address": "EQfee",
            "reserve0": "1",
            "reserve1": "1",
            "router_address": "EQrouter",
            "token0_address": "EQa",
            "token1_address": "EQb"
        }))
        .unwrap()
    }

    #[test]
    fn test_rank_pools_orders_and_filters() {
        let pools = vec![
            pool("small", Some("10"), false),
            pool("dead", Some("1000000"), true),
            pool("big", Some("5000.5"), false),
            pool("unknown", None, false),
            pool("mid", Some("700"), false),
        ];
        let ranked: Vec<_> = rank_pools(pools, 2)
            .into_iter()
            .map(|p| p.address)
            .collect();
        assert_eq!(ranked, vec!["big", "mid"]);
    }

    #[test]
    fn test_format_usd_groups_thousands() {
        assert_eq!(format_usd(Decimal::from_str("1234567.891").unwrap()), "$1,234,567.89");
        assert_eq!(format_usd(Decimal::from_str("12").unwrap()), "$12.00");
        assert_eq!(format_usd(Decimal::from_str("-1000.5").unwrap()), "-$1,000.50");
        assert_eq!(format_usd(Decimal::from_str("-0.001").unwrap()), "$0.00");
        assert_eq!(format_usd(Decimal::from_str("999.999").unwrap()), "$1,000.00");
    }

    #[test]
    fn test_format_decimal_trims() {
        assert_eq!(format_decimal(Decimal::from_str("0.250000").unwrap(), 9), "0.25");
        assert_eq!(format_decimal(Decimal::from_str("123").unwrap(), 0), "123");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address("EQabc"), "EQabc");
        assert_eq!(
            short_address("EQCxE6mUtQJKFnGfaROTKOt1lZbDiiX1kCixRv7Nw2Id_sDs"),
            "EQCxE6…_sDs"
        );
    }

    #[test]
    fn test_report_survives_out_of_range_reserve() {
        let mut p = pool("big", Some("42"), false);
        p.reserve0 = "120000000000000000000000000000000".to_string();
        let report = PoolReport::from_parts(p, None, None).unwrap();
        assert_eq!(report.metrics.estimated_price, None);
        assert_eq!(
            report.metrics.tvl_usd,
            Some((Decimal::from(42), crate::metrics::TvlSource::Reported))
        );
    }

    #[test]
    fn test_pair_label_falls_back_to_addresses() {
        let report = PoolReport::from_parts(pool("p", None, false), None, None).unwrap();
        assert_eq!(report.pair_label(), "EQa/EQb");
        assert_eq!(report.token0_name(), "EQa");
    }
}
