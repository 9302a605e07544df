/// Pool metrics computed from the decimal strings returned by the API
///
/// Only metrics with a clear definition live here: estimated price,
/// total collected protocol fees and TVL in USD.
use crate::apis::stonfi::{Asset, Pool};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("field '{field}' is not a decimal: '{value}'")]
    InvalidDecimal { field: String, value: String },

    /// A well-formed number beyond the 96-bit decimal range
    #[error("field '{field}' is out of decimal range: '{value}'")]
    OutOfRange { field: String, value: String },

    #[error("overflow while computing {0}")]
    Overflow(&'static str),
}

impl MetricsError {
    /// The input was valid but too large to compute with
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            MetricsError::OutOfRange { .. } | MetricsError::Overflow(_)
        )
    }
}

/// Parse a decimal-as-string field; scientific notation is accepted
pub fn parse_decimal(field: &str, value: &str) -> Result<Decimal, MetricsError> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            if is_numeric_literal(trimmed) {
                MetricsError::OutOfRange {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            } else {
                MetricsError::InvalidDecimal {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }
        })
}

/// `[+-]digits[.digits][e[+-]digits]`
fn is_numeric_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e.strip_prefix(['-', '+']).unwrap_or(e))),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    !(int_part.is_empty() && frac_part.is_empty())
        && digits(int_part)
        && digits(frac_part)
        && exponent.map_or(true, |e| !e.is_empty() && digits(e))
}

/// Range errors become `None`; malformed input still fails
fn within_range<T>(result: Result<Option<T>, MetricsError>) -> Result<Option<T>, MetricsError> {
    match result {
        Err(e) if e.is_range_error() => Ok(None),
        other => other,
    }
}

/// Raw on-chain units to whole tokens (`units / 10^decimals`)
pub fn scale_units(units: Decimal, decimals: u32) -> Result<Decimal, MetricsError> {
    if decimals > 28 {
        return Err(MetricsError::Overflow("token scale"));
    }
    units
        .checked_mul(Decimal::new(1, decimals))
        .ok_or(MetricsError::Overflow("token scale"))
}

/// reserve1 / reserve0 in raw units; `None` for an empty pool
pub fn estimated_price(pool: &Pool) -> Result<Option<Decimal>, MetricsError> {
    let reserve0 = parse_decimal("reserve0", &pool.reserve0)?;
    let reserve1 = parse_decimal("reserve1", &pool.reserve1)?;
    if reserve0.is_zero() {
        return Ok(None);
    }
    reserve1
        .checked_div(reserve0)
        .map(Some)
        .ok_or(MetricsError::Overflow("estimated price"))
}

/// Price of token0 in token1, adjusted for both tokens' decimals
pub fn adjusted_price(pool: &Pool, decimals0: u32, decimals1: u32) -> Result<Option<Decimal>, MetricsError> {
    let reserve0 = scale_units(parse_decimal("reserve0", &pool.reserve0)?, decimals0)?;
    let reserve1 = scale_units(parse_decimal("reserve1", &pool.reserve1)?, decimals1)?;
    if reserve0.is_zero() {
        return Ok(None);
    }
    reserve1
        .checked_div(reserve0)
        .map(Some)
        .ok_or(MetricsError::Overflow("adjusted price"))
}

/// Sum of both collected protocol fees, in raw units
pub fn total_collected_fees(pool: &Pool) -> Result<Decimal, MetricsError> {
    let fee0 = parse_decimal(
        "collected_token0_protocol_fee",
        &pool.collected_token0_protocol_fee,
    )?;
    let fee1 = parse_decimal(
        "collected_token1_protocol_fee",
        &pool.collected_token1_protocol_fee,
    )?;
    fee0.checked_add(fee1)
        .ok_or(MetricsError::Overflow("collected fees"))
}

/// Reserves valued at the assets' USD prices; `None` when either price is unknown
pub fn tvl_usd(pool: &Pool, asset0: &Asset, asset1: &Asset) -> Result<Option<Decimal>, MetricsError> {
    let (price0, price1) = match (asset0.usd_price(), asset1.usd_price()) {
        (Some(p0), Some(p1)) => (p0, p1),
        _ => return Ok(None),
    };
    let value0 = scale_units(parse_decimal("reserve0", &pool.reserve0)?, asset0.decimals)?
        .checked_mul(price0)
        .ok_or(MetricsError::Overflow("tvl"))?;
    let value1 = scale_units(parse_decimal("reserve1", &pool.reserve1)?, asset1.decimals)?
        .checked_mul(price1)
        .ok_or(MetricsError::Overflow("tvl"))?;
    value0
        .checked_add(value1)
        .map(Some)
        .ok_or(MetricsError::Overflow("tvl"))
}

/// `lp_total_supply_usd` as reported by the API
pub fn reported_tvl(pool: &Pool) -> Result<Option<Decimal>, MetricsError> {
    pool.lp_total_supply_usd
        .as_deref()
        .map(|raw| parse_decimal("lp_total_supply_usd", raw))
        .transpose()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvlSource {
    /// Computed from reserves and asset prices
    Reserves,
    /// Taken from `lp_total_supply_usd`
    Reported,
}

/// Metrics whose inputs exceed the decimal range are `None`
#[derive(Debug, Clone, PartialEq)]
pub struct PoolMetrics {
    pub estimated_price: Option<Decimal>,
    pub total_collected_fees: Option<Decimal>,
    pub tvl_usd: Option<(Decimal, TvlSource)>,
}

impl PoolMetrics {
    /// Asset snapshots are optional; without both of them TVL falls back to the reported value
    pub fn compute(
        pool: &Pool,
        asset0: Option<&Asset>,
        asset1: Option<&Asset>,
    ) -> Result<Self, MetricsError> {
        let computed = match (asset0, asset1) {
            (Some(a0), Some(a1)) => within_range(tvl_usd(pool, a0, a1))?,
            _ => None,
        };
        let tvl = match computed {
            Some(value) => Some((value, TvlSource::Reserves)),
            None => within_range(reported_tvl(pool))?.map(|value| (value, TvlSource::Reported)),
        };

        Ok(Self {
            estimated_price: within_range(estimated_price(pool))?,
            total_collected_fees: within_range(total_collected_fees(pool).map(Some))?,
            tvl_usd: tvl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::stonfi::AssetKind;

    fn pool(reserve0: &str, reserve1: &str) -> Pool {
        Pool {
            address: "EQpool".into(),
            apy_1d: None,
            apy_7d: None,
            apy_30d: None,
            collected_token0_protocol_fee: "150".into(),
            collected_token1_protocol_fee: "350".into(),
            deprecated: false,
            lp_account_address: None,
            lp_balance: None,
            lp_fee: "20".into(),
            lp_price_usd: None,
            lp_total_supply: "1000".into(),
            lp_total_supply_usd: Some("12345.67".into()),
            lp_wallet_address: None,
            protocol_fee: "10".into(),
            protocol_fee_address: "EQfee".into(),
            ref_fee: None,
            reserve0: reserve0.into(),
            reserve1: reserve1.into(),
            router_address: "EQrouter".into(),
            token0_address: "EQton".into(),
            token0_balance: None,
            token1_address: "EQusdt".into(),
            token1_balance: None,
        }
    }

    fn asset(symbol: &str, decimals: u32, price: Option<&str>) -> Asset {
        Asset {
            balance: None,
            blacklisted: false,
            community: false,
            contract_address: format!("EQ{}", symbol.to_lowercase()),
            default_symbol: true,
            deprecated: false,
            dex_price_usd: None,
            dex_usd_price: price.map(str::to_string),
            display_name: None,
            image_url: None,
            kind: AssetKind::Jetton,
            symbol: symbol.into(),
            tags: vec![],
            taxable: false,
            third_party_price_usd: None,
            third_party_usd_price: None,
            wallet_address: None,
            decimals,
            priority: 0,
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_estimated_price() {
        let p = pool("2000", "5000");
        assert_eq!(estimated_price(&p).unwrap(), Some(dec("2.5")));
        assert_eq!(estimated_price(&pool("0", "5000")).unwrap(), None);
    }

    #[test]
    fn test_adjusted_price_uses_decimals() {
        // 2 TON (9 decimals) against 10 USDT (6 decimals)
        let p = pool("2000000000", "10000000");
        assert_eq!(adjusted_price(&p, 9, 6).unwrap(), Some(dec("5")));
    }

    #[test]
    fn test_total_collected_fees() {
        assert_eq!(total_collected_fees(&pool("1", "1")).unwrap(), dec("500"));
    }

    #[test]
    fn test_tvl_from_prices_and_decimals() {
        let p = pool("2000000000", "10000000");
        let ton = asset("TON", 9, Some("5.0"));
        let usdt = asset("USDT", 6, Some("1"));
        assert_eq!(tvl_usd(&p, &ton, &usdt).unwrap(), Some(dec("20")));

        let unpriced = asset("XYZ", 9, None);
        assert_eq!(tvl_usd(&p, &unpriced, &usdt).unwrap(), None);
    }

    #[test]
    fn test_compute_falls_back_to_reported_tvl() {
        let p = pool("2000000000", "10000000");
        let metrics = PoolMetrics::compute(&p, None, None).unwrap();
        assert_eq!(metrics.tvl_usd, Some((dec("12345.67"), TvlSource::Reported)));

        let ton = asset("TON", 9, Some("5"));
        let usdt = asset("USDT", 6, Some("1"));
        let metrics = PoolMetrics::compute(&p, Some(&ton), Some(&usdt)).unwrap();
        assert_eq!(metrics.tvl_usd, Some((dec("20"), TvlSource::Reserves)));
        assert_eq!(metrics.total_collected_fees, Some(dec("500")));
    }

    #[test]
    fn test_huge_reserve_leaves_other_metrics_intact() {
        let p = pool("120000000000000000000000000000000", "10000000");
        assert!(matches!(
            estimated_price(&p),
            Err(MetricsError::OutOfRange { ref field, .. }) if field == "reserve0"
        ));

        let ton = asset("TON", 18, Some("5"));
        let usdt = asset("USDT", 6, Some("1"));
        let metrics = PoolMetrics::compute(&p, Some(&ton), Some(&usdt)).unwrap();
        assert_eq!(metrics.estimated_price, None);
        assert_eq!(metrics.total_collected_fees, Some(dec("500")));
        assert_eq!(metrics.tvl_usd, Some((dec("12345.67"), TvlSource::Reported)));
    }

    #[test]
    fn test_numeric_literal_detection() {
        assert!(is_numeric_literal("120000000000000000000000000000000"));
        assert!(is_numeric_literal("-1.5e40"));
        assert!(is_numeric_literal(".5"));
        assert!(!is_numeric_literal("12abc"));
        assert!(!is_numeric_literal("1e"));
        assert!(!is_numeric_literal("."));
        assert!(!is_numeric_literal(""));
    }

    #[test]
    fn test_malformed_reserve_is_reported() {
        let err = estimated_price(&pool("12abc", "1")).unwrap_err();
        assert_eq!(
            err,
            MetricsError::InvalidDecimal {
                field: "reserve0".into(),
                value: "12abc".into()
            }
        );
    }

    #[test]
    fn test_parse_decimal_accepts_scientific() {
        assert_eq!(parse_decimal("x", "1e3").unwrap(), dec("1000"));
        assert_eq!(parse_decimal("x", " 42 ").unwrap(), dec("42"));
    }
}
