/// STON.fi API response types
///
/// Monetary amounts, reserves and fee rates stay as the decimal strings the
/// API sends. Use [`crate::metrics`] to do arithmetic on them.
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

// ============================================================================
// CUSTOM DESERIALIZERS - Handle API inconsistencies
// ============================================================================

/// Logical time counters come as JSON numbers on most endpoints and as
/// numeric strings on some; accept both.
fn deserialize_lt<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::custom(format!("logical time out of range: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| Error::custom(format!("invalid logical time '{}': {}", s, e))),
        other => Err(Error::custom(format!(
            "expected number or numeric string for logical time, got: {}",
            other
        ))),
    }
}

// ============================================================================
// ASSETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Jetton,
    Wton,
    Ton,
    NotAnAsset,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub balance: Option<String>,
    pub blacklisted: bool,
    pub community: bool,
    pub contract_address: String,
    pub default_symbol: bool,
    pub deprecated: bool,
    #[serde(default)]
    pub dex_price_usd: Option<String>,
    #[serde(default)]
    pub dex_usd_price: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub kind: AssetKind,
    pub symbol: String,
    pub tags: Vec<String>,
    pub taxable: bool,
    #[serde(default)]
    pub third_party_price_usd: Option<String>,
    #[serde(default)]
    pub third_party_usd_price: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    pub decimals: u32,
    pub priority: i64,
}

impl Asset {
    /// Display name when the API has one, symbol otherwise
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.symbol)
    }

    /// DEX price first, third-party price as fallback; unparsable values are skipped
    pub fn usd_price(&self) -> Option<Decimal> {
        [
            self.dex_usd_price.as_deref(),
            self.dex_price_usd.as_deref(),
            self.third_party_usd_price.as_deref(),
            self.third_party_price_usd.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find_map(|raw| Decimal::from_str(raw.trim()).ok())
    }
}

// ============================================================================
// POOLS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub address: String,
    #[serde(default)]
    pub apy_1d: Option<String>,
    #[serde(default)]
    pub apy_7d: Option<String>,
    #[serde(default)]
    pub apy_30d: Option<String>,
    pub collected_token0_protocol_fee: String,
    pub collected_token1_protocol_fee: String,
    pub deprecated: bool,
    #[serde(default)]
    pub lp_account_address: Option<String>,
    #[serde(default)]
    pub lp_balance: Option<String>,
    pub lp_fee: String,
    #[serde(default)]
    pub lp_price_usd: Option<String>,
    pub lp_total_supply: String,
    #[serde(default)]
    pub lp_total_supply_usd: Option<String>,
    #[serde(default)]
    pub lp_wallet_address: Option<String>,
    pub protocol_fee: String,
    pub protocol_fee_address: String,
    #[serde(default)]
    pub ref_fee: Option<String>,
    pub reserve0: String,
    pub reserve1: String,
    pub router_address: String,
    pub token0_address: String,
    #[serde(default)]
    pub token0_balance: Option<String>,
    pub token1_address: String,
    #[serde(default)]
    pub token1_balance: Option<String>,
}

impl Pool {
    /// Reported LP supply value in USD, used for ranking
    pub fn reported_tvl_usd(&self) -> Option<Decimal> {
        self.lp_total_supply_usd
            .as_deref()
            .and_then(|raw| Decimal::from_str(raw.trim()).ok())
    }
}

// ============================================================================
// FARMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmNftReward {
    pub address: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmNft {
    pub address: String,
    pub create_timestamp: String,
    pub min_unstake_timestamp: String,
    pub nonclaimed_rewards: String,
    pub rewards: Vec<FarmNftReward>,
    pub staked_tokens: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmMinterReward {
    pub address: String,
    pub remaining_rewards: String,
    pub reward_rate_24h: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub locked_total_lp: String,
    pub min_stake_duration_s: String,
    pub minter_address: String,
    pub nft_infos: Vec<FarmNft>,
    pub pool_address: String,
    pub reward_token_address: String,
    pub rewards: Vec<FarmMinterReward>,
    pub status: String,
    #[serde(default)]
    pub apy: Option<String>,
    #[serde(default)]
    pub locked_total_lp_usd: Option<String>,
}

// ============================================================================
// SWAPS
// ============================================================================

/// Input of the forward and reverse swap simulation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapSimulateData {
    pub offer_address: String,
    pub ask_address: String,
    /// Integer amount in the smallest unit of the offered (or asked) asset
    pub units: String,
    /// Fraction, e.g. "0.01" for 1%
    pub slippage_tolerance: String,
    #[serde(default)]
    pub referral_address: Option<String>,
    #[serde(default)]
    pub referral_fee_bps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapResponse {
    pub ask_address: String,
    pub ask_jetton_wallet: String,
    pub ask_units: String,
    pub fee_address: String,
    pub fee_percent: String,
    pub fee_units: String,
    pub min_ask_units: String,
    pub offer_address: String,
    pub offer_jetton_wallet: String,
    pub offer_units: String,
    pub pool_address: String,
    pub price_impact: String,
    pub router_address: String,
    pub slippage_tolerance: String,
    pub swap_rate: String,
}

/// Discriminator returned while the swap transaction is not on chain yet
pub const SWAP_NOT_FOUND: &str = "transaction_not_found";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapStatus {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub balance_deltas: Option<String>,
    #[serde(default)]
    pub coins: Option<String>,
    #[serde(default)]
    pub exit_code: Option<String>,
    #[serde(default)]
    pub logical_time: Option<String>,
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(rename = "@type")]
    pub status_type: String,
}

impl SwapStatus {
    pub fn is_found(&self) -> bool {
        !self.status_type.eq_ignore_ascii_case(SWAP_NOT_FOUND)
            && !self.status_type.eq_ignore_ascii_case("NotFound")
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationStat {
    pub asset0_address: String,
    pub asset0_amount: String,
    pub asset0_delta: String,
    pub asset0_reserve: String,
    pub asset1_address: String,
    pub asset1_amount: String,
    pub asset1_delta: String,
    pub asset1_reserve: String,
    pub destination_wallet_address: String,
    pub exit_code: String,
    #[serde(default)]
    pub fee_asset_address: Option<String>,
    pub lp_fee_amount: String,
    pub lp_token_delta: String,
    pub lp_token_supply: String,
    pub operation_type: String,
    pub pool_address: String,
    pub pool_tx_hash: String,
    #[serde(deserialize_with = "deserialize_lt")]
    pub pool_tx_lt: i64,
    pub pool_tx_timestamp: String,
    pub protocol_fee_amount: String,
    #[serde(default)]
    pub referral_address: Option<String>,
    pub referral_fee_amount: String,
    pub router_address: String,
    pub success: bool,
    pub wallet_address: String,
    pub wallet_tx_hash: String,
    #[serde(deserialize_with = "deserialize_lt")]
    pub wallet_tx_lt: i64,
    pub wallet_tx_timestamp: String,
}

/// One historical pool event with the asset snapshots taken at that time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub asset0_info: Asset,
    pub asset1_info: Asset,
    pub operation: OperationStat,
}

// ============================================================================
// STATS & MARKETS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexStats {
    pub trades: u64,
    pub tvl: String,
    pub unique_wallets: u64,
    pub volume_usd: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    #[serde(default)]
    pub apy: Option<String>,
    pub base_id: String,
    pub base_liquidity: String,
    pub base_name: String,
    pub base_symbol: String,
    pub base_volume: String,
    pub last_price: String,
    #[serde(default)]
    pub lp_price: Option<String>,
    pub lp_price_usd: String,
    pub pool_address: String,
    pub quote_id: String,
    pub quote_liquidity: String,
    pub quote_name: String,
    pub quote_symbol: String,
    pub quote_volume: String,
    pub router_address: String,
    pub url: String,
}

/// `[base, quote]` asset addresses of a tradable market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPair(pub String, pub String);

impl MarketPair {
    pub fn base(&self) -> &str {
        &self.0
    }

    pub fn quote(&self) -> &str {
        &self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset_json() -> serde_json::Value {
        json!({
            "blacklisted": false,
            "community": false,
            "contract_address": "EQCxE6mUtQJKFnGfaROTKOt1lZbDiiX1kCixRv7Nw2Id_sDs",
            "default_symbol": true,
            "deprecated": false,
            "dex_usd_price": "1.0002",
            "display_name": "Tether USD",
            "kind": "Jetton",
            "symbol": "USDT",
            "tags": ["default_symbol", "liquidity:very_high"],
            "taxable": false,
            "decimals": 6,
            "priority": 10
        })
    }

    #[test]
    fn test_asset_decodes_and_exposes_price() {
        let asset: Asset = serde_json::from_value(asset_json()).unwrap();
        assert_eq!(asset.kind, AssetKind::Jetton);
        assert_eq!(asset.name(), "Tether USD");
        assert_eq!(asset.usd_price(), Some(Decimal::from_str("1.0002").unwrap()));
        assert!(asset.balance.is_none());
    }

    #[test]
    fn test_unknown_asset_kind_is_tolerated() {
        let mut value = asset_json();
        value["kind"] = json!("SomethingNew");
        let asset: Asset = serde_json::from_value(value).unwrap();
        assert_eq!(asset.kind, AssetKind::Unknown);
    }

    #[test]
    fn test_price_falls_back_to_third_party() {
        let mut value = asset_json();
        value["dex_usd_price"] = json!(null);
        value["third_party_usd_price"] = json!("0.99");
        let asset: Asset = serde_json::from_value(value).unwrap();
        assert_eq!(asset.usd_price(), Some(Decimal::from_str("0.99").unwrap()));
    }

    #[test]
    fn test_swap_status_maps_type_key() {
        let status: SwapStatus =
            serde_json::from_value(json!({"@type": "transaction_not_found"})).unwrap();
        assert_eq!(status.status_type, "transaction_not_found");
        assert!(!status.is_found());
        assert!(status.tx_hash.is_none());

        let found: SwapStatus = serde_json::from_value(json!({
            "@type": "Found",
            "exit_code": "swap_ok",
            "tx_hash": "abc"
        }))
        .unwrap();
        assert!(found.is_found());
    }

    #[test]
    fn test_market_pair_from_array() {
        let pair: MarketPair = serde_json::from_value(json!(["EQbase", "EQquote"])).unwrap();
        assert_eq!(pair.base(), "EQbase");
        assert_eq!(pair.quote(), "EQquote");
        assert!(serde_json::from_value::<MarketPair>(json!(["only-one"])).is_err());
    }

    #[test]
    fn test_logical_time_accepts_string_or_number() {
        #[derive(Deserialize)]
        struct Lt {
            #[serde(deserialize_with = "deserialize_lt")]
            lt: i64,
        }
        let a: Lt = serde_json::from_value(json!({"lt": 46000000000001_i64})).unwrap();
        let b: Lt = serde_json::from_value(json!({"lt": "46000000000001"})).unwrap();
        assert_eq!(a.lt, b.lt);
        assert!(serde_json::from_value::<Lt>(json!({"lt": "abc"})).is_err());
    }
}
