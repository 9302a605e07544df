/// STON.fi REST API client
///
/// API Documentation: https://api.ston.fi/swagger-ui/
///
/// Endpoints implemented:
/// 1. /v1/assets, /v1/assets/{addr} - Asset list and lookup
/// 2. /v1/farms, /v1/farms/{addr}, /v1/farms_by_pool/{pool} - Farms
/// 3. /v1/markets - Tradable pairs
/// 4. /v1/pools, /v1/pools/{addr} - Pool list and lookup
/// 5. /v1/swap/status - Status of a submitted swap
/// 6. /v1/swap/simulate, /v1/reverse_swap/simulate - Swap quotes (POST)
/// 7. /v1/jetton/{addr}/address - Jetton wallet address for an owner
/// 8. /v1/wallets/{wallet}/{assets,farms,pools}[/{id}] - Wallet holdings
/// 9. /v1/wallets/{wallet}/operations - Wallet history over a window
/// 10. /v1/stats/{dex,operations,pool} - Aggregate statistics over a window
///
/// The client does no logging; callers decide what to report.
pub mod params;
pub mod types;

pub use self::params::{parse_timestamp, TimeWindow, TIMESTAMP_FORMAT};
pub use self::types::{
    Asset, AssetKind, DexStats, Farm, FarmMinterReward, FarmNft, FarmNftReward, MarketPair,
    Operation, OperationStat, Pool, PoolStats, SwapResponse, SwapSimulateData, SwapStatus,
    SWAP_NOT_FOUND,
};

use self::params::path_segment;
use crate::apis::client::{
    ApiRequest, QueryParams, RawResponse, ReqwestTransport, RetryPolicy, Transport,
};
use crate::config::ApiConfig;
use crate::errors::ApiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

// ============================================================================
// RESPONSE ENVELOPES
// ============================================================================

#[derive(Deserialize)]
struct AssetListEnvelope {
    asset_list: Vec<Asset>,
}

#[derive(Deserialize)]
struct AssetEnvelope {
    #[serde(default)]
    asset: Option<Asset>,
}

#[derive(Deserialize)]
struct FarmListEnvelope {
    farm_list: Vec<Farm>,
}

#[derive(Deserialize)]
struct FarmEnvelope {
    #[serde(default)]
    farm: Option<Farm>,
}

#[derive(Deserialize)]
struct PoolListEnvelope {
    pool_list: Vec<Pool>,
}

#[derive(Deserialize)]
struct PoolEnvelope {
    #[serde(default)]
    pool: Option<Pool>,
}

#[derive(Deserialize)]
struct PairsEnvelope {
    pairs: Vec<MarketPair>,
}

#[derive(Deserialize)]
struct AddressEnvelope {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Deserialize)]
struct OperationsEnvelope {
    operations: Vec<Operation>,
}

#[derive(Deserialize)]
struct DexStatsEnvelope {
    stats: DexStats,
}

#[derive(Deserialize)]
struct PoolStatsEnvelope {
    stats: Vec<PoolStats>,
}

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

/// Typed STON.fi client; share it behind an `Arc`
pub struct StonfiClient<T: Transport = ReqwestTransport> {
    transport: T,
    retry: RetryPolicy,
}

impl StonfiClient<ReqwestTransport> {
    /// Default production settings against `https://api.ston.fi`
    pub fn new() -> Result<Self, ApiError> {
        Self::from_config(&ApiConfig::default())
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let transport =
            ReqwestTransport::new(&config.base_url, config.timeout(), &config.user_agent)?;
        let retry = RetryPolicy {
            max_attempts: config.max_attempts,
            base_delay: config.retry_base_delay(),
            max_delay: config.retry_max_delay(),
        };
        Ok(Self::with_transport(transport, retry))
    }
}

impl<T: Transport> StonfiClient<T> {
    pub fn with_transport(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Release the connection pool
    pub fn close(self) {
        drop(self.transport);
    }

    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let response = self.retry.run(&self.transport, &request).await?;
        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                endpoint: request.endpoint.to_string(),
                status: response.status,
                body: response.body_text(),
            });
        }
        Ok(response)
    }

    async fn fetch<E: DeserializeOwned>(&self, request: ApiRequest) -> Result<E, ApiError> {
        let endpoint = request.endpoint;
        let response = self.send(request).await?;
        serde_json::from_slice::<E>(&response.body).map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    // ------------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------------

    pub async fn get_assets(&self) -> Result<Vec<Asset>, ApiError> {
        let envelope: AssetListEnvelope = self
            .fetch(ApiRequest::get("get_assets", "/v1/assets"))
            .await?;
        Ok(envelope.asset_list)
    }

    pub async fn get_asset(&self, address: &str) -> Result<Asset, ApiError> {
        let address = path_segment("asset address", address)?;
        let envelope: AssetEnvelope = self
            .fetch(ApiRequest::get("get_asset", format!("/v1/assets/{}", address)))
            .await?;
        envelope.asset.ok_or_else(|| not_found("get_asset"))
    }

    // ------------------------------------------------------------------------
    // Farms
    // ------------------------------------------------------------------------

    pub async fn get_farms(&self) -> Result<Vec<Farm>, ApiError> {
        let envelope: FarmListEnvelope = self
            .fetch(ApiRequest::get("get_farms", "/v1/farms"))
            .await?;
        Ok(envelope.farm_list)
    }

    pub async fn get_farm(&self, address: &str) -> Result<Farm, ApiError> {
        let address = path_segment("farm address", address)?;
        let envelope: FarmEnvelope = self
            .fetch(ApiRequest::get("get_farm", format!("/v1/farms/{}", address)))
            .await?;
        envelope.farm.ok_or_else(|| not_found("get_farm"))
    }

    pub async fn get_farms_by_pool(&self, pool_address: &str) -> Result<Vec<Farm>, ApiError> {
        let pool_address = path_segment("pool address", pool_address)?;
        let envelope: FarmListEnvelope = self
            .fetch(ApiRequest::get(
                "get_farms_by_pool",
                format!("/v1/farms_by_pool/{}", pool_address),
            ))
            .await?;
        Ok(envelope.farm_list)
    }

    // ------------------------------------------------------------------------
    // Markets & pools
    // ------------------------------------------------------------------------

    pub async fn get_markets(&self) -> Result<Vec<MarketPair>, ApiError> {
        let envelope: PairsEnvelope = self
            .fetch(ApiRequest::get("get_markets", "/v1/markets"))
            .await?;
        Ok(envelope.pairs)
    }

    pub async fn get_pools(&self) -> Result<Vec<Pool>, ApiError> {
        let envelope: PoolListEnvelope = self
            .fetch(ApiRequest::get("get_pools", "/v1/pools"))
            .await?;
        Ok(envelope.pool_list)
    }

    pub async fn get_pool(&self, address: &str) -> Result<Pool, ApiError> {
        let address = path_segment("pool address", address)?;
        let envelope: PoolEnvelope = self
            .fetch(ApiRequest::get("get_pool", format!("/v1/pools/{}", address)))
            .await?;
        envelope.pool.ok_or_else(|| not_found("get_pool"))
    }

    // ------------------------------------------------------------------------
    // Swaps
    // ------------------------------------------------------------------------

    /// A swap that is not on chain yet is a normal result, see [`SwapStatus::is_found`]
    pub async fn get_swap_status(
        &self,
        router_address: &str,
        owner_address: &str,
        query_id: u64,
    ) -> Result<SwapStatus, ApiError> {
        let router_address = path_segment("router_address", router_address)?;
        let owner_address = path_segment("owner_address", owner_address)?;
        let query = QueryParams::new()
            .push("router_address", router_address)
            .push("owner_address", owner_address)
            .push("query_id", query_id.to_string());
        self.fetch(ApiRequest::get("get_swap_status", "/v1/swap/status").with_query(query))
            .await
    }

    pub async fn swap_simulate(&self, data: &SwapSimulateData) -> Result<SwapResponse, ApiError> {
        data.validate()?;
        self.fetch(ApiRequest::post("swap_simulate", "/v1/swap/simulate").with_query(data.to_query()))
            .await
    }

    pub async fn reverse_swap_simulate(
        &self,
        data: &SwapSimulateData,
    ) -> Result<SwapResponse, ApiError> {
        data.validate()?;
        self.fetch(
            ApiRequest::post("reverse_swap_simulate", "/v1/reverse_swap/simulate")
                .with_query(data.to_query()),
        )
        .await
    }

    /// Jetton wallet address of `owner_address` for the given jetton master
    pub async fn get_jetton_address(
        &self,
        owner_address: &str,
        jetton_address: &str,
    ) -> Result<String, ApiError> {
        let owner_address = path_segment("owner_address", owner_address)?;
        let jetton_address = path_segment("jetton address", jetton_address)?;
        let query = QueryParams::new()
            .push("owner_address", owner_address)
            .push("addr_str", jetton_address);
        let envelope: AddressEnvelope = self
            .fetch(
                ApiRequest::get(
                    "get_jetton_address",
                    format!("/v1/jetton/{}/address", jetton_address),
                )
                .with_query(query),
            )
            .await?;
        envelope
            .address
            .filter(|a| !a.is_empty())
            .ok_or_else(|| not_found("get_jetton_address"))
    }

    // ------------------------------------------------------------------------
    // Wallets
    // ------------------------------------------------------------------------

    pub async fn get_wallet_assets(&self, wallet: &str) -> Result<Vec<Asset>, ApiError> {
        let wallet = path_segment("wallet address", wallet)?;
        let envelope: AssetListEnvelope = self
            .fetch(ApiRequest::get(
                "get_wallet_assets",
                format!("/v1/wallets/{}/assets", wallet),
            ))
            .await?;
        Ok(envelope.asset_list)
    }

    pub async fn get_wallet_asset(&self, wallet: &str, asset: &str) -> Result<Asset, ApiError> {
        let wallet = path_segment("wallet address", wallet)?;
        let asset = path_segment("asset address", asset)?;
        let envelope: AssetEnvelope = self
            .fetch(ApiRequest::get(
                "get_wallet_asset",
                format!("/v1/wallets/{}/assets/{}", wallet, asset),
            ))
            .await?;
        envelope.asset.ok_or_else(|| not_found("get_wallet_asset"))
    }

    pub async fn get_wallet_farms(&self, wallet: &str) -> Result<Vec<Farm>, ApiError> {
        let wallet = path_segment("wallet address", wallet)?;
        let envelope: FarmListEnvelope = self
            .fetch(ApiRequest::get(
                "get_wallet_farms",
                format!("/v1/wallets/{}/farms", wallet),
            ))
            .await?;
        Ok(envelope.farm_list)
    }

    pub async fn get_wallet_farm(&self, wallet: &str, farm: &str) -> Result<Farm, ApiError> {
        let wallet = path_segment("wallet address", wallet)?;
        let farm = path_segment("farm address", farm)?;
        let envelope: FarmEnvelope = self
            .fetch(ApiRequest::get(
                "get_wallet_farm",
                format!("/v1/wallets/{}/farms/{}", wallet, farm),
            ))
            .await?;
        envelope.farm.ok_or_else(|| not_found("get_wallet_farm"))
    }

    /// Operations of a wallet inside the window, oldest first
    pub async fn get_wallet_operations(
        &self,
        wallet: &str,
        since: &str,
        until: &str,
        op_type: Option<&str>,
    ) -> Result<Vec<Operation>, ApiError> {
        let window = TimeWindow::parse(since, until)?;
        self.get_wallet_operations_in(wallet, &window, op_type).await
    }

    pub async fn get_wallet_operations_in(
        &self,
        wallet: &str,
        window: &TimeWindow,
        op_type: Option<&str>,
    ) -> Result<Vec<Operation>, ApiError> {
        let wallet = path_segment("wallet address", wallet)?;
        let op_type = op_type.map(str::trim).filter(|t| !t.is_empty());
        let query = window.to_query().push_opt("op_type", op_type);
        let envelope: OperationsEnvelope = self
            .fetch(
                ApiRequest::get(
                    "get_wallet_operations",
                    format!("/v1/wallets/{}/operations", wallet),
                )
                .with_query(query),
            )
            .await?;
        Ok(chronological(envelope.operations))
    }

    pub async fn get_wallet_pools(&self, wallet: &str) -> Result<Vec<Pool>, ApiError> {
        let wallet = path_segment("wallet address", wallet)?;
        let envelope: PoolListEnvelope = self
            .fetch(ApiRequest::get(
                "get_wallet_pools",
                format!("/v1/wallets/{}/pools", wallet),
            ))
            .await?;
        Ok(envelope.pool_list)
    }

    pub async fn get_wallet_pool(&self, wallet: &str, pool: &str) -> Result<Pool, ApiError> {
        let wallet = path_segment("wallet address", wallet)?;
        let pool = path_segment("pool address", pool)?;
        let envelope: PoolEnvelope = self
            .fetch(ApiRequest::get(
                "get_wallet_pool",
                format!("/v1/wallets/{}/pools/{}", wallet, pool),
            ))
            .await?;
        envelope.pool.ok_or_else(|| not_found("get_wallet_pool"))
    }

    // ------------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------------

    pub async fn get_dex_stats(&self, since: &str, until: &str) -> Result<DexStats, ApiError> {
        let window = TimeWindow::parse(since, until)?;
        let envelope: DexStatsEnvelope = self
            .fetch(ApiRequest::get("get_dex_stats", "/v1/stats/dex").with_query(window.to_query()))
            .await?;
        Ok(envelope.stats)
    }

    /// Operations across the whole DEX inside the window, oldest first
    pub async fn get_operations_stats(
        &self,
        since: &str,
        until: &str,
    ) -> Result<Vec<Operation>, ApiError> {
        let window = TimeWindow::parse(since, until)?;
        let envelope: OperationsEnvelope = self
            .fetch(
                ApiRequest::get("get_operations_stats", "/v1/stats/operations")
                    .with_query(window.to_query()),
            )
            .await?;
        Ok(chronological(envelope.operations))
    }

    pub async fn get_pool_stats(&self, since: &str, until: &str) -> Result<Vec<PoolStats>, ApiError> {
        let window = TimeWindow::parse(since, until)?;
        let envelope: PoolStatsEnvelope = self
            .fetch(ApiRequest::get("get_pool_stats", "/v1/stats/pool").with_query(window.to_query()))
            .await?;
        Ok(envelope.stats)
    }
}

fn not_found(endpoint: &str) -> ApiError {
    ApiError::NotFound {
        endpoint: endpoint.to_string(),
    }
}

/// Stable sort by pool transaction time, then logical time
fn chronological(mut operations: Vec<Operation>) -> Vec<Operation> {
    operations.sort_by(|a, b| {
        let key_a = (sortable_timestamp(&a.operation.pool_tx_timestamp), a.operation.pool_tx_lt);
        let key_b = (sortable_timestamp(&b.operation.pool_tx_timestamp), b.operation.pool_tx_lt);
        key_a.cmp(&key_b)
    });
    operations
}

/// Parsed when possible so mixed precision strings still order correctly
fn sortable_timestamp(raw: &str) -> Option<chrono::NaiveDateTime> {
    parse_timestamp("pool_tx_timestamp", raw).ok()
}
