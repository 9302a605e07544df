/// Base HTTP plumbing shared by API clients
///
/// A request is described as plain data ([`ApiRequest`]) and handed to a
/// [`Transport`]. [`RetryPolicy::run`] repeats the call on connection-level
/// failures only; any HTTP response, whatever its status, ends the loop.
use crate::errors::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use url::Url;

// ============================================================================
// REQUEST DESCRIPTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Ordered query string pairs; absent values are never stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    /// Append only when a value is present
    pub fn push_opt<V: Into<String>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Absolute path below the base URL, e.g. `/v1/pools`
    pub path: String,
    pub query: QueryParams,
    /// Operation name carried into errors, e.g. `get_pool`
    pub endpoint: &'static str,
}

impl ApiRequest {
    pub fn get(endpoint: &'static str, path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: QueryParams::new(),
            endpoint,
        }
    }

    pub fn post(endpoint: &'static str, path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(endpoint, path)
        }
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ============================================================================
// TRANSPORT
// ============================================================================

/// Failure before a complete HTTP response was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout(String),
    Connect(String),
    /// Connection dropped or body read failed mid-way
    Io(String),
    /// The request could not be built; repeating it cannot help
    Build(String),
}

impl TransportFailure {
    pub fn is_transient(&self) -> bool {
        !matches!(self, TransportFailure::Build(_))
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Timeout(msg) => write!(f, "timeout: {}", msg),
            TransportFailure::Connect(msg) => write!(f, "connect: {}", msg),
            TransportFailure::Io(msg) => write!(f, "io: {}", msg),
            TransportFailure::Build(msg) => write!(f, "request build: {}", msg),
        }
    }
}

/// Executes one HTTP exchange, no retries
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportFailure>;
}

/// Production transport: one pooled `reqwest::Client`
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, ApiError> {
        if timeout.is_zero() {
            return Err(ApiError::Validation(
                "timeout must be greater than zero".to_string(),
            ));
        }
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Validation(format!("invalid base url '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Transport {
                endpoint: "client_init".to_string(),
                attempts: 0,
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL + path, with a query string only when parameters exist
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportFailure> {
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url = Url::parse(&joined).map_err(|e| TransportFailure::Build(e.to_string()))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportFailure> {
        let url = self.url_for(request)?;
        let builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}

fn classify(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportFailure::Connect(err.to_string())
    } else if err.is_builder() {
        TransportFailure::Build(err.to_string())
    } else {
        TransportFailure::Io(err.to_string())
    }
}

// ============================================================================
// RETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after the given number of failed attempts (1-based)
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    pub async fn run<T>(&self, transport: &T, request: &ApiRequest) -> Result<RawResponse, ApiError>
    where
        T: Transport + ?Sized,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match transport.execute(request).await {
                Ok(response) => return Ok(response),
                Err(failure) if failure.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(failure) => {
                    return Err(ApiError::Transport {
                        endpoint: request.endpoint.to_string(),
                        attempts: attempt,
                        message: failure.to_string(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyTransport {
        failures_before_success: u32,
        calls: AtomicU32,
        failure: TransportFailure,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn execute(&self, _request: &ApiRequest) -> Result<RawResponse, TransportFailure> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures_before_success {
                Err(self.failure.clone())
            } else {
                Ok(RawResponse::new(200, b"{}".to_vec()))
            }
        }
    }

    fn flaky(failures: u32, failure: TransportFailure) -> FlakyTransport {
        FlakyTransport {
            failures_before_success: failures,
            calls: AtomicU32::new(0),
            failure,
        }
    }

    #[test]
    fn test_push_opt_skips_none() {
        let query = QueryParams::new()
            .push("since", "2024-01-01T00:00:00")
            .push_opt("op_type", None::<String>)
            .push_opt("referral_address", Some("EQref"));
        assert_eq!(query.len(), 2);
        assert!(!query.contains_key("op_type"));
        assert_eq!(query.get("referral_address"), Some("EQref"));
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for(6), Duration::from_secs(2));
        assert_eq!(policy.delay_for(60), Duration::from_secs(2));
    }

    #[test]
    fn test_url_for_omits_empty_query() {
        let transport =
            ReqwestTransport::new("https://api.ston.fi/", Duration::from_secs(5), "test").unwrap();
        let plain = transport
            .url_for(&ApiRequest::get("get_pools", "/v1/pools"))
            .unwrap();
        assert_eq!(plain.as_str(), "https://api.ston.fi/v1/pools");

        let request = ApiRequest::get("get_dex_stats", "/v1/stats/dex").with_query(
            QueryParams::new()
                .push("since", "2024-01-01T00:00:00")
                .push("until", "2024-01-02T00:00:00"),
        );
        let url = transport.url_for(&request).unwrap();
        assert_eq!(
            url.query(),
            Some("since=2024-01-01T00%3A00%3A00&until=2024-01-02T00%3A00%3A00")
        );
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let result = ReqwestTransport::new("not a url", Duration::from_secs(5), "test");
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_recovers_after_transient_failures() {
        let transport = flaky(4, TransportFailure::Connect("refused".into()));
        let request = ApiRequest::get("get_assets", "/v1/assets");
        let response = RetryPolicy::default().run(&transport, &request).await.unwrap();
        assert!(response.is_success());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_gives_up_at_bound() {
        let transport = flaky(10, TransportFailure::Timeout("elapsed".into()));
        let request = ApiRequest::get("get_assets", "/v1/assets");
        let err = RetryPolicy::default()
            .run(&transport, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { attempts: 5, .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_build_failure_is_not_retried() {
        let transport = flaky(10, TransportFailure::Build("bad header".into()));
        let request = ApiRequest::get("get_assets", "/v1/assets");
        let err = RetryPolicy::immediate(5)
            .run(&transport, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { attempts: 1, .. }));
    }
}
