//! Registry-backed resolution of the current upstream target.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::abi;

#[derive(Debug, Clone)]
struct Cached {
    domain: String,
    resolved_at: Instant,
}

/// Resolves the current upstream domain from an on-chain registry contract.
///
/// The contract is queried via JSON-RPC `eth_call` across an ordered endpoint
/// list; the first endpoint returning a decodable, non-empty domain wins.
/// Successful resolutions are cached for a bounded time window.
///
/// The cache is a single slot with last-write-wins semantics. Concurrent
/// cache misses may issue redundant calls; every write derives the same
/// external truth, so no coordination is required.
#[derive(Debug, Clone)]
pub struct Resolver {
    contract: String,
    selector: String,
    endpoints: Vec<String>,
    ttl: Duration,
    rpc_timeout: Duration,
    cache: Arc<RwLock<Option<Cached>>>,
    client: reqwest::Client,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_CONTRACT,
            Self::DEFAULT_SELECTOR,
            Self::DEFAULT_ENDPOINTS.map(String::from).to_vec(),
        )
    }
}

impl Resolver {
    /// The default registry contract address.
    pub const DEFAULT_CONTRACT: &str = "0xe9d5f645f79fa60fca82b4e1d35832e43370feb0";

    /// The default 4-byte selector of the registry's domain getter.
    pub const DEFAULT_SELECTOR: &str = "0x06fdde03";

    /// The default JSON-RPC endpoints, tried in order.
    pub const DEFAULT_ENDPOINTS: [&str; 2] =
        ["https://binance.llamarpc.com", "https://bsc.drpc.org"];

    /// How long a resolved domain stays fresh.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    /// Per-endpoint timeout for the JSON-RPC call.
    pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(15);

    /// Creates a resolver for the provided contract, selector, and endpoints.
    pub fn new<C, S>(contract: C, selector: S, endpoints: Vec<String>) -> Self
    where
        C: AsRef<str>,
        S: AsRef<str>,
    {
        Self {
            contract: contract.as_ref().into(),
            selector: selector.as_ref().into(),
            endpoints,
            ttl: Self::DEFAULT_TTL,
            rpc_timeout: Self::DEFAULT_RPC_TIMEOUT,
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::new(),
        }
    }

    /// Overrides the cache time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the per-endpoint JSON-RPC timeout.
    pub fn with_rpc_timeout(mut self, rpc_timeout: Duration) -> Self {
        self.rpc_timeout = rpc_timeout;
        self
    }

    /// Returns the current upstream domain.
    ///
    /// A fresh cached value is returned without touching the network;
    /// otherwise the endpoint list is walked in order until one yields a
    /// decodable, non-empty domain.
    pub async fn resolve(&self) -> anyhow::Result<String> {
        if let Some(domain) = self.cached() {
            return Ok(domain);
        }

        for endpoint in &self.endpoints {
            match self.eth_call(endpoint).await {
                Ok(domain) if !domain.is_empty() => {
                    tracing::debug!("resolved target `{domain}` via `{endpoint}`...");

                    self.store(domain.clone());

                    return Ok(domain);
                }

                Ok(_) => tracing::debug!("endpoint `{endpoint}` returned an empty domain..."),
                Err(e) => tracing::debug!("endpoint `{endpoint}` failed: {e}"),
            }
        }

        anyhow::bail!("all RPC endpoints exhausted without a decodable domain");
    }

    fn cached(&self) -> Option<String> {
        self.cache
            .read()
            .as_ref()
            .filter(|c| c.resolved_at.elapsed() < self.ttl)
            .map(|c| c.domain.clone())
    }

    fn store(&self, domain: String) {
        self.cache.write().replace(Cached {
            domain,
            resolved_at: Instant::now(),
        });
    }

    async fn eth_call(&self, endpoint: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(endpoint)
            .timeout(self.rpc_timeout)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "eth_call",
                "params": [
                    {
                        "to": self.contract,
                        "data": self.selector,
                    },
                    "latest",
                ],
            }))
            .send()
            .await?;

        anyhow::ensure!(
            response.status().is_success(),
            "endpoint returned status {}",
            response.status()
        );

        let body: Value = response.json().await?;

        let result = body
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("response carries no result field"))?;

        abi::decode_abi_string(result)
    }
}
