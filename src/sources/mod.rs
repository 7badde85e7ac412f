pub mod alphavantage;
pub mod redis_cache;
pub mod remote;

pub use alphavantage::AlphaVantageClient;
pub use redis_cache::RedisBundleCache;
pub use remote::RemoteBundleClient;

use crate::error::Result;
use crate::types::IndicatorBundle;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client for upstream calls.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("bitsignal/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Upstream that produces indicator bundles.
pub enum BundleSource {
    Remote(RemoteBundleClient),
    AlphaVantage(AlphaVantageClient),
    Redis(RedisBundleCache),
}

impl BundleSource {
    pub fn name(&self) -> &'static str {
        match self {
            BundleSource::Remote(_) => "remote",
            BundleSource::AlphaVantage(_) => "alphavantage",
            BundleSource::Redis(_) => "redis",
        }
    }

    pub async fn fetch_bundle(&self) -> Result<IndicatorBundle> {
        match self {
            BundleSource::Remote(client) => client.fetch_bundle().await,
            BundleSource::AlphaVantage(client) => client.fetch_bundle().await,
            BundleSource::Redis(cache) => cache.fetch_bundle().await,
        }
    }
}
