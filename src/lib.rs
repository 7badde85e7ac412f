//! bitsignal - Bitcoin indicator bundles and buy/wait/sell signals

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use config::{Config, SourceKind};
use services::{BundleStore, DataProvider, SignalClassifier};
use sources::{AlphaVantageClient, BundleSource, RedisBundleCache, RemoteBundleClient};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<BundleStore>,
    pub classifier: Arc<SignalClassifier>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<BundleStore>, classifier: SignalClassifier) -> Self {
        Self {
            config,
            store,
            classifier: Arc::new(classifier),
        }
    }
}

/// Build the bundle store described by `config`, connecting to Redis if
/// one is configured.
pub async fn build_store(config: &Config) -> error::Result<Arc<BundleStore>> {
    let http = sources::http_client(config.http_timeout)?;

    let redis = match &config.redis_url {
        Some(url) => {
            let cache = RedisBundleCache::new();
            cache.connect(url).await;
            Some(cache)
        }
        None => None,
    };

    let source = match (config.source, &config.alpha_vantage_api_key, &redis) {
        (SourceKind::AlphaVantage, Some(key), _) => {
            BundleSource::AlphaVantage(AlphaVantageClient::new(http, key.clone()))
        }
        (SourceKind::Redis, _, Some(cache)) => BundleSource::Redis(cache.clone()),
        _ => BundleSource::Remote(RemoteBundleClient::new(http, config.bundle_url.clone())),
    };

    let provider = DataProvider::new(source);

    // The Redis source reads the key it would write, so skip write-through.
    let store = match redis {
        Some(cache) if config.source != SourceKind::Redis => BundleStore::with_write_through(
            provider,
            cache,
            config.refresh_interval,
            config.stale_after,
        ),
        _ => BundleStore::new(provider, config.refresh_interval, config.stale_after),
    };

    Ok(store)
}

pub use types::*;
