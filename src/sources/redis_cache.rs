use crate::error::{AppError, Result};
use crate::types::{decode_bundle, encode_bundle, IndicatorBundle};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Key holding the latest bundle in the canonical wire schema.
pub const BUNDLE_KEY: &str = "bitsignal:bundle";

/// TTL for bundles written through to Redis.
pub const BUNDLE_TTL: Duration = Duration::from_secs(600);

/// Redis-backed bundle proxy.
///
/// Reads the bundle another process (or this one) cached under
/// [`BUNDLE_KEY`], and writes live bundles back with a TTL.
#[derive(Clone, Default)]
pub struct RedisBundleCache {
    conn: Arc<RwLock<Option<ConnectionManager>>>,
}

impl RedisBundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to Redis. Failures are logged and leave the cache disconnected.
    pub async fn connect(&self, redis_url: &str) {
        match redis::Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => {
                    info!("Bundle cache connected to Redis at {}", redis_url);
                    *self.conn.write().await = Some(conn);
                }
                Err(e) => {
                    warn!("Failed to connect bundle cache to Redis: {}", e);
                }
            },
            Err(e) => {
                warn!("Invalid Redis URL for bundle cache: {}", e);
            }
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.read().await.is_some()
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::Unavailable("Redis not connected".to_string()))
    }

    /// Load the cached bundle.
    pub async fn fetch_bundle(&self) -> Result<IndicatorBundle> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(BUNDLE_KEY).await?;
        let raw = raw.ok_or_else(|| AppError::NotFound(format!("{} is not set", BUNDLE_KEY)))?;
        decode_bundle(raw.as_bytes())
    }

    /// Write a bundle with [`BUNDLE_TTL`].
    pub async fn store_bundle(&self, bundle: &IndicatorBundle) -> Result<()> {
        let mut conn = self.connection().await?;
        let json = encode_bundle(bundle)?;

        redis::cmd("SET")
            .arg(BUNDLE_KEY)
            .arg(json)
            .arg("EX")
            .arg(BUNDLE_TTL.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!("Wrote bundle to Redis ({} points)", bundle.price_data.len());
        Ok(())
    }
}
