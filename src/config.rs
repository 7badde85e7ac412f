use std::env;
use std::time::Duration;

use tracing::warn;

use crate::services::classifier::ClassifierRule;

/// Default remote bundle endpoint.
pub const DEFAULT_BUNDLE_URL: &str = "http://localhost:3000/bitcoin";

/// Which upstream produces the indicator bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Single GET to `BUNDLE_URL`.
    #[default]
    Remote,
    /// Alpha Vantage daily series plus SMA(50) and SMA(200).
    AlphaVantage,
    /// Cached bundle in Redis.
    Redis,
}

impl SourceKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "remote" | "http" => Some(SourceKind::Remote),
            "alphavantage" | "alpha_vantage" | "alpha-vantage" => Some(SourceKind::AlphaVantage),
            "redis" => Some(SourceKind::Redis),
            _ => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Upstream for indicator bundles.
    pub source: SourceKind,
    /// Remote bundle endpoint.
    pub bundle_url: String,
    /// Alpha Vantage API key.
    pub alpha_vantage_api_key: Option<String>,
    /// Redis URL for the bundle proxy and write-through cache.
    pub redis_url: Option<String>,
    /// How often the bundle is refetched.
    pub refresh_interval: Duration,
    /// Age after which a bundle counts as stale.
    pub stale_after: Duration,
    /// Upstream HTTP timeout.
    pub http_timeout: Duration,
    /// Decision rule for recommendations.
    pub classifier_rule: ClassifierRule,
}

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

/// Parse `CLASSIFIER_RULE`, warning on unknown values and falling back to trend.
fn classifier_rule_from(raw: Option<String>) -> ClassifierRule {
    raw.and_then(|r| {
        let rule = ClassifierRule::from_str(&r);
        if rule.is_none() {
            warn!("Unknown CLASSIFIER_RULE '{}', using trend", r);
        }
        rule
    })
    .unwrap_or_default()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let alpha_vantage_api_key = env::var("ALPHA_VANTAGE_API_KEY").ok().filter(|k| !k.is_empty());

        let mut source = env::var("BUNDLE_SOURCE")
            .ok()
            .and_then(|s| {
                let kind = SourceKind::from_str(&s);
                if kind.is_none() {
                    warn!("Unknown BUNDLE_SOURCE '{}', using remote", s);
                }
                kind
            })
            .unwrap_or_default();

        if source == SourceKind::AlphaVantage && alpha_vantage_api_key.is_none() {
            warn!("BUNDLE_SOURCE=alphavantage but ALPHA_VANTAGE_API_KEY is not set, using remote");
            source = SourceKind::Remote;
        }

        let redis_url = env::var("REDIS_URL").ok().filter(|u| !u.is_empty());
        if source == SourceKind::Redis && redis_url.is_none() {
            warn!("BUNDLE_SOURCE=redis but REDIS_URL is not set, using remote");
            source = SourceKind::Remote;
        }

        let classifier_rule = classifier_rule_from(env::var("CLASSIFIER_RULE").ok());

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            source,
            bundle_url: env::var("BUNDLE_URL").unwrap_or_else(|_| DEFAULT_BUNDLE_URL.to_string()),
            alpha_vantage_api_key,
            redis_url,
            refresh_interval: env_secs("REFRESH_INTERVAL_SECS", 300),
            stale_after: env_secs("STALE_AFTER_SECS", 120),
            http_timeout: env_secs("HTTP_TIMEOUT_SECS", 30),
            classifier_rule,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            source: SourceKind::Remote,
            bundle_url: DEFAULT_BUNDLE_URL.to_string(),
            alpha_vantage_api_key: None,
            redis_url: None,
            refresh_interval: Duration::from_secs(300),
            stale_after: Duration::from_secs(120),
            http_timeout: Duration::from_secs(30),
            classifier_rule: ClassifierRule::Trend,
        }
    }
}
