//! Bundle provider with synthetic fallback.

use crate::services::synthetic::{BundleGenerator, RandomBundleGenerator};
use crate::sources::BundleSource;
use crate::types::{BundleOrigin, IndicatorBundle};
use std::sync::Arc;
use tracing::{debug, warn};

/// A bundle together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidedBundle {
    pub bundle: IndicatorBundle,
    pub origin: BundleOrigin,
}

/// Fetches bundles from the configured source, substituting synthetic data
/// on any failure.
pub struct DataProvider {
    source: BundleSource,
    generator: Arc<dyn BundleGenerator>,
}

impl DataProvider {
    pub fn new(source: BundleSource) -> Self {
        Self::with_generator(source, Arc::new(RandomBundleGenerator::from_entropy()))
    }

    pub fn with_generator(source: BundleSource, generator: Arc<dyn BundleGenerator>) -> Self {
        Self { source, generator }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Fetch a bundle. Never fails: errors are logged and replaced by a
    /// generated bundle.
    pub async fn fetch(&self) -> ProvidedBundle {
        match self.source.fetch_bundle().await {
            Ok(bundle) => {
                debug!(
                    "Fetched bundle from {} ({} points)",
                    self.source.name(),
                    bundle.price_data.len()
                );
                ProvidedBundle {
                    bundle,
                    origin: BundleOrigin::Live {
                        source: self.source.name().to_string(),
                    },
                }
            }
            Err(e) => {
                warn!(
                    "Failed to load bundle from {}: {}. Using synthetic data.",
                    self.source.name(),
                    e
                );
                ProvidedBundle {
                    bundle: self.generator.generate(),
                    origin: BundleOrigin::Synthetic {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Fetch just the bundle.
    pub async fn fetch_indicator_bundle(&self) -> IndicatorBundle {
        self.fetch().await.bundle
    }
}
