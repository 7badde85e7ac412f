//! Remote JSON bundle endpoint.

use crate::error::{AppError, Result};
use crate::types::{decode_bundle, IndicatorBundle};
use reqwest::Client;
use tracing::debug;

/// Fetches a ready-made bundle with a single GET.
pub struct RemoteBundleClient {
    client: Client,
    url: String,
}

impl RemoteBundleClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the endpoint and decode the body.
    pub async fn fetch_bundle(&self) -> Result<IndicatorBundle> {
        debug!("Fetching indicator bundle from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        decode_bundle(&body)
    }
}
