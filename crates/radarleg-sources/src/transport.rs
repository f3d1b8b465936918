//! HTTP transport seam between adapters and the network.
//!
//! All fetching goes through the [`Transport`] trait so adapters can be
//! exercised deterministically in tests with scripted responses: no network,
//! no live endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::error::SourceError;

/// Seconds-scale timeout for the JSON endpoints.
const JSON_TIMEOUT: Duration = Duration::from_secs(15);
/// The bulk archive is tens of megabytes; allow tens of seconds.
const BULK_TIMEOUT: Duration = Duration::from_secs(60);

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a JSON endpoint, returning the raw body.
    async fn get_json(&self, url: &str) -> Result<String, SourceError>;

    /// GET a binary payload (the bulk archive download).
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get_json(&self, url: &str) -> Result<String, SourceError> {
        (**self).get_json(url).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        (**self).get_bytes(url).await
    }
}

/// Production transport over reqwest with per-call timeouts.
pub struct HttpTransport {
    client: reqwest::Client,
    json_timeout: Duration,
    bulk_timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeouts(JSON_TIMEOUT, BULK_TIMEOUT)
    }

    pub fn with_timeouts(json_timeout: Duration, bulk_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            json_timeout,
            bulk_timeout,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<String, SourceError> {
        debug!(url, "GET json");
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(self.json_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Server {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        debug!(url, "GET bytes");
        let resp = self
            .client
            .get(url)
            .timeout(self.bulk_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Server {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
