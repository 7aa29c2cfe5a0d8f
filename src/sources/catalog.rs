//! HTTP channel catalog fetcher
//!
//! One GET against the catalog URL with a browser-like `User-Agent` and a
//! bounded request timeout. The body must be a JSON array; its elements are
//! returned untouched and typed later by the mapping engine.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::json_kind;

use super::traits::ChannelCatalog;

/// Catalog fetched over HTTP(S)
pub struct HttpCatalog {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                SourceError::network(&config.url, format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
            timeout: config.timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_request_error(&self, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::timeout(&self.url)
        } else {
            SourceError::network(&self.url, error.to_string())
        }
    }
}

/// Parse a catalog body, which must be a JSON array
pub fn parse_catalog(body: &[u8]) -> SourceResult<Vec<Value>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SourceError::format(format!("Catalog is not valid JSON: {e}")))?;

    match value {
        Value::Array(records) => Ok(records),
        other => Err(SourceError::format(format!(
            "Expected a JSON array of channels, got a JSON {}",
            json_kind(&other)
        ))),
    }
}

#[async_trait]
impl ChannelCatalog for HttpCatalog {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_channels(&self) -> SourceResult<Vec<Value>> {
        info!("Fetching channel catalog from: {}", self.url);
        debug!("Catalog request timeout: {:?}", self.timeout);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !content_type.contains("json") {
            warn!("Unexpected catalog Content-Type: '{}'", content_type);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e))?;
        debug!("Fetched {} bytes of catalog content", body.len());

        let records = parse_catalog(&body)?;
        info!("Catalog loaded: {} channels found", records.len());
        Ok(records)
    }
}
