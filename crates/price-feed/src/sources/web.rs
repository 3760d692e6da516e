//! HTTP helper shared by web based services

use std::time::Duration;
use tracing::debug;

use oracle_core::{SourceConfig, SourceError, SourceResult};

/// A named web service with a base URL
#[derive(Debug, Clone)]
pub struct WebPriceService {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl WebPriceService {
    pub fn new(name: &str, base_url: &str, timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            client,
        })
    }

    pub fn from_config(name: &str, base_url: &str, config: &SourceConfig) -> SourceResult<Self> {
        Self::new(name, base_url, Duration::from_millis(config.request_timeout_ms))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `base_url + path` and parse the body as JSON
    pub async fn get_json(&self, path: &str) -> SourceResult<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} GET {}", self.name, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(format!("{} returned {}", url, status)));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))
    }
}
