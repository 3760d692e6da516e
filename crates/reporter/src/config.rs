//! Reporter configuration
//!
//! Defaults layered with `ORACLE__*` environment variables, e.g.
//! `ORACLE__INTERVAL_SECS=30` or `ORACLE__FEED__TAG=eth-usd-spot`.

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

use oracle_core::{CatalogFormat, SourceConfig};

/// Which feed to report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSettings {
    /// Catalog tag of the query
    pub tag: Option<String>,
    /// URL for a numeric API response feed
    pub url: Option<String>,
    pub parse_str: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReporterConfig {
    pub history_capacity: usize,
    pub request_timeout_ms: u64,
    pub interval_secs: u64,
    #[serde(default)]
    pub feed: FeedSettings,
    pub catalog_format: CatalogFormat,
    pub log_json: bool,
}

impl ReporterConfig {
    /// Load configuration from defaults and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::with_prefix("ORACLE").separator("__"))
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let defaults = SourceConfig::default();
        let config = Config::builder()
            .set_default("history_capacity", defaults.history_capacity as u64)?
            .set_default("request_timeout_ms", defaults.request_timeout_ms)?
            .set_default("interval_secs", 60)?
            .set_default("catalog_format", CatalogFormat::default().name())?
            .set_default("log_json", false)?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            history_capacity: self.history_capacity,
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// One line summary for logging
    pub fn digest(&self) -> String {
        format!(
            "interval={}s history={} timeout={}ms feed.tag={:?} feed.url={:?} catalog={}",
            self.interval_secs,
            self.history_capacity,
            self.request_timeout_ms,
            self.feed.tag,
            self.feed.url,
            self.catalog_format
        )
    }
}
