//! Configuration types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tunables shared by data sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Datapoints retained per source before the oldest is evicted
    pub history_capacity: usize,
    pub request_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            history_capacity: 256,
            request_timeout_ms: 5000,
        }
    }
}

/// Format for exporting the query catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    Markdown,
    Yaml,
    Json,
    #[default]
    None,
}

impl CatalogFormat {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogFormat::Markdown => "markdown",
            CatalogFormat::Yaml => "yaml",
            CatalogFormat::Json => "json",
            CatalogFormat::None => "none",
        }
    }
}

impl fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CatalogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(CatalogFormat::Markdown),
            "yaml" | "yml" => Ok(CatalogFormat::Yaml),
            "json" => Ok(CatalogFormat::Json),
            "none" | "" => Ok(CatalogFormat::None),
            other => Err(format!("Unknown catalog format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_config_defaults() {
        let config: SourceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.history_capacity, 256);
        assert_eq!(config.request_timeout_ms, 5000);
    }

    #[test]
    fn test_catalog_format_parse() {
        assert_eq!("YAML".parse::<CatalogFormat>().unwrap(), CatalogFormat::Yaml);
        assert_eq!("md".parse::<CatalogFormat>().unwrap(), CatalogFormat::Markdown);
        assert_eq!(CatalogFormat::default(), CatalogFormat::None);
        assert!("xml".parse::<CatalogFormat>().is_err());

        let format: CatalogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, CatalogFormat::Json);
    }
}
