//! Numeric value read from an arbitrary JSON API

use serde_json::Value as Json;
use std::time::Duration;
use tracing::{error, info};

use oracle_core::queries::NumericApiResponse;
use oracle_core::{DataPoint, OptionalDataPoint, SourceConfig, SourceError, SourceResult};

use super::web::WebPriceService;
use crate::history::History;
use crate::source::DataSource;

const SERVICE_NAME: &str = "numeric-api";

/// One step into a JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Parse a comma separated path like `"data, 0, price"`
pub fn parse_path(parse_str: &str) -> Vec<PathStep> {
    parse_str
        .split(',')
        .map(str::trim)
        .map(|step| match step.parse::<usize>() {
            Ok(index) if step.chars().all(|c| c.is_ascii_digit()) => PathStep::Index(index),
            _ => PathStep::Key(step.to_string()),
        })
        .collect()
}

/// Walk `path` into `json` and read a number
pub fn extract_number(json: &Json, path: &[PathStep]) -> SourceResult<f64> {
    let mut current = json;
    for step in path {
        let next = match (step, current) {
            (PathStep::Index(i), Json::Array(items)) => items.get(*i),
            // Digit keys on objects are plain keys
            (PathStep::Index(i), Json::Object(map)) => map.get(&i.to_string()),
            (PathStep::Key(key), Json::Object(map)) => map.get(key),
            _ => None,
        };
        current = next.ok_or_else(|| SourceError::Parse(format!("{:?} not found in response", step)))?;
    }

    match current {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| SourceError::Parse(format!("{} is not representable as a float", n))),
        other => Err(SourceError::Parse(format!("Expecting a single number, got {}", other))),
    }
}

/// Source for [`NumericApiResponse`] queries
pub struct NumericApiResponseSource {
    url: String,
    path: Vec<PathStep>,
    service: WebPriceService,
    history: History<f64>,
}

impl NumericApiResponseSource {
    pub fn new(url: &str, parse_str: &str, timeout: Duration) -> SourceResult<Self> {
        Ok(Self::with_service(
            url,
            parse_str,
            WebPriceService::new(SERVICE_NAME, url, timeout)?,
            History::default(),
        ))
    }

    /// Build the source answering a query, using configured tunables
    pub fn from_query(query: &NumericApiResponse, config: &SourceConfig) -> SourceResult<Self> {
        Ok(Self::with_service(
            &query.url,
            &query.parse_str,
            WebPriceService::from_config(SERVICE_NAME, &query.url, config)?,
            History::new(config.history_capacity),
        ))
    }

    fn with_service(url: &str, parse_str: &str, service: WebPriceService, history: History<f64>) -> Self {
        Self {
            url: url.to_string(),
            path: parse_path(parse_str),
            service,
            history,
        }
    }

    async fn fetch_value(&self) -> SourceResult<f64> {
        let json = self.service.get_json("").await?;
        extract_number(&json, &self.path)
    }
}

#[async_trait::async_trait]
impl DataSource for NumericApiResponseSource {
    type Value = f64;

    async fn fetch_new_datapoint(&self) -> OptionalDataPoint<f64> {
        match self.fetch_value().await {
            Ok(value) => {
                let point = DataPoint::now(value);
                info!("API info {} retrieved at time {}", point.value, point.timestamp);
                self.history.store(point.clone());
                Some(point)
            }
            Err(e) => {
                error!("No value returned from {}: {}", self.url, e);
                None
            }
        }
    }

    fn history(&self) -> &History<f64> {
        &self.history
    }

    fn name(&self) -> String {
        self.service.name().to_string()
    }
}
