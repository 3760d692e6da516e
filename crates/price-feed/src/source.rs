//! Data source capability
//!
//! Sources never raise: a failed fetch is logged and returned as `None`,
//! and only defined datapoints are stored in history.

use oracle_core::{DataPoint, OptionalDataPoint, SourceError, SourceResult};
use tracing::{error, info};

use crate::history::History;

/// Anything that produces timestamped values
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    type Value: Clone + Send + Sync + 'static;

    /// Fetch a new value and store it in history on success
    async fn fetch_new_datapoint(&self) -> OptionalDataPoint<Self::Value>;

    fn history(&self) -> &History<Self::Value>;

    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    /// Most recent stored datapoint
    fn latest(&self) -> OptionalDataPoint<Self::Value> {
        self.history().latest()
    }

    fn depth(&self) -> usize {
        self.history().depth()
    }

    fn datapoints(&self) -> Vec<DataPoint<Self::Value>> {
        self.history().all()
    }
}

/// A pricing service, e.g. an exchange API
#[async_trait::async_trait]
pub trait PriceService: Send + Sync {
    fn name(&self) -> &str;

    async fn get_price(&self, asset: &str, currency: &str) -> SourceResult<DataPoint<f64>>;
}

/// Zero, negative and non-finite prices are never valid readings
fn check_price(point: DataPoint<f64>) -> SourceResult<DataPoint<f64>> {
    if !point.value.is_finite() || point.value <= 0.0 {
        return Err(SourceError::Rejected(format!("price {} is not positive", point.value)));
    }
    Ok(point)
}

/// Price of one asset in one currency from a [`PriceService`]
pub struct PriceSource<S> {
    pub asset: String,
    pub currency: String,
    service: S,
    history: History<f64>,
}

impl<S: PriceService> PriceSource<S> {
    pub fn new(asset: &str, currency: &str, service: S) -> Self {
        Self::with_history(asset, currency, service, History::default())
    }

    pub fn with_history(asset: &str, currency: &str, service: S, history: History<f64>) -> Self {
        Self {
            asset: asset.to_lowercase(),
            currency: currency.to_lowercase(),
            service,
            history,
        }
    }
}

#[async_trait::async_trait]
impl<S: PriceService> DataSource for PriceSource<S> {
    type Value = f64;

    async fn fetch_new_datapoint(&self) -> OptionalDataPoint<f64> {
        let result = self
            .service
            .get_price(&self.asset, &self.currency)
            .await
            .and_then(check_price);

        match result {
            Ok(point) => {
                info!(
                    "{} {}/{} price {} at {}",
                    self.service.name(),
                    self.asset,
                    self.currency,
                    point.value,
                    point.timestamp
                );
                self.history.store(point.clone());
                Some(point)
            }
            Err(e) => {
                error!("{} {}/{}: {}", self.service.name(), self.asset, self.currency, e);
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
