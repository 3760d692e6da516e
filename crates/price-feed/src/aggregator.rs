//! Price aggregator - combines multiple sources into one price

use futures::future::join_all;
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use tracing::{error, info, warn};

use oracle_core::{DataPoint, OptionalDataPoint};

use crate::history::History;
use crate::source::DataSource;

/// How child prices are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationAlgorithm {
    #[default]
    Median,
    Mean,
}

impl AggregationAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            AggregationAlgorithm::Median => "median",
            AggregationAlgorithm::Mean => "mean",
        }
    }

    /// Combine prices, `None` if there are none
    pub fn apply(&self, prices: &[f64]) -> Option<f64> {
        match self {
            AggregationAlgorithm::Median => median(prices),
            AggregationAlgorithm::Mean => mean(prices),
        }
    }
}

impl fmt::Display for AggregationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AggregationAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "median" => Ok(AggregationAlgorithm::Median),
            "mean" => Ok(AggregationAlgorithm::Mean),
            other => Err(format!("Unknown aggregation algorithm: {}", other)),
        }
    }
}

/// Middle value, or the mean of the two middle values for an even count
pub fn median(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

pub fn mean(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

/// What one child returned in an invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ChildResult {
    pub source: String,
    pub value: Option<f64>,
}

/// Outcome of the most recent aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationReport {
    pub algorithm: AggregationAlgorithm,
    /// One entry per child, in configured order
    pub results: Vec<ChildResult>,
    /// Children that returned a defined value
    pub contributing: usize,
    pub datapoint: OptionalDataPoint<f64>,
}

/// A source whose value is the consensus of its children
pub struct PriceAggregator {
    pub asset: String,
    pub currency: String,
    algorithm: AggregationAlgorithm,
    sources: Vec<Box<dyn DataSource<Value = f64>>>,
    history: History<f64>,
    last_report: Mutex<Option<AggregationReport>>,
}

impl PriceAggregator {
    pub fn new(
        asset: &str,
        currency: &str,
        algorithm: AggregationAlgorithm,
        sources: Vec<Box<dyn DataSource<Value = f64>>>,
    ) -> Self {
        Self {
            asset: asset.to_lowercase(),
            currency: currency.to_lowercase(),
            algorithm,
            sources,
            history: History::default(),
            last_report: Mutex::new(None),
        }
    }

    pub fn with_history(mut self, history: History<f64>) -> Self {
        self.history = history;
        self
    }

    pub fn sources(&self) -> &[Box<dyn DataSource<Value = f64>>] {
        &self.sources
    }

    pub fn last_report(&self) -> Option<AggregationReport> {
        self.last_report.lock().clone()
    }

    /// Sources that contributed to the most recent aggregate
    pub fn contributing_sources(&self) -> usize {
        self.last_report.lock().as_ref().map_or(0, |r| r.contributing)
    }

    /// Fetch from every child concurrently and wait for all of them
    async fn fan_out(&self) -> Vec<ChildResult> {
        let fetches = self
            .sources
            .iter()
            .map(|source| AssertUnwindSafe(source.fetch_new_datapoint()).catch_unwind());
        let outcomes = join_all(fetches).await;

        outcomes
            .into_iter()
            .zip(&self.sources)
            .map(|(outcome, source)| {
                let name = source.name();
                let value = match outcome {
                    Ok(Some(point)) if point.value.is_finite() => Some(point.value),
                    Ok(Some(point)) => {
                        warn!("Source {} returned non-finite price {}", name, point.value);
                        None
                    }
                    Ok(None) => None,
                    Err(_) => {
                        error!("Source {} panicked while fetching", name);
                        None
                    }
                };
                ChildResult { source: name, value }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl DataSource for PriceAggregator {
    type Value = f64;

    async fn fetch_new_datapoint(&self) -> OptionalDataPoint<f64> {
        let results = self.fan_out().await;
        let prices: Vec<f64> = results.iter().filter_map(|r| r.value).collect();

        info!(
            "Running {} on {} prices for {}/{}: {:?}",
            self.algorithm,
            prices.len(),
            self.asset,
            self.currency,
            prices
        );

        let datapoint = self.algorithm.apply(&prices).map(DataPoint::now);
        match &datapoint {
            Some(point) => {
                info!(
                    "{}/{} {} price {} at {} from {} of {} sources",
                    self.asset,
                    self.currency,
                    self.algorithm,
                    point.value,
                    point.timestamp,
                    prices.len(),
                    self.sources.len()
                );
                self.history.store(point.clone());
            }
            None => warn!("No prices retrieved for {}/{}", self.asset, self.currency),
        }

        *self.last_report.lock() = Some(AggregationReport {
            algorithm: self.algorithm,
            results,
            contributing: prices.len(),
            datapoint: datapoint.clone(),
        });

        datapoint
    }

    fn history(&self) -> &History<f64> {
        &self.history
    }

    fn name(&self) -> String {
        format!("{}-{}-{}", self.asset, self.currency, self.algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct MockSource {
        name: &'static str,
        value: Option<f64>,
        delay_ms: u64,
        calls: Arc<AtomicUsize>,
        history: History<f64>,
    }

    impl MockSource {
        fn boxed(name: &'static str, value: Option<f64>) -> Box<dyn DataSource<Value = f64>> {
            Box::new(Self::new(name, value, 0, Arc::new(AtomicUsize::new(0))))
        }

        fn new(name: &'static str, value: Option<f64>, delay_ms: u64, calls: Arc<AtomicUsize>) -> Self {
            Self {
                name,
                value,
                delay_ms,
                calls,
                history: History::default(),
            }
        }
    }

    #[async_trait::async_trait]
    impl DataSource for MockSource {
        type Value = f64;

        async fn fetch_new_datapoint(&self) -> OptionalDataPoint<f64> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            let point = DataPoint::now(self.value?);
            self.history.store(point.clone());
            Some(point)
        }

        fn history(&self) -> &History<f64> {
            &self.history
        }

        fn name(&self) -> String {
            self.name.to_string()
        }
    }

    struct PanickingSource {
        history: History<f64>,
    }

    #[async_trait::async_trait]
    impl DataSource for PanickingSource {
        type Value = f64;

        async fn fetch_new_datapoint(&self) -> OptionalDataPoint<f64> {
            panic!("connector bug");
        }

        fn history(&self) -> &History<f64> {
            &self.history
        }
    }

    fn aggregator(values: &[Option<f64>]) -> PriceAggregator {
        const NAMES: [&str; 4] = ["a", "b", "c", "d"];
        let sources = values
            .iter()
            .zip(NAMES)
            .map(|(v, name)| MockSource::boxed(name, *v))
            .collect();
        PriceAggregator::new("btc", "usd", AggregationAlgorithm::Median, sources)
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[10.0, 12.0, 11.0]), Some(11.0));
        assert_eq!(median(&[10.0, 12.0]), Some(11.0));
        assert_eq!(median(&[5.0]), Some(5.0));
        assert_eq!(median(&[]), None);
        // Order of inputs never matters
        assert_eq!(median(&[3.0, 1.0, 4.0, 2.0]), median(&[1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("Median".parse::<AggregationAlgorithm>().unwrap(), AggregationAlgorithm::Median);
        assert_eq!("mean".parse::<AggregationAlgorithm>().unwrap(), AggregationAlgorithm::Mean);
        assert!("mode".parse::<AggregationAlgorithm>().is_err());
    }

    #[tokio::test]
    async fn test_odd_count_median() {
        let agg = aggregator(&[Some(10.0), Some(12.0), Some(11.0)]);
        let point = agg.fetch_new_datapoint().await.unwrap();
        assert_eq!(point.value, 11.0);
        assert_eq!(agg.contributing_sources(), 3);
    }

    #[tokio::test]
    async fn test_even_count_median() {
        let agg = aggregator(&[Some(10.0), Some(12.0)]);
        let point = agg.fetch_new_datapoint().await.unwrap();
        assert_eq!(point.value, 11.0);
        assert_eq!(agg.contributing_sources(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure() {
        let agg = aggregator(&[Some(100.0), None, Some(102.0)]);
        let point = agg.fetch_new_datapoint().await.unwrap();
        assert_eq!(point.value, 101.0);
        assert_eq!(agg.contributing_sources(), 2);

        let report = agg.last_report().unwrap();
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[1], ChildResult { source: "b".into(), value: None });
        assert_eq!(report.datapoint, Some(point));
    }

    #[tokio::test]
    async fn test_total_failure() {
        let agg = aggregator(&[None, None, None]);
        assert!(agg.fetch_new_datapoint().await.is_none());
        assert_eq!(agg.contributing_sources(), 0);
        assert_eq!(agg.depth(), 0);
        assert!(agg.latest().is_none());
    }

    #[tokio::test]
    async fn test_single_child_failure() {
        let agg = aggregator(&[None]);
        assert!(agg.fetch_new_datapoint().await.is_none());
        assert_eq!(agg.contributing_sources(), 0);
    }

    #[tokio::test]
    async fn test_aggregate_stored_in_own_history() {
        let agg = aggregator(&[Some(1.0), Some(3.0)]);
        agg.fetch_new_datapoint().await;
        agg.fetch_new_datapoint().await;
        assert_eq!(agg.depth(), 2);
        assert_eq!(agg.latest().unwrap().value, 2.0);
        for source in agg.sources() {
            assert_eq!(source.depth(), 2);
        }
    }

    #[tokio::test]
    async fn test_waits_for_slow_children() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sources: Vec<Box<dyn DataSource<Value = f64>>> = vec![
            Box::new(MockSource::new("fast-fail", None, 0, Arc::clone(&calls))),
            Box::new(MockSource::new("slow", Some(20.0), 50, Arc::clone(&calls))),
            Box::new(MockSource::new("fast", Some(10.0), 0, Arc::clone(&calls))),
        ];
        let agg = PriceAggregator::new("eth", "usd", AggregationAlgorithm::Median, sources);

        let point = agg.fetch_new_datapoint().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(point.value, 15.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_children_fetch_concurrently() {
        const CHILDREN: u64 = 4;
        const DELAY_MS: u64 = 200;

        let calls = Arc::new(AtomicUsize::new(0));
        let sources: Vec<Box<dyn DataSource<Value = f64>>> = (0..CHILDREN)
            .map(|i| {
                Box::new(MockSource::new("slow", Some(i as f64), DELAY_MS, Arc::clone(&calls)))
                    as Box<dyn DataSource<Value = f64>>
            })
            .collect();
        let agg = PriceAggregator::new("eth", "usd", AggregationAlgorithm::Median, sources);

        let started = tokio::time::Instant::now();
        let point = agg.fetch_new_datapoint().await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(calls.load(Ordering::SeqCst), CHILDREN as usize);
        assert_eq!(point.value, 1.5);
        // Sequential fetching would take CHILDREN * DELAY_MS
        assert!(elapsed >= Duration::from_millis(DELAY_MS), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2 * DELAY_MS), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_panicking_child_is_isolated() {
        let sources: Vec<Box<dyn DataSource<Value = f64>>> = vec![
            MockSource::boxed("a", Some(5.0)),
            Box::new(PanickingSource { history: History::default() }),
            MockSource::boxed("c", Some(7.0)),
        ];
        let agg = PriceAggregator::new("eth", "usd", AggregationAlgorithm::Median, sources);

        let point = agg.fetch_new_datapoint().await.unwrap();
        assert_eq!(point.value, 6.0);
        assert_eq!(agg.contributing_sources(), 2);
        assert_eq!(agg.last_report().unwrap().results[1].source, "PanickingSource");
    }

    #[tokio::test]
    async fn test_non_finite_values_ignored() {
        let agg = aggregator(&[Some(f64::NAN), Some(4.0), Some(f64::INFINITY)]);
        let point = agg.fetch_new_datapoint().await.unwrap();
        assert_eq!(point.value, 4.0);
        assert_eq!(agg.contributing_sources(), 1);
    }

    #[tokio::test]
    async fn test_mean() {
        let sources = vec![
            MockSource::boxed("a", Some(1.0)),
            MockSource::boxed("b", Some(2.0)),
            MockSource::boxed("c", Some(6.0)),
        ];
        let agg = PriceAggregator::new("eth", "usd", AggregationAlgorithm::Mean, sources);
        assert_eq!(agg.fetch_new_datapoint().await.unwrap().value, 3.0);
    }

    #[tokio::test]
    async fn test_nested_aggregators() {
        let inner = aggregator(&[Some(10.0), Some(20.0)]);
        let sources: Vec<Box<dyn DataSource<Value = f64>>> = vec![Box::new(inner), MockSource::boxed("x", Some(30.0))];
        let outer = PriceAggregator::new("btc", "usd", AggregationAlgorithm::Median, sources);
        assert_eq!(outer.fetch_new_datapoint().await.unwrap().value, 22.5);
        assert_eq!(outer.name(), "btc-usd-median");
    }
}
