//! Submission preparation and the interval reporting loop

use alloy_primitives::{hex, Bytes, B256};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use oracle_core::{EncodingResult, Value};
use oracle_price_feed::DataFeed;

/// Everything a reporter would submit for one datapoint
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub query_id: B256,
    pub query_data: Bytes,
    /// Value encoded with the query's value type
    pub value: Bytes,
    pub reported: Value,
    pub timestamp: DateTime<Utc>,
}

impl Submission {
    pub fn summary(&self) -> String {
        format!(
            "query_id={} value={} encoded={} at {}",
            hex::encode_prefixed(self.query_id),
            self.reported,
            hex::encode_prefixed(&self.value),
            self.timestamp
        )
    }
}

/// Fetch a new datapoint for `feed` and encode it for submission
///
/// `Ok(None)` when the source produced no value. Values that do not fit
/// the query's value type are an error.
pub async fn prepare_submission<T>(feed: &DataFeed<T>) -> EncodingResult<Option<Submission>>
where
    T: Clone + Send + Sync + Into<Value> + 'static,
{
    let point = match feed.fetch_new_datapoint().await {
        Some(point) => point,
        None => return Ok(None),
    };

    let query = feed.query();
    let reported: Value = point.value.into();
    let value = query.value_type().encode(&reported)?;

    Ok(Some(Submission {
        query_id: query.query_id()?,
        query_data: query.query_data()?,
        value: Bytes::from(value),
        reported,
        timestamp: point.timestamp,
    }))
}

/// Prepares submissions for a set of feeds on a fixed interval
pub struct IntervalReporter<T> {
    feeds: Vec<DataFeed<T>>,
    interval: Duration,
}

impl<T> IntervalReporter<T>
where
    T: Clone + Send + Sync + Into<Value> + 'static,
{
    pub fn new(feeds: Vec<DataFeed<T>>, interval: Duration) -> Self {
        Self { feeds, interval }
    }

    pub fn feeds(&self) -> &[DataFeed<T>] {
        &self.feeds
    }

    /// One reporting round over every feed
    pub async fn report_once(&self) -> Vec<Submission> {
        let mut submissions = Vec::with_capacity(self.feeds.len());
        for feed in &self.feeds {
            match prepare_submission(feed).await {
                Ok(Some(submission)) => {
                    info!("Prepared submission for {}: {}", feed.query(), submission.summary());
                    submissions.push(submission);
                }
                Ok(None) => warn!("No value available for {}", feed.query()),
                Err(e) => error!("Failed to encode value for {}: {}", feed.query(), e),
            }
        }
        submissions
    }

    /// Report every interval until `shutdown` fires
    pub async fn run(&self, mut shutdown: oneshot::Receiver<()>) -> usize {
        let mut ticker = tokio::time::interval(self.interval);
        let mut rounds = 0;

        info!("Reporting {} feed(s) every {:?}", self.feeds.len(), self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.report_once().await;
                    rounds += 1;
                }
                _ = &mut shutdown => {
                    info!("Reporter stopping after {} round(s)", rounds);
                    return rounds;
                }
            }
        }
    }
}
