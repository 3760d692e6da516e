//! Data feeds

use std::sync::Arc;

use oracle_core::{OptionalDataPoint, Query};

use crate::source::DataSource;

/// A query paired with the source that answers it
pub struct DataFeed<T> {
    query: Query,
    source: Arc<dyn DataSource<Value = T>>,
}

impl<T: Clone + Send + Sync + 'static> DataFeed<T> {
    pub fn new(query: impl Into<Query>, source: Arc<dyn DataSource<Value = T>>) -> Self {
        Self {
            query: query.into(),
            source,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn source(&self) -> &Arc<dyn DataSource<Value = T>> {
        &self.source
    }

    pub async fn fetch_new_datapoint(&self) -> OptionalDataPoint<T> {
        self.source.fetch_new_datapoint().await
    }
}

impl<T> Clone for DataFeed<T> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            source: Arc::clone(&self.source),
        }
    }
}
