//! Data sources and price aggregation
//!
//! Features:
//! - Bounded per-source datapoint history
//! - Concurrent fan-out to child sources with failure isolation
//! - Median consensus over the sources that answered
//! - Generic HTTP helpers for web based sources

pub mod aggregator;
pub mod feed;
pub mod history;
pub mod source;
pub mod sources;

pub use aggregator::{AggregationAlgorithm, AggregationReport, ChildResult, PriceAggregator};
pub use feed::DataFeed;
pub use history::History;
pub use source::{DataSource, PriceService, PriceSource};
pub use sources::{NumericApiResponseSource, WebPriceService};
