//! Dry-run reporting for oracle data feeds
//!
//! Prepares the query id, query data and encoded value a reporter would
//! submit, without sending any transaction.

pub mod config;
pub mod report;

pub use config::{FeedSettings, ReporterConfig};
pub use report::{prepare_submission, IntervalReporter, Submission};
