//! Core types for oracle reporting
//!
//! This crate provides the pieces every reporter shares:
//! - ABI value types and their encoding
//! - Query variants, descriptors and query ids
//! - The query catalog
//! - Timestamped datapoints

pub mod catalog;
pub mod config;
pub mod datapoint;
pub mod dtypes;
pub mod errors;
pub mod queries;

pub use catalog::*;
pub use config::*;
pub use datapoint::*;
pub use dtypes::{AbiType, Value, ValueType};
pub use errors::*;
pub use queries::{Query, QueryEncoding, QueryVariant};
