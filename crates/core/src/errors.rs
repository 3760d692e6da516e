//! Error types

use thiserror::Error;

/// Value and ABI encoding errors
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Invalid ABI type: {0}")]
    InvalidAbiType(String),

    #[error("Negative value {value} cannot be encoded as {abi_type}")]
    NegativeValue { value: String, abi_type: String },

    #[error("Value {value} does not fit in {abi_type}")]
    Overflow { value: String, abi_type: String },

    #[error("Non-finite value {0} cannot be encoded")]
    NonFinite(f64),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Length mismatch for {abi_type}: expected {expected}, got {actual}")]
    LengthMismatch {
        abi_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("ABI decoding failed: {0}")]
    Abi(String),

    #[error("Packed decoding not supported for {0}")]
    PackedUnsupported(String),
}

/// Query construction and reconstruction errors
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unsupported query type: {0}")]
    UnsupportedQueryType(String),

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Currency {0} not supported")]
    UnsupportedCurrency(String),

    #[error("{asset}/{currency} is not a supported pair")]
    UnsupportedPair { asset: String, currency: String },

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
}

/// Query catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Error adding query entry: {0} already exists")]
    DuplicateTag(String),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Export failed: {0}")]
    Export(String),
}

/// Data source errors
///
/// Sources convert these into an empty datapoint before returning, so they
/// never reach callers of `fetch_new_datapoint`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timeout waiting for data")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rejected reading: {0}")]
    Rejected(String),
}

impl From<EncodingError> for CatalogError {
    fn from(e: EncodingError) -> Self {
        CatalogError::Query(QueryError::Encoding(e))
    }
}

/// Result type alias
pub type EncodingResult<T> = Result<T, EncodingError>;
pub type QueryResult<T> = Result<T, QueryError>;
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type SourceResult<T> = Result<T, SourceError>;
