//! Legacy requests
//!
//! Queries that predate structured query data. The query id is the numeric
//! request id itself.

use alloy_primitives::{B256, U256};

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::QueryResult;

/// Legacy ids answered with 18 decimals of precision
const HIGH_PRECISION_IDS: &[u64] = &[10, 41];

/// Legacy price/value request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyRequest {
    pub legacy_id: U256,
}

impl LegacyRequest {
    pub fn new(legacy_id: u64) -> Self {
        Self::from_id(U256::from(legacy_id))
    }

    /// Any id that fits in a 32 byte word
    pub fn from_id(legacy_id: U256) -> Self {
        Self { legacy_id }
    }
}

impl QueryVariant for LegacyRequest {
    const TYPE_NAME: &'static str = "LegacyRequest";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[Param::new("legacy_id", "uint256")];

    fn param_values(&self) -> Vec<Value> {
        vec![Value::from(self.legacy_id)]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        Ok(Self::from_id(params.uint()?))
    }

    fn value_type(&self) -> ValueType {
        if HIGH_PRECISION_IDS.iter().any(|id| self.legacy_id == U256::from(*id)) {
            ValueType::ufixed(256, 18)
        } else {
            ValueType::ufixed(256, 6)
        }
    }

    fn query_id_override(&self) -> Option<B256> {
        Some(B256::from(self.legacy_id))
    }
}
