//! Oracle queries
//!
//! Every query variant declares its parameter schema once. The descriptor,
//! `query_data` and `query_id` are derived from that schema and the
//! parameter values alone.

pub mod abi;
pub mod ampleforth;
pub mod descriptor;
pub mod evm_balance;
pub mod gas_price_oracle;
pub mod legacy;
pub mod numeric_api_response;
pub mod price;
pub mod query;
pub mod snapshot;
pub mod string_query;

use alloy_primitives::{Address, B256, U256};
use serde::Serialize;

use crate::dtypes::{Value, ValueType};
use crate::errors::{QueryError, QueryResult};

pub use ampleforth::{AmpleforthCustomSpotPrice, AmpleforthUspce};
pub use evm_balance::EvmBalance;
pub use gas_price_oracle::GasPriceOracle;
pub use legacy::LegacyRequest;
pub use numeric_api_response::NumericApiResponse;
pub use price::{CustomPrice, DailyVolatility, SpotPrice, Twap};
pub use query::{query_type, query_types, Query, QueryType};
pub use snapshot::Snapshot;
pub use string_query::StringQuery;

/// One named, typed query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub abi_type: &'static str,
}

impl Param {
    pub const fn new(name: &'static str, abi_type: &'static str) -> Self {
        Self { name, abi_type }
    }
}

/// How a query variant derives its `query_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryEncoding {
    /// ABI encoding of the type name and parameters
    Abi,
    /// UTF-8 bytes of the descriptor
    Json,
}

/// A concrete query variant
pub trait QueryVariant: Sized {
    const TYPE_NAME: &'static str;
    const ENCODING: QueryEncoding;
    const PARAMS: &'static [Param];

    /// Parameter values in schema order
    fn param_values(&self) -> Vec<Value>;

    /// Rebuild the variant from parameter values in schema order
    fn from_params(params: &mut ParamReader) -> QueryResult<Self>;

    fn value_type(&self) -> ValueType;

    /// Replaces the hashed query id for variants that carry their own
    fn query_id_override(&self) -> Option<B256> {
        None
    }
}

/// Sequential typed access to decoded parameter values
pub struct ParamReader {
    params: &'static [Param],
    values: std::vec::IntoIter<Value>,
    index: usize,
}

impl ParamReader {
    pub fn new(params: &'static [Param], values: Vec<Value>) -> QueryResult<Self> {
        if values.len() != params.len() {
            return Err(QueryError::InvalidDescriptor(format!(
                "expected {} parameters, got {}",
                params.len(),
                values.len()
            )));
        }
        Ok(Self {
            params,
            values: values.into_iter(),
            index: 0,
        })
    }

    fn next(&mut self) -> QueryResult<(&'static str, Value)> {
        let name = self
            .params
            .get(self.index)
            .map(|p| p.name)
            .ok_or_else(|| QueryError::InvalidDescriptor("too few parameters".to_string()))?;
        let value = self.values.next().ok_or_else(|| QueryError::InvalidParameter {
            name: name.to_string(),
            reason: "missing".to_string(),
        })?;
        self.index += 1;
        Ok((name, value))
    }

    fn invalid(name: &str, expected: &str, value: &Value) -> QueryError {
        QueryError::InvalidParameter {
            name: name.to_string(),
            reason: format!("expected {}, got {}", expected, value.kind()),
        }
    }

    pub fn string(&mut self) -> QueryResult<String> {
        match self.next()? {
            (_, Value::String(s)) => Ok(s),
            (name, other) => Err(Self::invalid(name, "string", &other)),
        }
    }

    pub fn uint(&mut self) -> QueryResult<U256> {
        match self.next()? {
            (_, Value::Uint(u)) => Ok(u),
            (name, other) => Err(Self::invalid(name, "uint", &other)),
        }
    }

    pub fn u64(&mut self) -> QueryResult<u64> {
        match self.next()? {
            (name, Value::Uint(u)) => u64::try_from(u).map_err(|_| QueryError::InvalidParameter {
                name: name.to_string(),
                reason: format!("{} does not fit in 64 bits", u),
            }),
            (name, other) => Err(Self::invalid(name, "uint", &other)),
        }
    }

    pub fn address(&mut self) -> QueryResult<Address> {
        match self.next()? {
            (_, Value::Address(a)) => Ok(a),
            (name, other) => Err(Self::invalid(name, "address", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &[Param] = &[Param::new("asset", "string"), Param::new("timespan", "uint256")];

    #[test]
    fn test_param_reader_in_order() {
        let mut reader = ParamReader::new(PARAMS, vec![Value::from("eth"), Value::from(60u64)]).unwrap();
        assert_eq!(reader.string().unwrap(), "eth");
        assert_eq!(reader.u64().unwrap(), 60);
    }

    #[test]
    fn test_param_reader_type_errors() {
        let mut reader = ParamReader::new(PARAMS, vec![Value::from(1u64), Value::from(60u64)]).unwrap();
        match reader.string() {
            Err(QueryError::InvalidParameter { name, .. }) => assert_eq!(name, "asset"),
            other => panic!("unexpected {:?}", other),
        }

        assert!(ParamReader::new(PARAMS, vec![Value::from("eth")]).is_err());

        let mut reader = ParamReader::new(PARAMS, vec![Value::from("eth"), Value::Uint(U256::MAX)]).unwrap();
        reader.string().unwrap();
        assert!(reader.u64().is_err());
    }

    #[test]
    fn test_param_serializes_as_abi_entry() {
        let json = serde_json::to_string(PARAMS).unwrap();
        assert_eq!(json, r#"[{"name":"asset","type":"string"},{"name":"timespan","type":"uint256"}]"#);
    }
}
