//! Gas price oracle query

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::QueryResult;

/// Gas price in gwei on a chain at a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GasPriceOracle {
    pub chain_id: u64,
    pub timestamp: u64,
}

impl GasPriceOracle {
    pub fn new(chain_id: u64, timestamp: u64) -> Self {
        Self { chain_id, timestamp }
    }
}

impl QueryVariant for GasPriceOracle {
    const TYPE_NAME: &'static str = "GasPriceOracle";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[Param::new("chainId", "uint256"), Param::new("timestamp", "uint256")];

    fn param_values(&self) -> Vec<Value> {
        vec![Value::from(self.chain_id), Value::from(self.timestamp)]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        let chain_id = params.u64()?;
        let timestamp = params.u64()?;
        Ok(Self::new(chain_id, timestamp))
    }

    fn value_type(&self) -> ValueType {
        ValueType::ufixed(256, 18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::Query;
    use alloy_primitives::hex;
    use pretty_assertions::assert_eq;

    const QUERY_DATA: &str = concat!(
        "0000000000000000000000000000000000000000000000000000000000000040",
        "0000000000000000000000000000000000000000000000000000000000000080",
        "000000000000000000000000000000000000000000000000000000000000000e",
        "47617350726963654f7261636c65000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000040",
        "0000000000000000000000000000000000000000000000000000000000000001",
        "0000000000000000000000000000000000000000000000000000000062616da8",
    );

    #[test]
    fn test_query_data_and_id() {
        let q: Query = GasPriceOracle::new(1, 1650552232).into();
        assert_eq!(
            q.descriptor(),
            r#"{"type":"GasPriceOracle","chainId":1,"timestamp":1650552232}"#
        );
        assert_eq!(hex::encode(q.query_data().unwrap()), QUERY_DATA);
        assert_eq!(
            hex::encode(q.query_id().unwrap()),
            "b52507ebdd1fb0aaaf645c01700ec11835f46a30f8391ec19e8e26b6c1d55f08"
        );
    }

    #[test]
    fn test_from_query_data() {
        let data = hex::decode(QUERY_DATA).unwrap();
        let q = Query::from_query_data(&data).unwrap();
        assert_eq!(q, Query::from(GasPriceOracle::new(1, 1650552232)));
    }

    #[test]
    fn test_value_round_trip() {
        let value_type = GasPriceOracle::new(1, 1650552232).value_type();
        let encoded = value_type.encode(&Value::Float(31.7)).unwrap();
        assert_eq!(value_type.decode(&encoded).unwrap(), Value::Float(31.7));
    }
}
