//! The closed set of query variants and their registry

use alloy_primitives::{keccak256, Bytes, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::{abi, descriptor, Param, ParamReader, QueryEncoding, QueryVariant};
use super::{
    AmpleforthCustomSpotPrice, AmpleforthUspce, CustomPrice, DailyVolatility, EvmBalance, GasPriceOracle,
    LegacyRequest, NumericApiResponse, Snapshot, SpotPrice, StringQuery, Twap,
};
use crate::dtypes::{Value, ValueType};
use crate::errors::{EncodingResult, QueryError, QueryResult};

/// Registry entry: everything needed to rebuild a variant by type name
pub struct QueryType {
    pub name: &'static str,
    pub encoding: QueryEncoding,
    pub params: &'static [Param],
    build: fn(Vec<Value>) -> QueryResult<Query>,
}

impl QueryType {
    pub fn build(&self, values: Vec<Value>) -> QueryResult<Query> {
        (self.build)(values)
    }
}

impl fmt::Debug for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryType")
            .field("name", &self.name)
            .field("encoding", &self.encoding)
            .field("params", &self.params)
            .finish()
    }
}

fn build<T>(values: Vec<Value>) -> QueryResult<Query>
where
    T: QueryVariant + Into<Query>,
{
    let mut reader = ParamReader::new(T::PARAMS, values)?;
    T::from_params(&mut reader).map(Into::into)
}

macro_rules! query_variants {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// An oracle query
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum Query {
            $($variant($ty),)*
        }

        $(
            impl From<$ty> for Query {
                fn from(q: $ty) -> Self {
                    Query::$variant(q)
                }
            }
        )*

        static QUERY_TYPES: &[QueryType] = &[
            $(QueryType {
                name: <$ty as QueryVariant>::TYPE_NAME,
                encoding: <$ty as QueryVariant>::ENCODING,
                params: <$ty as QueryVariant>::PARAMS,
                build: build::<$ty>,
            },)*
        ];

        impl Query {
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Query::$variant(_) => <$ty as QueryVariant>::TYPE_NAME,)*
                }
            }

            pub fn encoding(&self) -> QueryEncoding {
                match self {
                    $(Query::$variant(_) => <$ty as QueryVariant>::ENCODING,)*
                }
            }

            /// Parameter schema in declaration order
            pub fn params(&self) -> &'static [Param] {
                match self {
                    $(Query::$variant(_) => <$ty as QueryVariant>::PARAMS,)*
                }
            }

            pub fn param_values(&self) -> Vec<Value> {
                match self {
                    $(Query::$variant(q) => q.param_values(),)*
                }
            }

            /// Encoding contract for the value answering this query
            pub fn value_type(&self) -> ValueType {
                match self {
                    $(Query::$variant(q) => q.value_type(),)*
                }
            }

            fn query_id_override(&self) -> Option<B256> {
                match self {
                    $(Query::$variant(q) => q.query_id_override(),)*
                }
            }
        }
    };
}

query_variants! {
    SpotPrice(SpotPrice),
    Twap(Twap),
    CustomPrice(CustomPrice),
    DailyVolatility(DailyVolatility),
    GasPriceOracle(GasPriceOracle),
    NumericApiResponse(NumericApiResponse),
    StringQuery(StringQuery),
    Snapshot(Snapshot),
    EvmBalance(EvmBalance),
    LegacyRequest(LegacyRequest),
    AmpleforthCustomSpotPrice(AmpleforthCustomSpotPrice),
    AmpleforthUspce(AmpleforthUspce),
}

/// All registered query types
pub fn query_types() -> &'static [QueryType] {
    QUERY_TYPES
}

/// Look up a query type by its exact name
pub fn query_type(name: &str) -> QueryResult<&'static QueryType> {
    QUERY_TYPES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| QueryError::UnsupportedQueryType(name.to_string()))
}

impl Query {
    /// Canonical JSON form of the query
    pub fn descriptor(&self) -> String {
        descriptor::render(self.type_name(), self.params(), &self.param_values())
    }

    /// Bytes identifying the query on chain
    pub fn query_data(&self) -> EncodingResult<Bytes> {
        match self.encoding() {
            QueryEncoding::Abi => {
                let params = abi::encode_params(self.params(), self.param_values())?;
                Ok(abi::encode_envelope(self.type_name(), params))
            }
            QueryEncoding::Json => Ok(Bytes::from(self.descriptor().into_bytes())),
        }
    }

    /// keccak256 of `query_data`, unless the variant carries its own id
    pub fn query_id(&self) -> EncodingResult<B256> {
        if let Some(id) = self.query_id_override() {
            return Ok(id);
        }
        Ok(keccak256(self.query_data()?))
    }

    /// Rebuild a query from its descriptor
    pub fn from_descriptor(descriptor: &str) -> QueryResult<Self> {
        let parsed = descriptor::parse(descriptor)?;
        let query_type = query_type(&parsed.type_name)?;
        let values = parsed.values(query_type.params)?;
        query_type.build(values)
    }

    /// Rebuild a query from `query_data`
    pub fn from_query_data(query_data: &[u8]) -> QueryResult<Self> {
        match abi::decode_envelope(query_data) {
            Ok((type_name, encoded_params)) => {
                let query_type = query_type(&type_name)?;
                if query_type.encoding != QueryEncoding::Abi {
                    return Err(QueryError::UnsupportedQueryType(type_name));
                }
                let values = abi::decode_params(query_type.params, &encoded_params)?;
                query_type.build(values)
            }
            Err(abi_error) => match std::str::from_utf8(query_data) {
                Ok(text) if text.trim_start().starts_with('{') => {
                    debug!("Query data is not ABI encoded, parsing as descriptor");
                    let query = Self::from_descriptor(text)?;
                    if query.encoding() != QueryEncoding::Json {
                        return Err(QueryError::UnsupportedQueryType(query.type_name().to_string()));
                    }
                    Ok(query)
                }
                _ => Err(abi_error.into()),
            },
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Query::from_descriptor(s)
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.descriptor())
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Query::from_descriptor(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EncodingError;
    use alloy_primitives::hex;
    use proptest::prelude::*;

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<_> = query_types().iter().map(|t| t.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_unknown_type_name() {
        assert!(matches!(
            Query::from_descriptor(r#"{"type":"NotAQuery","x":1}"#),
            Err(QueryError::UnsupportedQueryType(name)) if name == "NotAQuery"
        ));

        let data = abi::encode_envelope("NotAQuery", abi::phantom_params());
        assert!(matches!(
            Query::from_query_data(&data),
            Err(QueryError::UnsupportedQueryType(_))
        ));
    }

    #[test]
    fn test_malformed_query_data() {
        assert!(matches!(
            Query::from_query_data(&[0xde, 0xad, 0xbe, 0xef]),
            Err(QueryError::Encoding(EncodingError::Abi(_)))
        ));

        // Valid envelope with truncated parameters
        let data = abi::encode_envelope("GasPriceOracle", vec![0u8; 40]);
        assert!(matches!(Query::from_query_data(&data), Err(QueryError::Encoding(_))));
    }

    #[test]
    fn test_every_type_round_trips() {
        let queries: Vec<Query> = vec![
            SpotPrice::new("ETH", "USD").unwrap().into(),
            Twap::new("btc", "usd", 86400).unwrap().into(),
            CustomPrice::new("landx", "corn", "usd", "per_kilogram").into(),
            DailyVolatility::new("eth", "usd", 30).into(),
            GasPriceOracle::new(1, 1656633600).into(),
            NumericApiResponse::new("https://example.com/api", "data, price").into(),
            StringQuery::new("Where is the Atlantic ocean?").into(),
            Snapshot::new("cce9760adea906176940ae5fd05bc007cc9252b524832065800635484cb5cb57").into(),
            EvmBalance::new(1, alloy_primitives::Address::ZERO, 1706302197).into(),
            LegacyRequest::new(41).into(),
            AmpleforthCustomSpotPrice.into(),
            AmpleforthUspce.into(),
        ];
        assert_eq!(queries.len(), query_types().len());

        for query in queries {
            let descriptor = query.descriptor();
            assert_eq!(Query::from_descriptor(&descriptor).unwrap(), query, "{}", descriptor);

            let data = query.query_data().unwrap();
            assert_eq!(Query::from_query_data(&data).unwrap(), query, "{}", hex::encode(&data));

            let parsed: Query = descriptor.parse().unwrap();
            assert_eq!(parsed.to_string(), descriptor);
        }
    }

    #[test]
    fn test_serde_as_descriptor() {
        let query: Query = SpotPrice::new("btc", "usd").unwrap().into();
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(json, r#""{\"type\":\"SpotPrice\",\"asset\":\"btc\",\"currency\":\"usd\"}""#);
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }

    proptest! {
        #[test]
        fn prop_string_query_is_deterministic(text in ".*") {
            let a: Query = StringQuery::new(text.clone()).into();
            let b: Query = StringQuery::new(text).into();
            prop_assert_eq!(a.query_data().unwrap(), b.query_data().unwrap());
            prop_assert_eq!(a.query_id().unwrap(), b.query_id().unwrap());
            prop_assert_eq!(Query::from_query_data(&a.query_data().unwrap()).unwrap(), a.clone());
            prop_assert_eq!(Query::from_descriptor(&a.descriptor()).unwrap(), a);
        }

        #[test]
        fn prop_gas_price_oracle_round_trip(chain_id in any::<u64>(), timestamp in any::<u64>()) {
            let query: Query = GasPriceOracle::new(chain_id, timestamp).into();
            let data = query.query_data().unwrap();
            prop_assert_eq!(query.query_id().unwrap(), keccak256(&data));
            prop_assert_eq!(Query::from_query_data(&data).unwrap(), query);
        }
    }
}
