//! Numeric API response query

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::QueryResult;

/// A numeric value read out of a JSON API response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericApiResponse {
    pub url: String,
    /// Comma separated keys and array indexes leading to the value
    pub parse_str: String,
}

impl NumericApiResponse {
    pub fn new(url: impl Into<String>, parse_str: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parse_str: parse_str.into(),
        }
    }
}

impl QueryVariant for NumericApiResponse {
    const TYPE_NAME: &'static str = "NumericApiResponse";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[Param::new("url", "string"), Param::new("parseStr", "string")];

    fn param_values(&self) -> Vec<Value> {
        vec![Value::from(self.url.as_str()), Value::from(self.parse_str.as_str())]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        let url = params.string()?;
        let parse_str = params.string()?;
        Ok(Self::new(url, parse_str))
    }

    fn value_type(&self) -> ValueType {
        ValueType::ufixed(256, 18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::Query;

    #[test]
    fn test_descriptor_uses_schema_names() {
        let q: Query = NumericApiResponse::new(
            "https://api.coingecko.com/api/v3/simple/price?ids=garlicoin&vs_currencies=usd",
            "garlicoin, usd",
        )
        .into();
        assert_eq!(
            q.descriptor(),
            r#"{"type":"NumericApiResponse","url":"https://api.coingecko.com/api/v3/simple/price?ids=garlicoin&vs_currencies=usd","parseStr":"garlicoin, usd"}"#
        );
    }
}
