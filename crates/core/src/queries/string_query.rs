//! Free text query

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::QueryResult;

/// A question posed as arbitrary text, answered with text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringQuery {
    pub text: String,
}

impl StringQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl QueryVariant for StringQuery {
    const TYPE_NAME: &'static str = "StringQuery";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[Param::new("text", "string")];

    fn param_values(&self) -> Vec<Value> {
        vec![Value::from(self.text.as_str())]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        Ok(Self::new(params.string()?))
    }

    fn value_type(&self) -> ValueType {
        ValueType::string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::Query;

    #[test]
    fn test_answer_round_trip() {
        let q: Query = StringQuery::new("Where is the Atlantic ocean?").into();
        let value_type = q.value_type();
        let answer = Value::from("Between the Americas, Europe and Africa");
        let encoded = value_type.encode(&answer).unwrap();
        assert_eq!(value_type.decode(&encoded).unwrap(), answer);
    }

    #[test]
    fn test_non_ascii_text() {
        let q: Query = StringQuery::new("¿Dónde está?").into();
        assert_eq!(Query::from_descriptor(&q.descriptor()).unwrap(), q);
        assert_eq!(Query::from_query_data(&q.query_data().unwrap()).unwrap(), q);
    }
}
