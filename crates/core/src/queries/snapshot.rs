//! Snapshot proposal query

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::QueryResult;

/// Whether a Snapshot proposal passed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub proposal_id: String,
}

impl Snapshot {
    pub fn new(proposal_id: impl Into<String>) -> Self {
        Self {
            proposal_id: proposal_id.into(),
        }
    }
}

impl QueryVariant for Snapshot {
    const TYPE_NAME: &'static str = "Snapshot";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[Param::new("proposalId", "string")];

    fn param_values(&self) -> Vec<Value> {
        vec![Value::from(self.proposal_id.as_str())]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        Ok(Self::new(params.string()?))
    }

    fn value_type(&self) -> ValueType {
        ValueType::bool()
    }
}
