//! Ampleforth text queries
//!
//! These take no parameters and are identified by their descriptor bytes.

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::QueryResult;

/// AMPL/USD volume weighted average price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AmpleforthCustomSpotPrice;

impl QueryVariant for AmpleforthCustomSpotPrice {
    const TYPE_NAME: &'static str = "AmpleforthCustomSpotPrice";
    const ENCODING: QueryEncoding = QueryEncoding::Json;
    const PARAMS: &'static [Param] = &[];

    fn param_values(&self) -> Vec<Value> {
        Vec::new()
    }

    fn from_params(_params: &mut ParamReader) -> QueryResult<Self> {
        Ok(Self)
    }

    fn value_type(&self) -> ValueType {
        ValueType::ufixed(256, 18)
    }
}

/// US personal consumption expenditures price index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AmpleforthUspce;

impl QueryVariant for AmpleforthUspce {
    const TYPE_NAME: &'static str = "AmpleforthUSPCE";
    const ENCODING: QueryEncoding = QueryEncoding::Json;
    const PARAMS: &'static [Param] = &[];

    fn param_values(&self) -> Vec<Value> {
        Vec::new()
    }

    fn from_params(_params: &mut ParamReader) -> QueryResult<Self> {
        Ok(Self)
    }

    fn value_type(&self) -> ValueType {
        ValueType::ufixed(256, 18)
    }
}
