//! ABI query envelope
//!
//! `query_data` for structured queries is `abi.encode(string, bytes)` of the
//! type name and the ABI encoding of the parameters.

use alloy_primitives::Bytes;
use alloy_sol_types::SolValue;

use super::Param;
use crate::dtypes::{AbiType, Value, ValueType};
use crate::errors::{EncodingError, EncodingResult};

/// Parameter bytes of a structured query without parameters: the encoding
/// of a single empty `bytes` value.
pub fn phantom_params() -> Vec<u8> {
    let mut encoded = vec![0u8; 64];
    encoded[31] = 0x20;
    encoded
}

fn params_type(params: &[Param]) -> EncodingResult<ValueType> {
    let types = params
        .iter()
        .map(|p| AbiType::parse(p.abi_type))
        .collect::<EncodingResult<Vec<_>>>()?;
    Ok(ValueType::new(AbiType::Tuple(types), false))
}

/// ABI encode parameter values in schema order
pub fn encode_params(params: &[Param], values: Vec<Value>) -> EncodingResult<Vec<u8>> {
    if params.is_empty() {
        return Ok(phantom_params());
    }
    params_type(params)?.encode(&Value::Tuple(values))
}

/// Decode parameter bytes into values in schema order
pub fn decode_params(params: &[Param], encoded: &[u8]) -> EncodingResult<Vec<Value>> {
    if params.is_empty() {
        return Ok(Vec::new());
    }
    match params_type(params)?.decode(encoded)? {
        Value::Tuple(values) => Ok(values),
        other => Err(EncodingError::TypeMismatch {
            expected: "tuple".to_string(),
            actual: other.kind().to_string(),
        }),
    }
}

pub fn encode_envelope(type_name: &str, encoded_params: Vec<u8>) -> Bytes {
    let envelope = (type_name.to_string(), Bytes::from(encoded_params));
    Bytes::from(envelope.abi_encode_params())
}

/// Split `query_data` into the type name and the encoded parameters
pub fn decode_envelope(query_data: &[u8]) -> EncodingResult<(String, Bytes)> {
    <(String, Bytes)>::abi_decode_params(query_data, true).map_err(|e| EncodingError::Abi(e.to_string()))
}
