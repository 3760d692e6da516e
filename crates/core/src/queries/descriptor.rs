//! Descriptor grammar
//!
//! A descriptor is compact JSON with `"type"` first and every parameter in
//! schema order, e.g. `{"type":"SpotPrice","asset":"btc","currency":"usd"}`.

use alloy_primitives::{hex, Address, I256, U256};
use serde_json::{Map, Value as Json};

use super::Param;
use crate::dtypes::{AbiType, Value};
use crate::errors::{QueryError, QueryResult};

fn to_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Uint(u) => match u64::try_from(*u) {
            Ok(small) => Json::from(small),
            Err(_) => Json::String(u.to_string()),
        },
        Value::Int(i) => match i64::try_from(*i) {
            Ok(small) => Json::from(small),
            Err(_) => Json::String(i.to_string()),
        },
        Value::Float(f) => Json::from(*f),
        Value::Address(a) => Json::String(hex::encode_prefixed(a)),
        Value::FixedBytes(b) | Value::Bytes(b) => Json::String(hex::encode_prefixed(b)),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) | Value::Tuple(items) => Json::Array(items.iter().map(to_json).collect()),
    }
}

/// Render a descriptor. Keys keep the order they are given in.
pub fn render(type_name: &str, params: &[Param], values: &[Value]) -> String {
    let mut out = String::from("{\"type\":");
    out.push_str(&Json::String(type_name.to_string()).to_string());
    for (param, value) in params.iter().zip(values) {
        out.push(',');
        out.push_str(&Json::String(param.name.to_string()).to_string());
        out.push(':');
        out.push_str(&to_json(value).to_string());
    }
    out.push('}');
    out
}

/// Parsed descriptor: the type name and the remaining fields
#[derive(Debug)]
pub struct ParsedDescriptor {
    pub type_name: String,
    fields: Map<String, Json>,
}

impl ParsedDescriptor {
    /// Parameter values in schema order
    pub fn values(&self, params: &[Param]) -> QueryResult<Vec<Value>> {
        params
            .iter()
            .map(|param| {
                let raw = self.fields.get(param.name).ok_or_else(|| QueryError::InvalidParameter {
                    name: param.name.to_string(),
                    reason: "missing".to_string(),
                })?;
                let ty = AbiType::parse(param.abi_type)?;
                from_json(&ty, raw).map_err(|reason| QueryError::InvalidParameter {
                    name: param.name.to_string(),
                    reason,
                })
            })
            .collect()
    }
}

pub fn parse(descriptor: &str) -> QueryResult<ParsedDescriptor> {
    let json: Json = serde_json::from_str(descriptor).map_err(|e| QueryError::InvalidDescriptor(e.to_string()))?;
    let Json::Object(mut fields) = json else {
        return Err(QueryError::InvalidDescriptor("descriptor is not a JSON object".to_string()));
    };
    let type_name = match fields.remove("type") {
        Some(Json::String(name)) => name,
        Some(_) => return Err(QueryError::InvalidDescriptor("type is not a string".to_string())),
        None => return Err(QueryError::InvalidDescriptor("missing type".to_string())),
    };
    Ok(ParsedDescriptor { type_name, fields })
}

fn parse_uint(raw: &Json) -> Result<U256, String> {
    match raw {
        Json::Number(n) => n.as_u64().map(U256::from).ok_or_else(|| format!("{} is not an unsigned integer", n)),
        Json::String(s) => s.parse::<U256>().map_err(|e| format!("{}: {}", s, e)),
        other => Err(format!("expected integer, got {}", other)),
    }
}

fn parse_int(raw: &Json) -> Result<I256, String> {
    match raw {
        Json::Number(n) => n
            .as_i64()
            .and_then(|i| I256::try_from(i).ok())
            .ok_or_else(|| format!("{} is not an integer", n)),
        Json::String(s) => s.parse::<I256>().map_err(|e| format!("{}: {}", s, e)),
        other => Err(format!("expected integer, got {}", other)),
    }
}

fn parse_hex(raw: &Json) -> Result<Vec<u8>, String> {
    let s = raw.as_str().ok_or_else(|| format!("expected hex string, got {}", raw))?;
    hex::decode(s).map_err(|e| format!("{}: {}", s, e))
}

fn from_json(ty: &AbiType, raw: &Json) -> Result<Value, String> {
    match ty {
        AbiType::Uint(_) => parse_uint(raw).map(Value::Uint),
        AbiType::Int(_) => parse_int(raw).map(Value::Int),
        AbiType::UFixed { .. } | AbiType::Fixed { .. } => raw
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| format!("expected number, got {}", raw)),
        AbiType::Bool => raw.as_bool().map(Value::Bool).ok_or_else(|| format!("expected bool, got {}", raw)),
        AbiType::Address => {
            let s = raw.as_str().ok_or_else(|| format!("expected address, got {}", raw))?;
            s.parse::<Address>().map(Value::Address).map_err(|e| format!("{}: {}", s, e))
        }
        AbiType::String => raw
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| format!("expected string, got {}", raw)),
        AbiType::Bytes => parse_hex(raw).map(Value::Bytes),
        AbiType::FixedBytes(_) => parse_hex(raw).map(Value::FixedBytes),
        AbiType::Array(inner) | AbiType::FixedArray(inner, _) => raw
            .as_array()
            .ok_or_else(|| format!("expected array, got {}", raw))?
            .iter()
            .map(|item| from_json(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AbiType::Tuple(types) => {
            let items = raw.as_array().ok_or_else(|| format!("expected array, got {}", raw))?;
            if items.len() != types.len() {
                return Err(format!("expected {} tuple members, got {}", types.len(), items.len()));
            }
            types
                .iter()
                .zip(items)
                .map(|(t, item)| from_json(t, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Tuple)
        }
    }
}
