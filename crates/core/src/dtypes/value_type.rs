//! Value types
//!
//! A [`ValueType`] describes how the value answering a query is encoded
//! before submission, and how submitted bytes decode back into a value.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::abi_type::AbiType;
use super::fixed;
use super::value::Value;
use crate::errors::{EncodingError, EncodingResult};

/// Encoding contract for a submitted value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueType {
    pub abi_type: AbiType,
    /// True if the value uses packed bytes format
    #[serde(default)]
    pub packed: bool,
}

impl ValueType {
    pub fn new(abi_type: AbiType, packed: bool) -> Self {
        Self { abi_type, packed }
    }

    /// Parse an ABI type string into an unpacked value type
    pub fn parse(abi_type: &str) -> EncodingResult<Self> {
        Ok(Self::new(AbiType::parse(abi_type)?, false))
    }

    /// Unsigned fixed point value, the type used by price queries
    pub fn ufixed(bits: usize, decimals: u32) -> Self {
        Self::new(AbiType::UFixed { bits, decimals }, false)
    }

    pub fn bool() -> Self {
        Self::new(AbiType::Bool, false)
    }

    pub fn string() -> Self {
        Self::new(AbiType::String, false)
    }

    pub fn bytes() -> Self {
        Self::new(AbiType::Bytes, false)
    }

    pub fn uint256() -> Self {
        Self::new(AbiType::Uint(256), false)
    }

    pub fn with_packed(mut self, packed: bool) -> Self {
        self.packed = packed;
        self
    }

    /// Decimals of precision for fixed point types
    pub fn decimals(&self) -> Option<u32> {
        match self.abi_type {
            AbiType::UFixed { decimals, .. } | AbiType::Fixed { decimals, .. } => Some(decimals),
            _ => None,
        }
    }

    /// Encode a value per the ABI type
    pub fn encode(&self, value: &Value) -> EncodingResult<Vec<u8>> {
        let sol_value = to_sol_value(&self.abi_type, value)?;
        if self.packed {
            Ok(sol_value.abi_encode_packed())
        } else {
            Ok(sol_value.abi_encode_params())
        }
    }

    /// Decode bytes into a value per the ABI type
    pub fn decode(&self, bytes: &[u8]) -> EncodingResult<Value> {
        if self.packed {
            return decode_packed(&self.abi_type, bytes);
        }

        let sol_value = self
            .abi_type
            .sol_type()
            .abi_decode_params(bytes)
            .map_err(|e| EncodingError::Abi(e.to_string()))?;
        from_sol_value(&self.abi_type, sol_value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.packed {
            write!(f, "{} (packed)", self.abi_type)
        } else {
            write!(f, "{}", self.abi_type)
        }
    }
}

fn mismatch(ty: &AbiType, value: &Value) -> EncodingError {
    EncodingError::TypeMismatch {
        expected: ty.to_string(),
        actual: value.kind().to_string(),
    }
}

fn check_len(ty: &AbiType, expected: usize, actual: usize) -> EncodingResult<()> {
    if expected != actual {
        return Err(EncodingError::LengthMismatch {
            abi_type: ty.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_uint_width(ty: &AbiType, value: U256, bits: usize) -> EncodingResult<()> {
    if value.bit_len() > bits {
        return Err(EncodingError::Overflow {
            value: value.to_string(),
            abi_type: ty.to_string(),
        });
    }
    Ok(())
}

fn check_int_width(ty: &AbiType, value: I256, bits: usize) -> EncodingResult<()> {
    let (sign, abs) = value.into_sign_and_abs();
    // Two's complement range is [-2^(bits-1), 2^(bits-1) - 1]
    let limit = U256::from(1u64) << (bits - 1);
    let fits = if sign.is_negative() { abs <= limit } else { abs < limit };
    if !fits {
        return Err(EncodingError::Overflow {
            value: value.to_string(),
            abi_type: ty.to_string(),
        });
    }
    Ok(())
}

fn to_sol_value(ty: &AbiType, value: &Value) -> EncodingResult<DynSolValue> {
    let tag = ty.to_string();
    match (ty, value) {
        (AbiType::Uint(bits), Value::Uint(u)) => {
            check_uint_width(ty, *u, *bits)?;
            Ok(DynSolValue::Uint(*u, *bits))
        }
        (AbiType::Uint(bits), Value::Int(i)) => {
            if i.is_negative() {
                return Err(EncodingError::NegativeValue {
                    value: i.to_string(),
                    abi_type: tag,
                });
            }
            let u = i.into_raw();
            check_uint_width(ty, u, *bits)?;
            Ok(DynSolValue::Uint(u, *bits))
        }
        (AbiType::Int(bits), Value::Int(i)) => {
            check_int_width(ty, *i, *bits)?;
            Ok(DynSolValue::Int(*i, *bits))
        }
        (AbiType::Int(bits), Value::Uint(u)) => {
            let i = I256::try_from(*u).map_err(|_| EncodingError::Overflow {
                value: u.to_string(),
                abi_type: tag,
            })?;
            check_int_width(ty, i, *bits)?;
            Ok(DynSolValue::Int(i, *bits))
        }
        (AbiType::UFixed { bits, decimals }, Value::Float(f)) => {
            let raw = fixed::float_to_unsigned(*f, *bits, *decimals, &tag)?;
            Ok(DynSolValue::Uint(raw, *bits))
        }
        (AbiType::UFixed { bits, decimals }, Value::Uint(u)) => {
            let raw = fixed::whole_to_unsigned(*u, *bits, *decimals, &tag)?;
            Ok(DynSolValue::Uint(raw, *bits))
        }
        (AbiType::UFixed { .. }, Value::Int(i)) if i.is_negative() => Err(EncodingError::NegativeValue {
            value: i.to_string(),
            abi_type: tag,
        }),
        (AbiType::Fixed { bits, decimals }, Value::Float(f)) => {
            let raw = fixed::float_to_signed(*f, *bits, *decimals, &tag)?;
            Ok(DynSolValue::Int(raw, *bits))
        }
        (AbiType::Bool, Value::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (AbiType::Address, Value::Address(a)) => Ok(DynSolValue::Address(*a)),
        (AbiType::String, Value::String(s)) => Ok(DynSolValue::String(s.clone())),
        (AbiType::Bytes, Value::Bytes(b) | Value::FixedBytes(b)) => Ok(DynSolValue::Bytes(b.clone())),
        (AbiType::FixedBytes(size), Value::FixedBytes(b) | Value::Bytes(b)) => {
            if b.len() > *size {
                return Err(EncodingError::LengthMismatch {
                    abi_type: tag,
                    expected: *size,
                    actual: b.len(),
                });
            }
            let mut word = B256::ZERO;
            word[..b.len()].copy_from_slice(b);
            Ok(DynSolValue::FixedBytes(word, *size))
        }
        (AbiType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| to_sol_value(inner, item))
            .collect::<EncodingResult<Vec<_>>>()
            .map(DynSolValue::Array),
        (AbiType::FixedArray(inner, len), Value::Array(items)) => {
            check_len(ty, *len, items.len())?;
            items
                .iter()
                .map(|item| to_sol_value(inner, item))
                .collect::<EncodingResult<Vec<_>>>()
                .map(DynSolValue::FixedArray)
        }
        (AbiType::Tuple(types), Value::Tuple(items)) => {
            check_len(ty, types.len(), items.len())?;
            types
                .iter()
                .zip(items)
                .map(|(t, item)| to_sol_value(t, item))
                .collect::<EncodingResult<Vec<_>>>()
                .map(DynSolValue::Tuple)
        }
        _ => Err(mismatch(ty, value)),
    }
}

fn from_sol_value(ty: &AbiType, value: DynSolValue) -> EncodingResult<Value> {
    let unexpected = || EncodingError::Abi(format!("unexpected decoded value for {}", ty));
    match (ty, value) {
        (AbiType::Uint(_), DynSolValue::Uint(u, _)) => Ok(Value::Uint(u)),
        (AbiType::Int(_), DynSolValue::Int(i, _)) => Ok(Value::Int(i)),
        (AbiType::UFixed { decimals, .. }, DynSolValue::Uint(u, _)) => {
            Ok(Value::Float(fixed::unsigned_to_float(u, *decimals)))
        }
        (AbiType::Fixed { decimals, .. }, DynSolValue::Int(i, _)) => {
            Ok(Value::Float(fixed::signed_to_float(i, *decimals)))
        }
        (AbiType::Bool, DynSolValue::Bool(b)) => Ok(Value::Bool(b)),
        (AbiType::Address, DynSolValue::Address(a)) => Ok(Value::Address(a)),
        (AbiType::String, DynSolValue::String(s)) => Ok(Value::String(s)),
        (AbiType::Bytes, DynSolValue::Bytes(b)) => Ok(Value::Bytes(b)),
        (AbiType::FixedBytes(size), DynSolValue::FixedBytes(word, _)) => Ok(Value::FixedBytes(word[..*size].to_vec())),
        (AbiType::Array(inner), DynSolValue::Array(items))
        | (AbiType::FixedArray(inner, _), DynSolValue::FixedArray(items)) => items
            .into_iter()
            .map(|item| from_sol_value(inner, item))
            .collect::<EncodingResult<Vec<_>>>()
            .map(Value::Array),
        (AbiType::Tuple(types), DynSolValue::Tuple(items)) => {
            check_len(ty, types.len(), items.len())?;
            types
                .iter()
                .zip(items)
                .map(|(t, item)| from_sol_value(t, item))
                .collect::<EncodingResult<Vec<_>>>()
                .map(Value::Tuple)
        }
        _ => Err(unexpected()),
    }
}

/// Packed encodings are not self-describing, so only fixed width members
/// and a trailing dynamic member can be recovered.
fn decode_packed(ty: &AbiType, bytes: &[u8]) -> EncodingResult<Value> {
    match ty {
        AbiType::String => String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| EncodingError::Abi(e.to_string())),
        AbiType::Bytes => Ok(Value::Bytes(bytes.to_vec())),
        AbiType::Tuple(types) => {
            let mut offset = 0;
            let mut items = Vec::with_capacity(types.len());
            for (i, member) in types.iter().enumerate() {
                let is_last = i + 1 == types.len();
                let width = match member.packed_width() {
                    Some(width) => width,
                    None if is_last && matches!(member, AbiType::String | AbiType::Bytes) => {
                        bytes.len().saturating_sub(offset)
                    }
                    None => return Err(EncodingError::PackedUnsupported(ty.to_string())),
                };
                if offset + width > bytes.len() {
                    return Err(EncodingError::LengthMismatch {
                        abi_type: ty.to_string(),
                        expected: offset + width,
                        actual: bytes.len(),
                    });
                }
                items.push(decode_packed(member, &bytes[offset..offset + width])?);
                offset += width;
            }
            check_len(ty, offset, bytes.len())?;
            Ok(Value::Tuple(items))
        }
        scalar => {
            let width = scalar
                .packed_width()
                .ok_or_else(|| EncodingError::PackedUnsupported(scalar.to_string()))?;
            check_len(scalar, width, bytes.len())?;
            decode_packed_scalar(scalar, bytes)
        }
    }
}

fn decode_packed_scalar(ty: &AbiType, bytes: &[u8]) -> EncodingResult<Value> {
    match ty {
        AbiType::Uint(_) => Ok(Value::Uint(U256::from_be_slice(bytes))),
        AbiType::UFixed { decimals, .. } => Ok(Value::Float(fixed::unsigned_to_float(
            U256::from_be_slice(bytes),
            *decimals,
        ))),
        AbiType::Int(bits) => Ok(Value::Int(sign_extend(bytes, *bits))),
        AbiType::Fixed { bits, decimals } => Ok(Value::Float(fixed::signed_to_float(
            sign_extend(bytes, *bits),
            *decimals,
        ))),
        AbiType::Bool => match bytes[0] {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            other => Err(EncodingError::Abi(format!("invalid bool byte {}", other))),
        },
        AbiType::Address => Ok(Value::Address(Address::from_slice(bytes))),
        AbiType::FixedBytes(_) => Ok(Value::FixedBytes(bytes.to_vec())),
        other => Err(EncodingError::PackedUnsupported(other.to_string())),
    }
}

fn sign_extend(bytes: &[u8], bits: usize) -> I256 {
    let negative = bytes.first().map_or(false, |b| b & 0x80 != 0);
    let mut word = if negative { [0xffu8; 32] } else { [0u8; 32] };
    word[32 - bits / 8..].copy_from_slice(bytes);
    I256::from_be_bytes(word)
}
