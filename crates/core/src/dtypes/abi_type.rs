//! ABI type tags
//!
//! Parses Solidity ABI type strings such as `ufixed256x18`, `bool[]` or
//! `(int8,bytes,ufixed32x9,bool[])[2]` into a closed enum.

use alloy_dyn_abi::DynSolType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{EncodingError, EncodingResult};

/// Parsed ABI type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Uint(usize),
    Int(usize),
    /// Unsigned fixed point number, `bits` wide with `decimals` of precision
    UFixed { bits: usize, decimals: u32 },
    Fixed { bits: usize, decimals: u32 },
    Bool,
    Address,
    String,
    Bytes,
    FixedBytes(usize),
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    pub fn parse(s: &str) -> EncodingResult<Self> {
        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let mut parser = Parser { input: &s, pos: 0 };
        let ty = parser.parse_type()?;
        if parser.pos != s.len() {
            return Err(EncodingError::InvalidAbiType(s.clone()));
        }
        Ok(ty)
    }

    /// Width in bytes under packed encoding, `None` for dynamic types
    pub fn packed_width(&self) -> Option<usize> {
        match self {
            AbiType::Uint(bits)
            | AbiType::Int(bits)
            | AbiType::UFixed { bits, .. }
            | AbiType::Fixed { bits, .. } => Some(bits / 8),
            AbiType::Bool => Some(1),
            AbiType::Address => Some(20),
            AbiType::FixedBytes(n) => Some(*n),
            _ => None,
        }
    }

    /// Wire type used by the ABI codec. Fixed point numbers travel as
    /// integers of the same width.
    pub fn sol_type(&self) -> DynSolType {
        match self {
            AbiType::Uint(bits) | AbiType::UFixed { bits, .. } => DynSolType::Uint(*bits),
            AbiType::Int(bits) | AbiType::Fixed { bits, .. } => DynSolType::Int(*bits),
            AbiType::Bool => DynSolType::Bool,
            AbiType::Address => DynSolType::Address,
            AbiType::String => DynSolType::String,
            AbiType::Bytes => DynSolType::Bytes,
            AbiType::FixedBytes(n) => DynSolType::FixedBytes(*n),
            AbiType::Array(inner) => DynSolType::Array(Box::new(inner.sol_type())),
            AbiType::FixedArray(inner, len) => {
                DynSolType::FixedArray(Box::new(inner.sol_type()), *len)
            }
            AbiType::Tuple(types) => DynSolType::Tuple(types.iter().map(AbiType::sol_type).collect()),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Int(bits) => write!(f, "int{}", bits),
            AbiType::UFixed { bits, decimals } => write!(f, "ufixed{}x{}", bits, decimals),
            AbiType::Fixed { bits, decimals } => write!(f, "fixed{}x{}", bits, decimals),
            AbiType::Bool => write!(f, "bool"),
            AbiType::Address => write!(f, "address"),
            AbiType::String => write!(f, "string"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::FixedBytes(n) => write!(f, "bytes{}", n),
            AbiType::Array(inner) => write!(f, "{}[]", inner),
            AbiType::FixedArray(inner, len) => write!(f, "{}[{}]", inner, len),
            AbiType::Tuple(types) => {
                write!(f, "(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AbiType::parse(s)
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AbiType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AbiType::parse(&s).map_err(serde::de::Error::custom)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self) -> EncodingError {
        EncodingError::InvalidAbiType(self.input.to_string())
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, c: u8) -> EncodingResult<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn parse_type(&mut self) -> EncodingResult<AbiType> {
        let mut ty = if self.peek() == Some(b'(') {
            self.parse_tuple()?
        } else {
            self.parse_elementary()?
        };

        while self.peek() == Some(b'[') {
            self.pos += 1;
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits = &self.input[start..self.pos];
            self.expect(b']')?;
            ty = if digits.is_empty() {
                AbiType::Array(Box::new(ty))
            } else {
                let len: usize = digits.parse().map_err(|_| self.error())?;
                AbiType::FixedArray(Box::new(ty), len)
            };
        }

        Ok(ty)
    }

    fn parse_tuple(&mut self) -> EncodingResult<AbiType> {
        self.expect(b'(')?;
        let mut types = Vec::new();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(AbiType::Tuple(types));
        }
        loop {
            types.push(self.parse_type()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    return Ok(AbiType::Tuple(types));
                }
                _ => return Err(self.error()),
            }
        }
    }

    fn parse_elementary(&mut self) -> EncodingResult<AbiType> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let word = &self.input[start..self.pos];
        elementary(word).ok_or_else(|| self.error())
    }
}

fn int_bits(digits: &str) -> Option<usize> {
    if digits.is_empty() {
        return Some(256);
    }
    let bits: usize = digits.parse().ok()?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

fn fixed_dims(digits: &str) -> Option<(usize, u32)> {
    if digits.is_empty() {
        return Some((128, 18));
    }
    let (m, n) = digits.split_once('x')?;
    let bits = int_bits(m).filter(|_| !m.is_empty())?;
    let decimals: u32 = n.parse().ok()?;
    (decimals <= 80).then_some((bits, decimals))
}

fn elementary(word: &str) -> Option<AbiType> {
    match word {
        "bool" => return Some(AbiType::Bool),
        "address" => return Some(AbiType::Address),
        "string" => return Some(AbiType::String),
        "bytes" => return Some(AbiType::Bytes),
        _ => {}
    }

    if let Some(rest) = word.strip_prefix("ufixed") {
        let (bits, decimals) = fixed_dims(rest)?;
        Some(AbiType::UFixed { bits, decimals })
    } else if let Some(rest) = word.strip_prefix("fixed") {
        let (bits, decimals) = fixed_dims(rest)?;
        Some(AbiType::Fixed { bits, decimals })
    } else if let Some(rest) = word.strip_prefix("uint") {
        int_bits(rest).map(AbiType::Uint)
    } else if let Some(rest) = word.strip_prefix("int") {
        int_bits(rest).map(AbiType::Int)
    } else if let Some(rest) = word.strip_prefix("bytes") {
        let n: usize = rest.parse().ok()?;
        (1..=32).contains(&n).then_some(AbiType::FixedBytes(n))
    } else {
        None
    }
}
