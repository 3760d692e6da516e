//! Fixed point conversions
//!
//! Floats are converted from their exact binary value and rounded half to
//! even at the requested number of decimals.

use alloy_primitives::{Sign, I256, U256, U512};

use crate::errors::{EncodingError, EncodingResult};

const MANTISSA_BITS: u32 = 52;

/// Scale `|value|` by `10^decimals`, rounding half to even.
/// Returns `None` when the result does not fit in 512 bits.
fn scale_magnitude(value: f64, decimals: u32) -> Option<U512> {
    let bits = value.abs().to_bits();
    let exp_bits = ((bits >> MANTISSA_BITS) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << MANTISSA_BITS) - 1);

    // value = mantissa * 2^exp
    let (mantissa, exp) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << MANTISSA_BITS), exp_bits - 1075)
    };

    if mantissa == 0 {
        return Some(U512::ZERO);
    }

    let scale = U512::from(10u64).checked_pow(U512::from(decimals))?;
    let num = U512::from(mantissa).checked_mul(scale)?;

    if exp >= 0 {
        let shift = exp as usize;
        if num.bit_len() + shift > 512 {
            return None;
        }
        return Some(num << shift);
    }

    let shift = (-exp) as usize;
    if shift > num.bit_len() {
        // Below half of one unit
        return Some(U512::ZERO);
    }

    let quotient = num >> shift;
    let remainder = num - (quotient << shift);
    let half = U512::from(1u64) << (shift - 1);

    if remainder > half || (remainder == half && quotient.bit(0)) {
        Some(quotient + U512::from(1u64))
    } else {
        Some(quotient)
    }
}

fn narrow(scaled: U512, bits: usize, value: f64, abi_type: &str) -> EncodingResult<U256> {
    if scaled.bit_len() > bits {
        return Err(EncodingError::Overflow {
            value: value.to_string(),
            abi_type: abi_type.to_string(),
        });
    }
    Ok(U256::from_limbs_slice(&scaled.as_limbs()[..4]))
}

/// Encode a non-negative float as an unsigned integer scaled by `10^decimals`
pub fn float_to_unsigned(value: f64, bits: usize, decimals: u32, abi_type: &str) -> EncodingResult<U256> {
    if !value.is_finite() {
        return Err(EncodingError::NonFinite(value));
    }
    if value < 0.0 {
        return Err(EncodingError::NegativeValue {
            value: value.to_string(),
            abi_type: abi_type.to_string(),
        });
    }

    let scaled = scale_magnitude(value, decimals).ok_or_else(|| EncodingError::Overflow {
        value: value.to_string(),
        abi_type: abi_type.to_string(),
    })?;
    narrow(scaled, bits, value, abi_type)
}

/// Encode a float as a signed integer scaled by `10^decimals`
pub fn float_to_signed(value: f64, bits: usize, decimals: u32, abi_type: &str) -> EncodingResult<I256> {
    if !value.is_finite() {
        return Err(EncodingError::NonFinite(value));
    }

    let overflow = || EncodingError::Overflow {
        value: value.to_string(),
        abi_type: abi_type.to_string(),
    };

    let scaled = scale_magnitude(value, decimals).ok_or_else(overflow)?;
    // One bit is reserved for the sign
    let abs = narrow(scaled, bits - 1, value, abi_type)?;
    let sign = if value < 0.0 { Sign::Negative } else { Sign::Positive };
    I256::checked_from_sign_and_abs(sign, abs).ok_or_else(overflow)
}

/// Scale a whole number by `10^decimals`
pub fn whole_to_unsigned(value: U256, bits: usize, decimals: u32, abi_type: &str) -> EncodingResult<U256> {
    let overflow = || EncodingError::Overflow {
        value: value.to_string(),
        abi_type: abi_type.to_string(),
    };

    let scaled = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .and_then(|scale| value.checked_mul(scale))
        .ok_or_else(overflow)?;
    if scaled.bit_len() > bits {
        return Err(overflow());
    }
    Ok(scaled)
}

/// Convert a scaled unsigned integer back to a float
pub fn unsigned_to_float(raw: U256, decimals: u32) -> f64 {
    let as_float: f64 = raw.to_string().parse().unwrap_or(f64::NAN);
    as_float / 10f64.powi(decimals as i32)
}

/// Convert a scaled signed integer back to a float
pub fn signed_to_float(raw: I256, decimals: u32) -> f64 {
    let (sign, abs) = raw.into_sign_and_abs();
    let magnitude = unsigned_to_float(abs, decimals);
    if sign.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_exact_values() {
        assert_eq!(float_to_unsigned(1.0, 256, 9, "ufixed256x9").unwrap(), U256::from(1_000_000_000u64));
        assert_eq!(float_to_unsigned(0.0, 256, 18, "ufixed256x18").unwrap(), U256::ZERO);
        assert_eq!(
            float_to_unsigned(12000.0, 256, 18, "ufixed256x18").unwrap(),
            U256::from(12_000u64) * U256::from(10u64).pow(U256::from(18u64))
        );
    }

    #[test]
    fn test_rounds_to_declared_precision() {
        // 99.0000009 quantizes to 99.000001 at six decimals
        assert_eq!(float_to_unsigned(99.0000009, 64, 6, "ufixed64x6").unwrap(), U256::from(99_000_001u64));
        // 0.5 and 2.5 are exact in binary and round to even
        assert_eq!(float_to_unsigned(0.5, 256, 0, "ufixed256x0").unwrap(), U256::ZERO);
        assert_eq!(float_to_unsigned(2.5, 256, 0, "ufixed256x0").unwrap(), U256::from(2u64));
        assert_eq!(float_to_unsigned(3.5, 256, 0, "ufixed256x0").unwrap(), U256::from(4u64));
    }

    #[test]
    fn test_rejects_out_of_domain() {
        assert!(matches!(
            float_to_unsigned(-1.0, 256, 18, "ufixed256x18"),
            Err(EncodingError::NegativeValue { .. })
        ));
        assert!(matches!(
            float_to_unsigned(f64::NAN, 256, 18, "ufixed256x18"),
            Err(EncodingError::NonFinite(_))
        ));
        // 2^64 / 10^6 does not fit in 64 bits once scaled
        assert!(matches!(
            float_to_unsigned(1.0e14, 64, 6, "ufixed64x6"),
            Err(EncodingError::Overflow { .. })
        ));
        assert!(matches!(
            float_to_unsigned(1.0e300, 256, 18, "ufixed256x18"),
            Err(EncodingError::Overflow { .. })
        ));
    }

    #[test]
    fn test_signed_round_trip() {
        let raw = float_to_signed(-12.5, 128, 18, "fixed128x18").unwrap();
        assert!(raw.is_negative());
        assert_eq!(signed_to_float(raw, 18), -12.5);
    }

    #[test]
    fn test_unsigned_to_float() {
        assert_eq!(unsigned_to_float(U256::from(99_000_001u64), 6), 99.000001);
        let raw = float_to_unsigned(31.7, 256, 18, "ufixed256x18").unwrap();
        assert_eq!(unsigned_to_float(raw, 18), 31.7);
    }

    #[test]
    fn test_whole_to_unsigned() {
        assert_eq!(
            whole_to_unsigned(U256::from(3u64), 256, 6, "ufixed256x6").unwrap(),
            U256::from(3_000_000u64)
        );
        assert!(whole_to_unsigned(U256::MAX, 256, 1, "ufixed256x1").is_err());
    }
}
