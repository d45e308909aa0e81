//! Wire codec error types

use thiserror::Error;

/// A value could not be put on the wire
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Quantities are unsigned
    #[error("cannot encode negative integer {0} as a quantity")]
    Negative(i128),
}

/// A wire string could not be decoded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodingError {
    /// Input does not start with `0x`
    #[error("missing 0x prefix: {0:?}")]
    MissingPrefix(String),

    /// `0x` with no digits where a quantity was expected
    #[error("empty quantity")]
    EmptyQuantity,

    /// Quantity with a leading zero digit (only `0x0` may start with zero)
    #[error("quantity has leading zero digits: {0}")]
    LeadingZero(String),

    /// Non-hex characters
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Quantity does not fit in 256 bits
    #[error("quantity too large: {0} hex digits (max 64)")]
    QuantityOverflow(usize),

    /// Fixed-size value with the wrong byte length
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Required byte length
        expected: usize,
        /// Decoded byte length
        got: usize,
    },

    /// Byte string with an odd number of hex digits
    #[error("odd number of hex digits: {0}")]
    OddLength(usize),
}

/// Strip the mandatory `0x` prefix
pub(crate) fn strip_0x(s: &str) -> Result<&str, DecodingError> {
    s.strip_prefix("0x")
        .ok_or_else(|| DecodingError::MissingPrefix(s.to_string()))
}

/// Decode an exact-length byte string
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], DecodingError> {
    let digits = strip_0x(s)?;
    let bytes = hex::decode(digits).map_err(|e| DecodingError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(DecodingError::InvalidLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
