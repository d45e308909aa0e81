//! Quantity: an unsigned integer in minimal hex form

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;

use crate::error::{strip_0x, DecodingError, EncodingError};

/// Maximum number of hex digits in a 256-bit quantity
const MAX_DIGITS: usize = 64;

/// Non-negative integer carried on the wire as `0x` + minimal hex
///
/// Zero is `0x0`; every other value has no leading zero digit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Quantity(U256);

impl Quantity {
    /// Zero
    pub const ZERO: Quantity = Quantity(U256([0; 4]));

    /// Wrap a 256-bit value
    pub const fn new(value: U256) -> Self {
        Quantity(value)
    }

    /// Get the underlying value
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Get the value as u64, if it fits
    pub fn as_u64(&self) -> Option<u64> {
        if self.0.bits() > 64 {
            None
        } else {
            Some(self.0.low_u64())
        }
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Canonical wire form
    pub fn to_hex(&self) -> String {
        encode_quantity(self.0)
    }

    /// Parse the canonical wire form
    pub fn from_hex(s: &str) -> Result<Self, DecodingError> {
        decode_quantity(s)
    }
}

/// Encode an unsigned integer as a canonical quantity
pub fn encode_quantity(value: U256) -> String {
    format!("0x{:x}", value)
}

/// Encode a signed integer, rejecting negative values
pub fn encode_signed_quantity(value: i128) -> Result<String, EncodingError> {
    Quantity::try_from(value).map(|q| q.to_hex())
}

/// Decode a canonical quantity
///
/// Rejects a missing prefix, `0x` with no digits, leading zero digits
/// (other than `0x0` itself), non-hex characters, and values over 256 bits.
pub fn decode_quantity(s: &str) -> Result<Quantity, DecodingError> {
    let digits = strip_0x(s)?;
    if digits.is_empty() {
        return Err(DecodingError::EmptyQuantity);
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(DecodingError::LeadingZero(s.to_string()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodingError::InvalidHex(s.to_string()));
    }
    if digits.len() > MAX_DIGITS {
        return Err(DecodingError::QuantityOverflow(digits.len()));
    }
    U256::from_str_radix(digits, 16)
        .map(Quantity)
        .map_err(|e| DecodingError::InvalidHex(format!("{}: {:?}", s, e)))
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({})", self.to_hex())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Quantity {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_quantity(s)
    }
}

impl From<U256> for Quantity {
    fn from(value: U256) -> Self {
        Quantity(value)
    }
}

impl From<Quantity> for U256 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Quantity(U256::from(value))
    }
}

impl From<u128> for Quantity {
    fn from(value: u128) -> Self {
        Quantity(U256::from(value))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = EncodingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Quantity::try_from(i128::from(value))
    }
}

impl TryFrom<i128> for Quantity {
    type Error = EncodingError;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        u128::try_from(value)
            .map(Quantity::from)
            .map_err(|_| EncodingError::Negative(value))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Quantity {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Quantity {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            decode_quantity(&s).map_err(de::Error::custom)
        }
    }
}
