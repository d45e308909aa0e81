//! HexData: an arbitrary-length byte string

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{strip_0x, DecodingError};

/// Byte string carried on the wire as `0x` + an even number of hex digits
///
/// `0x` is the empty value, which is distinct from an absent value.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct HexData(Bytes);

impl HexData {
    /// Empty byte string
    pub const fn empty() -> Self {
        HexData(Bytes::new())
    }

    /// Wrap bytes
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        HexData(bytes.into())
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap into the underlying buffer
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Wire form
    pub fn to_hex(&self) -> String {
        encode_hex_data(&self.0)
    }

    /// Parse the wire form
    pub fn from_hex(s: &str) -> Result<Self, DecodingError> {
        decode_hex_data(s)
    }
}

/// Encode bytes as `0x` + lowercase hex; no padding is added
pub fn encode_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a byte string, rejecting an odd digit count
pub fn decode_hex_data(s: &str) -> Result<HexData, DecodingError> {
    let digits = strip_0x(s)?;
    if digits.len() % 2 != 0 {
        return Err(DecodingError::OddLength(digits.len()));
    }
    hex::decode(digits)
        .map(HexData::new)
        .map_err(|e| DecodingError::InvalidHex(e.to_string()))
}

impl Deref for HexData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HexData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexData({})", self.to_hex())
    }
}

impl fmt::Display for HexData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for HexData {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex_data(s)
    }
}

impl From<Vec<u8>> for HexData {
    fn from(bytes: Vec<u8>) -> Self {
        HexData(Bytes::from(bytes))
    }
}

impl From<&[u8]> for HexData {
    fn from(bytes: &[u8]) -> Self {
        HexData(Bytes::copy_from_slice(bytes))
    }
}

impl From<Bytes> for HexData {
    fn from(bytes: Bytes) -> Self {
        HexData(bytes)
    }
}

impl AsRef<[u8]> for HexData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for HexData {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for HexData {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            decode_hex_data(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_valid() {
        let data = decode_hex_data("0x").unwrap();
        assert!(data.is_empty());
        assert_eq!(data.to_hex(), "0x");
        assert_eq!(HexData::empty(), data);
    }

    #[test]
    fn test_no_implied_padding() {
        assert_eq!(encode_hex_data(&[0x00, 0x01]), "0x0001");
        assert_eq!(decode_hex_data("0x0001").unwrap().as_bytes(), &[0x00, 0x01]);
    }

    #[test]
    fn test_odd_length_rejected() {
        assert_eq!(decode_hex_data("0x123"), Err(DecodingError::OddLength(3)));
        assert_eq!(decode_hex_data("0x0"), Err(DecodingError::OddLength(1)));
    }

    #[test]
    fn test_invalid_rejected() {
        assert!(matches!(decode_hex_data("0xzz"), Err(DecodingError::InvalidHex(_))));
        assert!(matches!(decode_hex_data("abcd"), Err(DecodingError::MissingPrefix(_))));
    }

    #[test]
    fn test_roundtrip_mixed_case() {
        let data: HexData = "0xDeadBeef".parse().unwrap();
        assert_eq!(data.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(data.to_hex(), "0xdeadbeef");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_hex_data_serde() {
        let data = HexData::from(vec![1u8, 2, 3]);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!("0x010203"));
        let back: HexData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }
}
