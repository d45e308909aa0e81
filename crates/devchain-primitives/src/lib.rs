//! # devchain-primitives
//!
//! Canonical wire values for devchain.
//!
//! Every value crossing the JSON-RPC boundary uses one of these encodings:
//!
//! | Type | Wire form | Example |
//! |------|-----------|---------|
//! | [`Quantity`] | `0x` + minimal hex, zero is `0x0` | `0x400` |
//! | [`Address`] | `0x` + 40 hex digits | `0x742d...ab3d` |
//! | [`HexData`] | `0x` + even number of hex digits | `0x`, `0x0001` |
//! | [`H256`] | `0x` + 64 hex digits | block and transaction hashes |
//!
//! All codecs are pure functions. With the `serde` feature each type
//! serializes to and from its wire string.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
mod hex_data;
mod quantity;

pub use address::{decode_address, encode_address, Address};
pub use error::{DecodingError, EncodingError};
pub use hash::{decode_hash, encode_hash, Hash, H256};
pub use hex_data::{decode_hex_data, encode_hex_data, HexData};
pub use quantity::{decode_quantity, encode_quantity, encode_signed_quantity, Quantity};

// Re-export primitive-types for U256
pub use primitive_types::U256;
