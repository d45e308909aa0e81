//! Normalization of loosely typed provider values
//!
//! Callers hand over transactions the way ethers builds them: quantities may
//! be JSON numbers, hex strings with leading zeros, or serialized BigNumber
//! objects. Everything is converted to canonical wire values here.
//!
//! A field is omitted when it is absent, `null`, or the empty string. An
//! explicit zero value or an empty `0x` payload is kept.

use devchain_primitives::{
    decode_address, decode_hash, decode_hex_data, decode_quantity, Address, HexData, Quantity,
    H256,
};
use devchain_rpc::TransactionRequest;
use serde_json::{Map, Value};

use crate::error::{ProviderError, ProviderResult};

/// Look up a field, treating `null` and `""` as absent
pub fn present<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    match object.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value) => Some(value),
    }
}

/// Convert a number, hex string or BigNumber object to a quantity
pub fn to_quantity(field: &str, value: &Value) -> ProviderResult<Quantity> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(Quantity::from)
            .ok_or_else(|| ProviderError::invalid(field, format!("{} is not an unsigned integer", n))),
        Value::String(s) => {
            let digits = s
                .strip_prefix("0x")
                .ok_or_else(|| ProviderError::invalid(field, format!("{:?} is not hex", s)))?;
            if digits.is_empty() {
                return Err(ProviderError::invalid(field, "empty quantity"));
            }
            let trimmed = digits.trim_start_matches('0');
            let canonical = if trimmed.is_empty() { "0" } else { trimmed };
            decode_quantity(&format!("0x{}", canonical)).map_err(|e| ProviderError::invalid(field, e))
        }
        Value::Object(object) => match big_number_hex(object) {
            Some(hex) => to_quantity(field, hex),
            None => Err(ProviderError::invalid(field, "object is not a BigNumber")),
        },
        other => Err(ProviderError::invalid(field, format!("unexpected {}", kind(other)))),
    }
}

/// `{"type": "BigNumber", "hex": "0x.."}` or `{"_hex": "0x.."}`
fn big_number_hex(object: &Map<String, Value>) -> Option<&Value> {
    match object.get("type") {
        Some(Value::String(t)) if t == "BigNumber" => object.get("hex"),
        _ => object.get("_hex"),
    }
}

/// Convert a hex string to an address
pub fn to_address(field: &str, value: &Value) -> ProviderResult<Address> {
    match value {
        Value::String(s) => decode_address(s).map_err(|e| ProviderError::invalid(field, e)),
        other => Err(ProviderError::invalid(field, format!("unexpected {}", kind(other)))),
    }
}

/// Convert a hex string to a hash
pub fn to_hash(field: &str, value: &Value) -> ProviderResult<H256> {
    match value {
        Value::String(s) => decode_hash(s).map_err(|e| ProviderError::invalid(field, e)),
        other => Err(ProviderError::invalid(field, format!("unexpected {}", kind(other)))),
    }
}

/// Convert a hex string or byte array to hex data
pub fn to_hex_data(field: &str, value: &Value) -> ProviderResult<HexData> {
    match value {
        Value::String(s) => decode_hex_data(s).map_err(|e| ProviderError::invalid(field, e)),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| ProviderError::invalid(field, format!("{} is not a byte", item)))
            })
            .collect::<ProviderResult<Vec<u8>>>()
            .map(HexData::from),
        other => Err(ProviderError::invalid(field, format!("unexpected {}", kind(other)))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build a transaction request from an ethers-style transaction object
///
/// `gasLimit` maps to `gas`; `gas` is accepted as well.
pub fn normalize_transaction(field: &str, value: &Value) -> ProviderResult<TransactionRequest> {
    let object = value
        .as_object()
        .ok_or_else(|| ProviderError::invalid(field, format!("expected object, got {}", kind(value))))?;
    let path = |name: &str| format!("{}.{}", field, name);

    let quantity = |name: &str| {
        present(object, name)
            .map(|v| to_quantity(&path(name), v))
            .transpose()
    };
    let address = |name: &str| {
        present(object, name)
            .map(|v| to_address(&path(name), v))
            .transpose()
    };

    let gas = match quantity("gasLimit")? {
        Some(gas) => Some(gas),
        None => quantity("gas")?,
    };

    Ok(TransactionRequest {
        from: address("from")?,
        to: address("to")?,
        gas,
        gas_price: quantity("gasPrice")?,
        nonce: quantity("nonce")?,
        value: quantity("value")?,
        data: present(object, "data")
            .map(|v| to_hex_data(&path("data"), v))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const TO: &str = "0x2222222222222222222222222222222222222222";

    // ==================== Quantities ====================

    #[test]
    fn test_quantity_forms() {
        assert_eq!(to_quantity("v", &json!(10)).unwrap(), Quantity::from(10u64));
        assert_eq!(to_quantity("v", &json!("0x000a")).unwrap(), Quantity::from(10u64));
        assert_eq!(to_quantity("v", &json!("0x00")).unwrap(), Quantity::ZERO);
        assert_eq!(
            to_quantity("v", &json!({"type": "BigNumber", "hex": "0x0a"})).unwrap(),
            Quantity::from(10u64)
        );
        assert_eq!(to_quantity("v", &json!({"_hex": "0x01"})).unwrap(), Quantity::from(1u64));
    }

    #[test]
    fn test_quantity_rejects() {
        for bad in [json!(-1), json!(1.5), json!("10"), json!("0x"), json!("0xzz"), json!(true)] {
            assert!(
                matches!(to_quantity("value", &bad), Err(ProviderError::InvalidField { .. })),
                "{}",
                bad
            );
        }
    }

    // ==================== Transactions ====================

    #[test]
    fn test_explicit_zero_and_empty_data_are_kept() {
        let request = normalize_transaction(
            "transaction",
            &json!({"to": TO, "value": 0, "data": "0x", "nonce": "0x0"}),
        )
        .unwrap();
        assert_eq!(request.value, Some(Quantity::ZERO));
        assert_eq!(request.nonce, Some(Quantity::ZERO));
        assert_eq!(request.data, Some(HexData::empty()));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"to": TO, "value": "0x0", "nonce": "0x0", "data": "0x"})
        );
    }

    #[test]
    fn test_absent_null_and_empty_string_are_omitted() {
        let request = normalize_transaction(
            "transaction",
            &json!({"to": TO, "gasPrice": null, "nonce": "", "from": ""}),
        )
        .unwrap();
        assert_eq!(
            request,
            TransactionRequest {
                to: Some(TO.parse().unwrap()),
                ..Default::default()
            }
        );
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"to": TO}));
    }

    #[test]
    fn test_gas_limit_maps_to_gas() {
        let request =
            normalize_transaction("transaction", &json!({"gasLimit": "0x5208"})).unwrap();
        assert_eq!(request.gas, Some(Quantity::from(21000u64)));
        let request = normalize_transaction("transaction", &json!({"gas": 21000})).unwrap();
        assert_eq!(request.gas, Some(Quantity::from(21000u64)));
    }

    #[test]
    fn test_data_as_byte_array() {
        let request = normalize_transaction("transaction", &json!({"data": [1, 2, 255]})).unwrap();
        assert_eq!(request.data, Some(HexData::new(vec![1u8, 2, 255])));
        assert!(normalize_transaction("transaction", &json!({"data": [256]})).is_err());
    }

    #[test]
    fn test_invalid_field_path() {
        let err = normalize_transaction("transaction", &json!({"to": "0x1234"})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidField { ref field, .. } if field == "transaction.to"));
        let err = normalize_transaction("transaction", &json!("0x")).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidField { ref field, .. } if field == "transaction"));
    }

    proptest! {
        #[test]
        fn prop_leading_zeros_are_stripped(value in any::<u64>(), zeros in 0usize..8) {
            let raw = format!("0x{}{:x}", "0".repeat(zeros), value);
            prop_assert_eq!(to_quantity("v", &json!(raw)).unwrap(), Quantity::from(value));
        }
    }
}
