//! Wire schemas
//!
//! Every type that crosses the command boundary implements [`WireType`], which
//! ties its serde representation to a [`Schema`] used for runtime validation.
//! Command descriptors are built from these impls, so a descriptor can never
//! disagree with the Rust type the executor receives or returns.

use std::fmt;

use devchain_primitives::{
    decode_address, decode_hash, decode_hex_data, decode_quantity, Address, HexData, Quantity,
    H256,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Block tags accepted wherever a block selector is
pub const BLOCK_TAGS: [&str; 3] = ["earliest", "latest", "pending"];

/// Shape of a raw JSON value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// Canonical hex quantity
    Quantity,
    /// 20-byte hex address
    Address,
    /// 32-byte hex hash
    Hash,
    /// Even-length hex byte string
    HexData,
    /// One of [`BLOCK_TAGS`]
    Tag,
    /// Quantity or block tag
    BlockSelector,
    /// JSON boolean
    Bool,
    /// JSON string
    String,
    /// Inner schema, `null`, or absent
    Nullable(Box<Schema>),
    /// Array whose elements all match
    Array(Box<Schema>),
    /// Object with named fields; unknown fields are ignored
    Record(Vec<(&'static str, Schema)>),
    /// Fixed-length positional array
    Tuple(Vec<Schema>),
    /// Absent, `null`, or `[]`
    NoParams,
    /// Any one of several schemas
    OneOf(Vec<Schema>),
}

impl Schema {
    /// Check a raw value; `root` names the value in error paths
    pub fn validate(&self, method: &str, root: &str, value: &Value) -> Result<(), ValidationError> {
        self.check(method, root, Some(value))
    }

    /// Check a value that may be absent from its enclosing record
    fn check(&self, method: &str, path: &str, value: Option<&Value>) -> Result<(), ValidationError> {
        let mismatch = || ValidationError {
            method: method.to_string(),
            path: path.to_string(),
            expected: self.to_string(),
            actual: describe(value),
        };

        match self {
            Schema::Nullable(inner) => match value {
                None | Some(Value::Null) => Ok(()),
                Some(_) => inner.check(method, path, value),
            },
            Schema::NoParams => match value {
                None | Some(Value::Null) => Ok(()),
                Some(Value::Array(items)) if items.is_empty() => Ok(()),
                Some(_) => Err(mismatch()),
            },
            Schema::Quantity => check_str(value, |s| decode_quantity(s).is_ok()).ok_or_else(mismatch),
            Schema::Address => check_str(value, |s| decode_address(s).is_ok()).ok_or_else(mismatch),
            Schema::Hash => check_str(value, |s| decode_hash(s).is_ok()).ok_or_else(mismatch),
            Schema::HexData => check_str(value, |s| decode_hex_data(s).is_ok()).ok_or_else(mismatch),
            Schema::Tag => check_str(value, |s| BLOCK_TAGS.contains(&s)).ok_or_else(mismatch),
            Schema::BlockSelector => check_str(value, |s| {
                BLOCK_TAGS.contains(&s) || decode_quantity(s).is_ok()
            })
            .ok_or_else(mismatch),
            Schema::Bool => match value {
                Some(Value::Bool(_)) => Ok(()),
                _ => Err(mismatch()),
            },
            Schema::String => check_str(value, |_| true).ok_or_else(mismatch),
            Schema::Array(inner) => match value {
                Some(Value::Array(items)) => items.iter().enumerate().try_for_each(|(i, item)| {
                    inner.check(method, &format!("{}[{}]", path, i), Some(item))
                }),
                _ => Err(mismatch()),
            },
            Schema::Record(fields) => match value {
                Some(Value::Object(map)) => fields.iter().try_for_each(|(name, field)| {
                    field.check(method, &format!("{}.{}", path, name), map.get(*name))
                }),
                _ => Err(mismatch()),
            },
            Schema::Tuple(items) => match value {
                Some(Value::Array(values)) if values.len() == items.len() => items
                    .iter()
                    .zip(values)
                    .enumerate()
                    .try_for_each(|(i, (item, value))| {
                        item.check(method, &format!("{}[{}]", path, i), Some(value))
                    }),
                _ => Err(mismatch()),
            },
            Schema::OneOf(options) => {
                if options.iter().any(|option| option.check(method, path, value).is_ok()) {
                    Ok(())
                } else {
                    Err(mismatch())
                }
            }
        }
    }
}

fn check_str(value: Option<&Value>, accept: impl Fn(&str) -> bool) -> Option<()> {
    match value {
        Some(Value::String(s)) if accept(s) => Some(()),
        _ => None,
    }
}

/// Short description of a raw value for error messages
fn describe(value: Option<&Value>) -> String {
    const MAX: usize = 80;
    match value {
        None => "nothing".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if s.len() > MAX => {
            let cut = (0..=MAX).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
            format!("{:?}...", &s[..cut])
        }
        Some(Value::String(s)) => format!("{:?}", s),
        Some(Value::Array(items)) => format!("array of {}", items.len()),
        Some(Value::Object(_)) => "object".to_string(),
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Quantity => write!(f, "quantity"),
            Schema::Address => write!(f, "address"),
            Schema::Hash => write!(f, "hash"),
            Schema::HexData => write!(f, "hex data"),
            Schema::Tag => write!(f, "block tag"),
            Schema::BlockSelector => write!(f, "quantity or block tag"),
            Schema::Bool => write!(f, "boolean"),
            Schema::String => write!(f, "string"),
            Schema::Nullable(inner) => write!(f, "{} or null", inner),
            Schema::Array(inner) => write!(f, "array of {}", inner),
            Schema::Record(_) => write!(f, "object"),
            Schema::Tuple(items) => write!(f, "array of {}", items.len()),
            Schema::NoParams => write!(f, "no parameters"),
            Schema::OneOf(options) => {
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", option)?;
                }
                Ok(())
            }
        }
    }
}

/// A type with a fixed JSON wire form and matching schema
pub trait WireType: Serialize + DeserializeOwned {
    /// Schema every serialized value of this type satisfies
    fn schema() -> Schema;
}

macro_rules! wire_type {
    ($($ty:ty => $schema:expr),* $(,)?) => {
        $(
            impl WireType for $ty {
                fn schema() -> Schema {
                    $schema
                }
            }
        )*
    };
}

wire_type! {
    Quantity => Schema::Quantity,
    Address => Schema::Address,
    H256 => Schema::Hash,
    HexData => Schema::HexData,
    bool => Schema::Bool,
    String => Schema::String,
}

impl<T: WireType> WireType for Option<T> {
    fn schema() -> Schema {
        Schema::Nullable(Box::new(T::schema()))
    }
}

impl<T: WireType> WireType for Vec<T> {
    fn schema() -> Schema {
        Schema::Array(Box::new(T::schema()))
    }
}

/// Parameter list of a command taking no parameters
impl WireType for () {
    fn schema() -> Schema {
        Schema::NoParams
    }
}

macro_rules! wire_tuple {
    ($($name:ident),+) => {
        impl<$($name: WireType),+> WireType for ($($name,)+) {
            fn schema() -> Schema {
                Schema::Tuple(vec![$($name::schema()),+])
            }
        }
    };
}

wire_tuple!(A);
wire_tuple!(A, B);
wire_tuple!(A, B, C);
