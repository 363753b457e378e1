//! [`PackValue`] — the universal value type consumed and produced by every
//! bytepack codec.

use crate::{PackExtension, RawValue, TypedArray};

/// Universal value type spanning all bytepack wire formats.
///
/// Covers the JSON data model plus the extensions binary formats need:
/// byte strings, tagged values, big integers, pre-encoded fragments, maps
/// with non-string keys, and typed numeric arrays.
///
/// Object key uniqueness is a producer obligation; encoders preserve
/// insertion order (except the stable variants, which re-sort).
#[derive(Debug, Clone, PartialEq)]
pub enum PackValue {
    /// JSON null / CBOR null / MessagePack nil.
    Null,
    /// Undefined, distinct from null on formats that carry it (CBOR 0xf7,
    /// MessagePack 0xc1, UBJSON `N`).
    Undefined,
    Bool(bool),
    /// Signed integer within `i64`.
    Integer(i64),
    /// Unsigned integer above `i64::MAX`.
    UInteger(u64),
    /// Floating-point number. Encoders narrow to f32 when exact.
    Float(f64),
    /// Big integer beyond the 64-bit wire families.
    BigInt(i128),
    /// Opaque byte string.
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<PackValue>),
    /// Ordered string-keyed entries.
    Object(Vec<(String, PackValue)>),
    /// Ordered entries with arbitrary keys (CBOR and MessagePack allow
    /// non-string map keys).
    Map(Vec<(PackValue, PackValue)>),
    /// Tagged wrapper: CBOR tag, MessagePack extension.
    Extension(Box<PackExtension>),
    /// Pre-encoded fragment copied verbatim by encoders.
    Blob(RawValue),
    /// Homogeneous numeric array, surfaced by CBOR's typed-array tags.
    TypedArray(TypedArray),
}

impl PackValue {
    /// Convenience constructor for an extension value.
    pub fn extension(tag: u64, val: PackValue) -> Self {
        PackValue::Extension(Box::new(PackExtension::new(tag, val)))
    }

    /// Convenience constructor for a pre-encoded fragment.
    pub fn blob(bytes: Vec<u8>) -> Self {
        PackValue::Blob(RawValue::new(bytes))
    }
}

impl From<serde_json::Value> for PackValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => PackValue::Null,
            serde_json::Value::Bool(b) => PackValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PackValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    PackValue::UInteger(u)
                } else {
                    PackValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => PackValue::Str(s),
            serde_json::Value::Array(arr) => {
                PackValue::Array(arr.into_iter().map(PackValue::from).collect())
            }
            serde_json::Value::Object(obj) => PackValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, PackValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PackValue> for serde_json::Value {
    fn from(v: PackValue) -> Self {
        match v {
            PackValue::Null | PackValue::Undefined | PackValue::Blob(_) => serde_json::Value::Null,
            PackValue::Bool(b) => serde_json::Value::Bool(b),
            PackValue::Integer(i) => serde_json::json!(i),
            PackValue::UInteger(u) => serde_json::json!(u),
            PackValue::Float(f) => serde_json::json!(f),
            PackValue::BigInt(i) => serde_json::json!(i.to_string()),
            PackValue::Bytes(b) => {
                let b64 = bytepack_base64::to_base64(&b);
                serde_json::Value::String(format!(
                    "{}{}",
                    crate::json_binary::BIN_URI_START,
                    b64
                ))
            }
            PackValue::Str(s) => serde_json::Value::String(s),
            PackValue::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            PackValue::Object(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            PackValue::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .filter_map(|(k, v)| match k {
                        PackValue::Str(key) => Some((key, serde_json::Value::from(v))),
                        _ => None,
                    })
                    .collect(),
            ),
            PackValue::Extension(ext) => serde_json::Value::from(*ext.val),
            PackValue::TypedArray(arr) => serde_json::Value::Array(
                arr.to_values().into_iter().map(serde_json::Value::from).collect(),
            ),
        }
    }
}
