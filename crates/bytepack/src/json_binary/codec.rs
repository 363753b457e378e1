//! Wrap/unwrap between [`PackValue`] trees and `serde_json::Value` trees
//! with binary carried as data-URI strings.

use serde_json::Value as JsonValue;

use super::{BIN_URI_START, MSGPACK_EXT_START, MSGPACK_URI_START};
use crate::{PackValue, RawValue};

/// Converts a value tree to JSON, encoding binary leaves as data URIs.
pub fn wrap_binary(value: PackValue) -> JsonValue {
    match value {
        PackValue::Null | PackValue::Undefined => JsonValue::Null,
        PackValue::Bool(b) => JsonValue::Bool(b),
        PackValue::Integer(i) => serde_json::json!(i),
        PackValue::UInteger(u) => serde_json::json!(u),
        PackValue::Float(f) => serde_json::json!(f),
        PackValue::BigInt(i) => serde_json::json!(i.to_string()),
        PackValue::Str(s) => JsonValue::String(s),
        PackValue::Bytes(b) => JsonValue::String(format!(
            "{}{}",
            BIN_URI_START,
            bytepack_base64::to_base64(&b)
        )),
        PackValue::Blob(blob) => JsonValue::String(format!(
            "{}{}",
            MSGPACK_URI_START,
            bytepack_base64::to_base64(&blob.bytes)
        )),
        PackValue::Extension(ext) => {
            let payload = match ext.val.as_ref() {
                PackValue::Bytes(b) => bytepack_base64::to_base64(b),
                _ => String::new(),
            };
            JsonValue::String(format!("{}{},{}", MSGPACK_EXT_START, ext.tag, payload))
        }
        PackValue::Array(arr) => JsonValue::Array(arr.into_iter().map(wrap_binary).collect()),
        PackValue::Object(obj) => {
            JsonValue::Object(obj.into_iter().map(|(k, v)| (k, wrap_binary(v))).collect())
        }
        PackValue::Map(map) => JsonValue::Object(
            map.into_iter()
                .filter_map(|(k, v)| match k {
                    PackValue::Str(key) => Some((key, wrap_binary(v))),
                    _ => None,
                })
                .collect(),
        ),
        PackValue::TypedArray(arr) => {
            JsonValue::Array(arr.to_values().into_iter().map(wrap_binary).collect())
        }
    }
}

/// Converts a JSON tree back to a value tree, decoding data-URI strings.
pub fn unwrap_binary(value: JsonValue) -> PackValue {
    match value {
        JsonValue::Null => PackValue::Null,
        JsonValue::Bool(b) => PackValue::Bool(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                PackValue::Integer(i)
            } else if let Some(u) = n.as_u64() {
                PackValue::UInteger(u)
            } else {
                PackValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => unwrap_string(s),
        JsonValue::Array(arr) => PackValue::Array(arr.into_iter().map(unwrap_binary).collect()),
        JsonValue::Object(obj) => PackValue::Object(
            obj.into_iter()
                .map(|(k, v)| (k, unwrap_binary(v)))
                .collect(),
        ),
    }
}

fn unwrap_string(s: String) -> PackValue {
    if let Some(b64) = s.strip_prefix(BIN_URI_START) {
        if let Ok(bytes) = bytepack_base64::from_base64(b64) {
            return PackValue::Bytes(bytes);
        }
    } else if let Some(rest) = s.strip_prefix(MSGPACK_EXT_START) {
        // `<tag>,<base64>`; checked before the plain value prefix, whose
        // text it extends.
        if let Some((tag_str, b64)) = rest.split_once(',') {
            if let (Ok(tag), Ok(bytes)) =
                (tag_str.parse::<u64>(), bytepack_base64::from_base64(b64))
            {
                return PackValue::extension(tag, PackValue::Bytes(bytes));
            }
        }
    } else if let Some(b64) = s.strip_prefix(MSGPACK_URI_START) {
        if let Ok(bytes) = bytepack_base64::from_base64(b64) {
            return PackValue::Blob(RawValue::new(bytes));
        }
    }
    PackValue::Str(s)
}

/// Serializes a value tree to a JSON string, wrapping binary leaves.
pub fn stringify(value: PackValue) -> Result<String, serde_json::Error> {
    serde_json::to_string(&wrap_binary(value))
}

/// Parses a JSON string, unwrapping any binary data URIs.
pub fn parse(json: &str) -> Result<PackValue, serde_json::Error> {
    let parsed: JsonValue = serde_json::from_str(json)?;
    Ok(unwrap_binary(parsed))
}

/// Encodes bytes as a standalone binary data-URI string.
pub fn stringify_binary(buf: &[u8]) -> String {
    format!("{}{}", BIN_URI_START, bytepack_base64::to_base64(buf))
}
