//! BSON-specific value types.

use crate::PackValue;

/// BSON ObjectId: 4-byte timestamp, 5-byte process, 3-byte counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonObjectId {
    pub timestamp: u32,
    pub process: u64,
    pub counter: u32,
}

/// Binary element with its subtype byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonBinary {
    pub subtype: u8,
    pub data: Vec<u8>,
}

/// The element types carried by a BSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    Float(f64),
    Str(String),
    Document(Vec<(String, BsonValue)>),
    Array(Vec<BsonValue>),
    Binary(BsonBinary),
    Undefined,
    ObjectId(BsonObjectId),
    Boolean(bool),
    /// Milliseconds since the epoch.
    DateTime(i64),
    Null,
    Regex(String, String),
    Int32(i32),
    /// Internal replication timestamp: (increment, seconds).
    Timestamp(u32, u32),
    Int64(i64),
    MinKey,
    MaxKey,
}

impl From<PackValue> for BsonValue {
    fn from(v: PackValue) -> Self {
        match v {
            PackValue::Null | PackValue::Blob(_) | PackValue::Extension(_) => BsonValue::Null,
            PackValue::Undefined => BsonValue::Undefined,
            PackValue::Bool(b) => BsonValue::Boolean(b),
            PackValue::Integer(i) => {
                if (i32::MIN as i64..=i32::MAX as i64).contains(&i) {
                    BsonValue::Int32(i as i32)
                } else {
                    BsonValue::Int64(i)
                }
            }
            PackValue::UInteger(u) => BsonValue::Float(u as f64),
            PackValue::Float(f) => BsonValue::Float(f),
            PackValue::BigInt(i) => {
                if i >= i64::MIN as i128 && i <= i64::MAX as i128 {
                    BsonValue::Int64(i as i64)
                } else {
                    BsonValue::Float(i as f64)
                }
            }
            PackValue::Bytes(data) => BsonValue::Binary(BsonBinary { subtype: 0, data }),
            PackValue::Str(s) => BsonValue::Str(s),
            PackValue::Array(arr) => {
                BsonValue::Array(arr.into_iter().map(BsonValue::from).collect())
            }
            PackValue::Object(obj) => BsonValue::Document(
                obj.into_iter().map(|(k, v)| (k, BsonValue::from(v))).collect(),
            ),
            PackValue::Map(map) => BsonValue::Document(
                map.into_iter()
                    .filter_map(|(k, v)| match k {
                        PackValue::Str(key) => Some((key, BsonValue::from(v))),
                        _ => None,
                    })
                    .collect(),
            ),
            PackValue::TypedArray(arr) => BsonValue::Array(
                arr.to_values().into_iter().map(BsonValue::from).collect(),
            ),
        }
    }
}

impl From<BsonValue> for PackValue {
    fn from(v: BsonValue) -> Self {
        match v {
            BsonValue::Float(f) => PackValue::Float(f),
            BsonValue::Str(s) => PackValue::Str(s),
            BsonValue::Document(fields) => PackValue::Object(
                fields.into_iter().map(|(k, v)| (k, PackValue::from(v))).collect(),
            ),
            BsonValue::Array(arr) => {
                PackValue::Array(arr.into_iter().map(PackValue::from).collect())
            }
            BsonValue::Binary(bin) => PackValue::Bytes(bin.data),
            BsonValue::Undefined => PackValue::Undefined,
            BsonValue::ObjectId(id) => PackValue::Str(format!(
                "{:08x}{:010x}{:06x}",
                id.timestamp, id.process, id.counter
            )),
            BsonValue::Boolean(b) => PackValue::Bool(b),
            BsonValue::DateTime(ms) => PackValue::Integer(ms),
            BsonValue::Null | BsonValue::MinKey | BsonValue::MaxKey => PackValue::Null,
            BsonValue::Regex(pattern, _) => PackValue::Str(pattern),
            BsonValue::Int32(i) => PackValue::Integer(i as i64),
            BsonValue::Timestamp(inc, sec) => {
                PackValue::Integer(((sec as i64) << 32) | inc as i64)
            }
            BsonValue::Int64(i) => PackValue::Integer(i),
        }
    }
}
