//! BSON document encoder.
//!
//! BSON is little-endian throughout. Document framing is single-pass: four
//! bytes are reserved for the size, elements are written, and the now-known
//! size is patched back.

use bytepack_buffers::Writer;

use super::values::{BsonObjectId, BsonValue};
use crate::PackValue;

/// Encodes BSON documents (ordered key-value pairs). BSON has no scalar
/// top level.
pub struct BsonEncoder {
    pub writer: Writer,
}

impl Default for BsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    pub fn encode(&mut self, fields: &[(String, BsonValue)]) -> Vec<u8> {
        self.writer.reset();
        self.write_document(fields);
        self.writer.flush()
    }

    /// Encodes a [`PackValue`] object through the BSON value bridge.
    pub fn encode_object(&mut self, obj: &[(String, PackValue)]) -> Vec<u8> {
        let fields: Vec<(String, BsonValue)> = obj
            .iter()
            .map(|(k, v)| (k.clone(), BsonValue::from(v.clone())))
            .collect();
        self.encode(&fields)
    }

    fn write_document(&mut self, fields: &[(String, BsonValue)]) {
        let size_at = self.writer.x;
        self.writer.move_cursor(4);
        for (key, value) in fields {
            self.write_element(key, value);
        }
        self.writer.u8(0);
        let size = (self.writer.x - size_at) as u32;
        self.writer.uint8[size_at..size_at + 4].copy_from_slice(&size.to_le_bytes());
    }

    fn write_cstring(&mut self, s: &str) {
        // Interior NUL would truncate the name on the wire.
        for &b in s.as_bytes() {
            self.writer.u8(if b == 0 { 0xff } else { b });
        }
        self.writer.u8(0);
    }

    fn write_string(&mut self, s: &str) {
        self.writer.u32_le(s.len() as u32 + 1);
        self.writer.utf8(s);
        self.writer.u8(0);
    }

    fn write_object_id(&mut self, id: &BsonObjectId) {
        self.writer.u32(id.timestamp);
        // 5-byte process field, big-endian truncated.
        let p = id.process.to_be_bytes();
        self.writer.buf(&p[3..8]);
        let c = id.counter.to_be_bytes();
        self.writer.buf(&c[1..4]);
    }

    fn write_element(&mut self, key: &str, value: &BsonValue) {
        match value {
            BsonValue::Float(f) => {
                self.writer.u8(0x01);
                self.write_cstring(key);
                self.writer.f64_le(*f);
            }
            BsonValue::Str(s) => {
                self.writer.u8(0x02);
                self.write_cstring(key);
                self.write_string(s);
            }
            BsonValue::Document(fields) => {
                self.writer.u8(0x03);
                self.write_cstring(key);
                self.write_document(fields);
            }
            BsonValue::Array(arr) => {
                self.writer.u8(0x04);
                self.write_cstring(key);
                // Arrays are documents keyed by decimal indices.
                let size_at = self.writer.x;
                self.writer.move_cursor(4);
                for (i, item) in arr.iter().enumerate() {
                    self.write_element(&i.to_string(), item);
                }
                self.writer.u8(0);
                let size = (self.writer.x - size_at) as u32;
                self.writer.uint8[size_at..size_at + 4].copy_from_slice(&size.to_le_bytes());
            }
            BsonValue::Binary(bin) => {
                self.writer.u8(0x05);
                self.write_cstring(key);
                self.writer.u32_le(bin.data.len() as u32);
                self.writer.u8(bin.subtype);
                self.writer.buf(&bin.data);
            }
            BsonValue::Undefined => {
                self.writer.u8(0x06);
                self.write_cstring(key);
            }
            BsonValue::ObjectId(id) => {
                self.writer.u8(0x07);
                self.write_cstring(key);
                self.write_object_id(id);
            }
            BsonValue::Boolean(b) => {
                self.writer.u8(0x08);
                self.write_cstring(key);
                self.writer.u8(*b as u8);
            }
            BsonValue::DateTime(ms) => {
                self.writer.u8(0x09);
                self.write_cstring(key);
                self.writer.i64_le(*ms);
            }
            BsonValue::Null => {
                self.writer.u8(0x0a);
                self.write_cstring(key);
            }
            BsonValue::Regex(pattern, flags) => {
                self.writer.u8(0x0b);
                self.write_cstring(key);
                self.write_cstring(pattern);
                self.write_cstring(flags);
            }
            BsonValue::Int32(i) => {
                self.writer.u8(0x10);
                self.write_cstring(key);
                self.writer.i32_le(*i);
            }
            BsonValue::Timestamp(inc, sec) => {
                self.writer.u8(0x11);
                self.write_cstring(key);
                self.writer.u32_le(*inc);
                self.writer.u32_le(*sec);
            }
            BsonValue::Int64(i) => {
                self.writer.u8(0x12);
                self.write_cstring(key);
                self.writer.i64_le(*i);
            }
            BsonValue::MinKey => {
                self.writer.u8(0xff);
                self.write_cstring(key);
            }
            BsonValue::MaxKey => {
                self.writer.u8(0x7f);
                self.write_cstring(key);
            }
        }
    }
}
