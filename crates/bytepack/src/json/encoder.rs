//! JSON encoder writing UTF-8 bytes to a [`Writer`].
//!
//! Binary values become base64 data-URI strings, and `Undefined` becomes the
//! CBOR-undefined sentinel URI, so the decoder can round-trip both.

use bytepack_buffers::Writer;

use crate::json_binary::{BIN_URI_START, UNDEF_URI};
use crate::PackValue;

pub struct JsonEncoder {
    pub writer: Writer,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.writer.reset();
        self.write_any(value);
        self.writer.flush()
    }

    pub fn encode_json(&mut self, value: &serde_json::Value) -> Vec<u8> {
        self.writer.reset();
        self.write_json(value);
        self.writer.flush()
    }

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Null => self.write_null(),
            PackValue::Undefined => self.write_undef(),
            PackValue::Bool(b) => self.write_boolean(*b),
            PackValue::Integer(i) => self.write_integer(*i),
            PackValue::UInteger(u) => self.write_u_integer(*u),
            PackValue::Float(f) => self.write_float(*f),
            PackValue::BigInt(i) => self.write_big_int(*i),
            PackValue::Bytes(b) => self.write_bin(b),
            PackValue::Str(s) => self.write_str(s),
            PackValue::Array(arr) => self.write_arr(arr),
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Map(map) => self.write_map(map),
            PackValue::TypedArray(arr) => self.write_arr(&arr.to_values()),
            PackValue::Extension(_) | PackValue::Blob(_) => self.write_null(),
        }
    }

    pub fn write_json(&mut self, value: &serde_json::Value) {
        match value {
            serde_json::Value::Null => self.write_null(),
            serde_json::Value::Bool(b) => self.write_boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.write_integer(i);
                } else if let Some(u) = n.as_u64() {
                    self.write_u_integer(u);
                } else if let Some(f) = n.as_f64() {
                    self.write_float(f);
                }
            }
            serde_json::Value::String(s) => self.write_str(s),
            serde_json::Value::Array(arr) => {
                self.writer.u8(b'[');
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        self.writer.u8(b',');
                    }
                    self.write_json(item);
                }
                self.writer.u8(b']');
            }
            serde_json::Value::Object(obj) => {
                self.writer.u8(b'{');
                for (i, (key, val)) in obj.iter().enumerate() {
                    if i > 0 {
                        self.writer.u8(b',');
                    }
                    self.write_str(key);
                    self.writer.u8(b':');
                    self.write_json(val);
                }
                self.writer.u8(b'}');
            }
        }
    }

    pub fn write_null(&mut self) {
        self.writer.u32(0x6e75_6c6c); // "null"
    }

    /// Writes the CBOR-undefined sentinel string.
    pub fn write_undef(&mut self) {
        self.writer.u8(b'"');
        self.writer.buf(UNDEF_URI.as_bytes());
        self.writer.u8(b'"');
    }

    pub fn write_boolean(&mut self, b: bool) {
        if b {
            self.writer.u32(0x7472_7565); // "true"
        } else {
            self.writer.u8(b'f');
            self.writer.u32(0x616c_7365); // "alse"
        }
    }

    pub fn write_integer(&mut self, int: i64) {
        self.writer.ascii(&int.to_string());
    }

    pub fn write_u_integer(&mut self, uint: u64) {
        self.writer.ascii(&uint.to_string());
    }

    pub fn write_big_int(&mut self, int: i128) {
        self.writer.ascii(&int.to_string());
    }

    pub fn write_float(&mut self, float: f64) {
        self.writer.ascii(&format_float(float));
    }

    /// Writes bytes as `"<prefix><base64>"`.
    pub fn write_bin(&mut self, buf: &[u8]) {
        let b64 = bytepack_base64::to_base64(buf);
        self.writer.u8(b'"');
        self.writer.buf(BIN_URI_START.as_bytes());
        self.writer.buf(b64.as_bytes());
        self.writer.u8(b'"');
    }

    /// Writes a JSON string with escaping.
    pub fn write_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let len = bytes.len();

        // Fast path: printable ASCII without quotes or backslashes.
        if len < 256 {
            let clean = bytes
                .iter()
                .all(|&b| (32..127).contains(&b) && b != b'"' && b != b'\\');
            if clean {
                self.writer.ensure_capacity(len + 2);
                let x = self.writer.x;
                self.writer.uint8[x] = b'"';
                self.writer.uint8[x + 1..x + 1 + len].copy_from_slice(bytes);
                self.writer.uint8[x + 1 + len] = b'"';
                self.writer.x = x + 2 + len;
                return;
            }
        }

        let escaped = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_owned());
        self.writer.buf(escaped.as_bytes());
    }

    pub fn write_arr(&mut self, arr: &[PackValue]) {
        self.writer.u8(b'[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                self.writer.u8(b',');
            }
            self.write_any(item);
        }
        self.writer.u8(b']');
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        self.writer.u8(b'{');
        for (i, (key, val)) in obj.iter().enumerate() {
            if i > 0 {
                self.writer.u8(b',');
            }
            self.write_str(key);
            self.writer.u8(b':');
            self.write_any(val);
        }
        self.writer.u8(b'}');
    }

    /// Maps with non-string keys keep only the string-keyed entries.
    pub fn write_map(&mut self, map: &[(PackValue, PackValue)]) {
        self.writer.u8(b'{');
        let mut first = true;
        for (key, val) in map {
            if let PackValue::Str(k) = key {
                if !first {
                    self.writer.u8(b',');
                }
                self.write_str(k);
                self.writer.u8(b':');
                self.write_any(val);
                first = false;
            }
        }
        self.writer.u8(b'}');
    }

    // ---- Streaming ----

    pub fn write_start_arr(&mut self) {
        self.writer.u8(b'[');
    }

    pub fn write_end_arr(&mut self) {
        self.writer.u8(b']');
    }

    pub fn write_start_obj(&mut self) {
        self.writer.u8(b'{');
    }

    pub fn write_end_obj(&mut self) {
        self.writer.u8(b'}');
    }

    pub fn write_separator(&mut self) {
        self.writer.u8(b',');
    }

    pub fn write_key_separator(&mut self) {
        self.writer.u8(b':');
    }
}

/// Shortest decimal form. Non-finite values have no JSON representation and
/// degrade to null / clamped exponents.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "null".to_owned()
    } else if f.is_infinite() {
        if f > 0.0 {
            "1e308".to_owned()
        } else {
            "-1e308".to_owned()
        }
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}
