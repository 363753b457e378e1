//! Fast CBOR encoder for the JSON subset of the value model.

use bytepack_buffers::Writer;

use super::constants::{
    is_f32_exact, MAJOR_ARR, MAJOR_BYTES, MAJOR_MAP, MAJOR_NINT, MAJOR_STR, MAJOR_TAG, MAJOR_UINT,
    MINOR_INDEFINITE, TOKEN_BREAK, TOKEN_F32, TOKEN_F64, TOKEN_FALSE, TOKEN_NULL, TOKEN_TRUE,
};
use crate::{PackValue, RawValue};

/// Fast CBOR encoder.
///
/// Minimal dispatch over the JSON subset, definite-length containers, and
/// the streaming (indefinite-length) entry points. Values outside the JSON
/// subset fall back to their closest JSON shape; use
/// [`CborEncoder`](super::CborEncoder) for full fidelity.
pub struct CborEncoderFast {
    pub writer: Writer,
}

impl Default for CborEncoderFast {
    fn default() -> Self {
        Self::new()
    }
}

impl CborEncoderFast {
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
            PackValue::Null | PackValue::Undefined => self.write_null(),
            PackValue::Bool(b) => self.write_boolean(*b),
            PackValue::Integer(i) => self.write_integer(*i),
            PackValue::UInteger(u) => self.write_u_integer(*u),
            PackValue::Float(f) => self.write_float(*f),
            PackValue::BigInt(i) => self.write_float(*i as f64),
            PackValue::Bytes(b) => self.write_bin(b),
            PackValue::Str(s) => self.write_str(s),
            PackValue::Array(arr) => self.write_arr(arr),
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Map(map) => self.write_map(map),
            PackValue::Blob(blob) => self.write_blob(blob),
            PackValue::TypedArray(arr) => self.write_arr(&arr.to_values()),
            PackValue::Extension(ext) => {
                self.write_tag_hdr(ext.tag);
                self.write_any(&ext.val);
            }
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
                } else {
                    self.write_float(n.as_f64().unwrap_or(0.0));
                }
            }
            serde_json::Value::String(s) => self.write_str(s),
            serde_json::Value::Array(arr) => {
                self.write_arr_hdr(arr.len());
                for item in arr {
                    self.write_json(item);
                }
            }
            serde_json::Value::Object(obj) => {
                self.write_obj_hdr(obj.len());
                for (k, v) in obj {
                    self.write_str(k);
                    self.write_json(v);
                }
            }
        }
    }

    /// Writes a major/argument head in the smallest encoding.
    pub fn write_head(&mut self, major: u8, n: u64) {
        let bits = major << 5;
        if n <= 23 {
            self.writer.u8(bits | n as u8);
        } else if n <= 0xff {
            self.writer.u16(((bits | 24) as u16) << 8 | n as u16);
        } else if n <= 0xffff {
            self.writer.u8u16(bits | 25, n as u16);
        } else if n <= 0xffff_ffff {
            self.writer.u8u32(bits | 26, n as u32);
        } else {
            self.writer.u8u64(bits | 27, n);
        }
    }

    pub fn write_null(&mut self) {
        self.writer.u8(TOKEN_NULL);
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.writer.u8(if b { TOKEN_TRUE } else { TOKEN_FALSE });
    }

    pub fn write_integer(&mut self, int: i64) {
        if int >= 0 {
            self.write_head(MAJOR_UINT, int as u64);
        } else {
            self.write_head(MAJOR_NINT, !(int as u64));
        }
    }

    pub fn write_u_integer(&mut self, uint: u64) {
        self.write_head(MAJOR_UINT, uint);
    }

    /// Writes a float at the smallest width that round-trips exactly.
    pub fn write_float(&mut self, float: f64) {
        if is_f32_exact(float) {
            self.writer.u8f32(TOKEN_F32, float as f32);
        } else {
            self.writer.u8f64(TOKEN_F64, float);
        }
    }

    pub fn write_bin(&mut self, buf: &[u8]) {
        self.write_head(MAJOR_BYTES, buf.len() as u64);
        self.writer.buf(buf);
    }

    /// Writes a text string. The header width class is chosen from the
    /// 4-bytes-per-char worst case, so multi-byte text may use a wider
    /// header than its exact byte count requires.
    pub fn write_str(&mut self, s: &str) {
        let byte_length = s.len();
        let max_size = s.chars().count() * 4;
        if max_size <= 23 {
            self.writer.u8((MAJOR_STR << 5) | byte_length as u8);
        } else if max_size <= 0xff {
            self.writer.u16(0x78_00 | byte_length as u16);
        } else if max_size <= 0xffff {
            self.writer.u8u16(0x79, byte_length as u16);
        } else {
            self.writer.u8u32(0x7a, byte_length as u32);
        }
        self.writer.utf8(s);
    }

    /// Writes a text string with an exact-width header.
    pub fn write_str_exact(&mut self, s: &str) {
        self.write_head(MAJOR_STR, s.len() as u64);
        self.writer.utf8(s);
    }

    pub fn write_ascii_str(&mut self, s: &str) {
        self.write_head(MAJOR_STR, s.len() as u64);
        self.writer.ascii(s);
    }

    pub fn write_arr_hdr(&mut self, length: usize) {
        self.write_head(MAJOR_ARR, length as u64);
    }

    pub fn write_arr(&mut self, arr: &[PackValue]) {
        self.write_arr_hdr(arr.len());
        for item in arr {
            self.write_any(item);
        }
    }

    pub fn write_obj_hdr(&mut self, length: usize) {
        self.write_head(MAJOR_MAP, length as u64);
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        self.write_obj_hdr(obj.len());
        for (key, val) in obj {
            self.write_str(key);
            self.write_any(val);
        }
    }

    pub fn write_map(&mut self, map: &[(PackValue, PackValue)]) {
        self.write_obj_hdr(map.len());
        for (key, val) in map {
            self.write_any(key);
            self.write_any(val);
        }
    }

    pub fn write_tag_hdr(&mut self, tag: u64) {
        self.write_head(MAJOR_TAG, tag);
    }

    /// Copies a pre-encoded CBOR value verbatim.
    pub fn write_blob(&mut self, blob: &RawValue) {
        self.writer.buf(&blob.bytes);
    }

    // ---- Streaming (indefinite-length) ----

    pub fn write_start_arr(&mut self) {
        self.writer.u8((MAJOR_ARR << 5) | MINOR_INDEFINITE);
    }

    pub fn write_start_obj(&mut self) {
        self.writer.u8((MAJOR_MAP << 5) | MINOR_INDEFINITE);
    }

    pub fn write_start_str(&mut self) {
        self.writer.u8((MAJOR_STR << 5) | MINOR_INDEFINITE);
    }

    pub fn write_start_bin(&mut self) {
        self.writer.u8((MAJOR_BYTES << 5) | MINOR_INDEFINITE);
    }

    /// Terminates the innermost indefinite-length container.
    pub fn write_end(&mut self) {
        self.writer.u8(TOKEN_BREAK);
    }
}
