//! Smile encoder.

use bytepack_buffers::Writer;

use super::constants::*;
use super::shared::{shareable, SharedStringSet};
use super::vint::{write_vint, zigzag_encode};
use crate::{PackValue, RawValue};

/// Encoder configuration, reflected in the document header flags.
#[derive(Debug, Clone, Copy)]
pub struct SmileEncoderOptions {
    /// Back-reference repeated property names (header bit 0).
    pub shared_property_names: bool,
    /// Back-reference repeated short string values (header bit 1).
    pub shared_string_values: bool,
    /// Emit binary raw instead of 7-bit-safe (header bit 2).
    pub raw_binary: bool,
}

impl Default for SmileEncoderOptions {
    fn default() -> Self {
        Self {
            shared_property_names: true,
            shared_string_values: false,
            raw_binary: false,
        }
    }
}

/// Smile encoder.
///
/// Alternates between value mode and key mode as required by the token
/// tables, and maintains the shared-name/value dictionaries for one document
/// at a time.
pub struct SmileEncoder {
    pub writer: Writer,
    options: SmileEncoderOptions,
    shared_keys: SharedStringSet,
    shared_values: SharedStringSet,
}

impl Default for SmileEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SmileEncoder {
    pub fn new() -> Self {
        Self::with_options(SmileEncoderOptions::default())
    }

    pub fn with_options(options: SmileEncoderOptions) -> Self {
        Self {
            writer: Writer::new(),
            options,
            shared_keys: SharedStringSet::new(),
            shared_values: SharedStringSet::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.writer.reset();
        self.shared_keys.clear();
        self.shared_values.clear();
        self.write_header();
        self.write_any(value);
        self.writer.flush()
    }

    fn write_header(&mut self) {
        self.writer.buf(&HEADER);
        let mut flags = 0u8;
        if self.options.shared_property_names {
            flags |= FLAG_SHARED_NAMES;
        }
        if self.options.shared_string_values {
            flags |= FLAG_SHARED_VALUES;
        }
        if self.options.raw_binary {
            flags |= FLAG_RAW_BINARY;
        }
        // Bits 4..7 carry the version, currently 0.
        self.writer.u8(flags);
    }

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Null | PackValue::Undefined => self.writer.u8(TOKEN_NULL),
            PackValue::Bool(b) => self
                .writer
                .u8(if *b { TOKEN_TRUE } else { TOKEN_FALSE }),
            PackValue::Integer(i) => self.write_integer(*i),
            PackValue::UInteger(u) => self.write_u_integer(*u),
            PackValue::Float(f) => self.write_float(*f),
            PackValue::BigInt(i) => self.write_big_int(*i),
            PackValue::Bytes(b) => self.write_bin(b),
            PackValue::Str(s) => self.write_str(s),
            PackValue::Array(arr) => self.write_arr(arr),
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Map(map) => self.write_map(map),
            PackValue::Blob(blob) => self.write_blob(blob),
            PackValue::TypedArray(arr) => self.write_arr(&arr.to_values()),
            // Smile has no tag channel; the payload is written bare.
            PackValue::Extension(ext) => self.write_any(&ext.val),
        }
    }

    /// Copies a pre-encoded Smile fragment verbatim.
    pub fn write_blob(&mut self, blob: &RawValue) {
        self.writer.buf(&blob.bytes);
    }

    pub fn write_integer(&mut self, int: i64) {
        if (-16..=15).contains(&int) {
            self.writer.u8(0xc0 | zigzag_encode(int) as u8);
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&int) {
            self.writer.u8(TOKEN_INT32);
            write_vint(&mut self.writer, zigzag_encode(int));
        } else {
            self.writer.u8(TOKEN_INT64);
            write_vint(&mut self.writer, zigzag_encode(int));
        }
    }

    pub fn write_u_integer(&mut self, uint: u64) {
        if uint <= i64::MAX as u64 {
            self.write_integer(uint as i64);
        } else {
            self.write_big_int(uint as i128);
        }
    }

    /// Big integers: VInt byte count, then the big-endian two's-complement
    /// representation in 7-bit-safe form.
    pub fn write_big_int(&mut self, int: i128) {
        let bytes = minimal_twos_complement(int);
        self.writer.u8(TOKEN_BIG_INTEGER);
        write_vint(&mut self.writer, bytes.len() as u64);
        self.write_7bit(&bytes);
    }

    /// Floats are IEEE 754 big-endian bits re-chunked into 7-bit groups,
    /// right-aligned: 5 septets for binary32, 10 for binary64.
    pub fn write_float(&mut self, float: f64) {
        let narrowed = float as f32;
        if narrowed as f64 == float {
            self.writer.u8(TOKEN_FLOAT32);
            let bits = narrowed.to_bits();
            for i in (0..5).rev() {
                self.writer.u8(((bits as u64 >> (7 * i)) & 0x7f) as u8);
            }
        } else {
            self.writer.u8(TOKEN_FLOAT64);
            let bits = float.to_bits();
            for i in (0..10).rev() {
                self.writer.u8(((bits as u128 >> (7 * i)) & 0x7f) as u8);
            }
        }
    }

    pub fn write_bin(&mut self, buf: &[u8]) {
        if self.options.raw_binary {
            self.writer.u8(TOKEN_BIN_RAW);
            write_vint(&mut self.writer, buf.len() as u64);
            self.writer.buf(buf);
        } else {
            self.writer.u8(TOKEN_BIN_7BIT);
            write_vint(&mut self.writer, buf.len() as u64);
            self.write_7bit(buf);
        }
    }

    /// Re-chunks 8-bit input into 7-bit-safe output bytes; trailing bits are
    /// left-aligned in the final byte.
    fn write_7bit(&mut self, data: &[u8]) {
        let mut acc: u32 = 0;
        let mut bits: u32 = 0;
        for &byte in data {
            acc = (acc << 8) | byte as u32;
            bits += 8;
            while bits >= 7 {
                bits -= 7;
                self.writer.u8(((acc >> bits) & 0x7f) as u8);
            }
        }
        if bits > 0 {
            self.writer.u8(((acc << (7 - bits)) & 0x7f) as u8);
        }
    }

    pub fn write_str(&mut self, s: &str) {
        if s.is_empty() {
            self.writer.u8(TOKEN_EMPTY_STRING);
            return;
        }
        let eligible = self.options.shared_string_values && shareable(s);
        if eligible {
            if let Some(index) = self.shared_values.lookup(s) {
                if index <= 30 {
                    self.writer.u8(1 + index as u8);
                } else {
                    self.writer
                        .u8(TOKEN_SHARED_VALUE_LONG | (index >> 8) as u8);
                    self.writer.u8((index & 0xff) as u8);
                }
                return;
            }
        }
        let len = s.len();
        if s.is_ascii() {
            if len <= 32 {
                self.writer.u8(0x40 + (len as u8 - 1));
                self.writer.ascii(s);
            } else if len <= 64 {
                self.writer.u8(0x60 + (len as u8 - 33));
                self.writer.ascii(s);
            } else {
                self.writer.u8(TOKEN_LONG_ASCII);
                self.writer.ascii(s);
                self.writer.u8(TOKEN_STRING_END);
            }
        } else if len <= 33 {
            self.writer.u8(0x80 + (len as u8 - 2));
            self.writer.utf8(s);
        } else if len <= 65 {
            self.writer.u8(0xa0 + (len as u8 - 34));
            self.writer.utf8(s);
        } else {
            self.writer.u8(TOKEN_LONG_UNICODE);
            self.writer.utf8(s);
            self.writer.u8(TOKEN_STRING_END);
        }
        if eligible {
            self.shared_values.append(s);
        }
    }

    pub fn write_arr(&mut self, arr: &[PackValue]) {
        self.writer.u8(TOKEN_START_ARRAY);
        for item in arr {
            self.write_any(item);
        }
        self.writer.u8(TOKEN_END_ARRAY);
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        self.writer.u8(TOKEN_START_OBJECT);
        for (key, val) in obj {
            self.write_key(key);
            self.write_any(val);
        }
        self.writer.u8(TOKEN_END_OBJECT);
    }

    /// Smile keys are strings; scalar map keys are written through their
    /// decimal/literal text, non-scalar keys degrade to the empty key.
    pub fn write_map(&mut self, map: &[(PackValue, PackValue)]) {
        self.writer.u8(TOKEN_START_OBJECT);
        for (key, val) in map {
            match key {
                PackValue::Str(s) => self.write_key(s),
                PackValue::Integer(i) => self.write_key(&i.to_string()),
                PackValue::UInteger(u) => self.write_key(&u.to_string()),
                PackValue::Bool(b) => self.write_key(if *b { "true" } else { "false" }),
                _ => self.write_key(""),
            }
            self.write_any(val);
        }
        self.writer.u8(TOKEN_END_OBJECT);
    }

    pub fn write_key(&mut self, key: &str) {
        if key.is_empty() {
            self.writer.u8(KEY_EMPTY);
            return;
        }
        let eligible = self.options.shared_property_names && shareable(key);
        if eligible {
            if let Some(index) = self.shared_keys.lookup(key) {
                if index <= 63 {
                    self.writer.u8(KEY_SHARED_SHORT + index as u8);
                } else {
                    self.writer.u8(KEY_SHARED_LONG | (index >> 8) as u8);
                    self.writer.u8((index & 0xff) as u8);
                }
                return;
            }
        }
        let len = key.len();
        if key.is_ascii() && len <= 64 {
            self.writer.u8(KEY_SHORT_ASCII + (len as u8 - 1));
            self.writer.ascii(key);
        } else if !key.is_ascii() && (2..=57).contains(&len) {
            self.writer.u8(KEY_SHORT_UNICODE + (len as u8 - 2));
            self.writer.utf8(key);
        } else {
            self.writer.u8(KEY_LONG_UNICODE);
            self.writer.utf8(key);
            self.writer.u8(TOKEN_STRING_END);
        }
        if eligible {
            self.shared_keys.append(key);
        }
    }

    /// Writes the optional end-of-content marker.
    pub fn write_end_of_content(&mut self) {
        self.writer.u8(TOKEN_END_CONTENT);
    }
}

/// Minimal big-endian two's-complement representation.
fn minimal_twos_complement(int: i128) -> Vec<u8> {
    let bytes = int.to_be_bytes();
    let mut start = 0;
    while start < 15 {
        let b = bytes[start];
        let next_msb = bytes[start + 1] & 0x80;
        if (b == 0x00 && next_msb == 0) || (b == 0xff && next_msb != 0) {
            start += 1;
        } else {
            break;
        }
    }
    bytes[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_twos_complement_trims() {
        assert_eq!(minimal_twos_complement(0), [0x00]);
        assert_eq!(minimal_twos_complement(1), [0x01]);
        assert_eq!(minimal_twos_complement(-1), [0xff]);
        assert_eq!(minimal_twos_complement(127), [0x7f]);
        assert_eq!(minimal_twos_complement(128), [0x00, 0x80]);
        assert_eq!(minimal_twos_complement(-128), [0x80]);
        assert_eq!(minimal_twos_complement(-129), [0xff, 0x7f]);
    }
}
