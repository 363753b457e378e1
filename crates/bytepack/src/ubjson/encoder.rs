//! UBJSON encoder.
//!
//! Markers: `Z` null, `N` no-op/undefined, `T`/`F` booleans, `U`/`i`/`I`/
//! `l`/`L` integers, `d`/`D` floats, `S` string, `[`/`]` arrays, `{`/`}`
//! objects, and the `[$U#` strongly-typed shorthand for binary.

use bytepack_buffers::Writer;

use crate::{PackValue, TypedArray};

pub struct UbjsonEncoder {
    pub writer: Writer,
}

impl Default for UbjsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl UbjsonEncoder {
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

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Null => self.writer.u8(b'Z'),
            PackValue::Undefined => self.writer.u8(b'N'),
            PackValue::Bool(b) => self.writer.u8(if *b { b'T' } else { b'F' }),
            PackValue::Integer(i) => self.write_integer(*i),
            PackValue::UInteger(u) => self.write_u_integer(*u),
            PackValue::Float(f) => self.write_float(*f),
            PackValue::BigInt(i) => self.write_big_int(*i),
            PackValue::Bytes(b) => self.write_bin(b),
            PackValue::Str(s) => self.write_str(s),
            PackValue::Array(arr) => self.write_arr(arr),
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Map(map) => self.write_map(map),
            PackValue::Blob(blob) => self.writer.buf(&blob.bytes),
            PackValue::TypedArray(arr) => self.write_typed_array(arr),
            PackValue::Extension(ext) => self.write_any(&ext.val),
        }
    }

    /// Writes an integer with the smallest marker that fits.
    pub fn write_integer(&mut self, int: i64) {
        if (0..=0xff).contains(&int) {
            self.writer.u8(b'U');
            self.writer.u8(int as u8);
        } else if (-128..=127).contains(&int) {
            self.writer.u8(b'i');
            self.writer.i8(int as i8);
        } else if (-32768..=32767).contains(&int) {
            self.writer.u8(b'I');
            self.writer.i16(int as i16);
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&int) {
            self.writer.u8(b'l');
            self.writer.i32(int as i32);
        } else {
            self.writer.u8(b'L');
            self.writer.i64(int);
        }
    }

    pub fn write_u_integer(&mut self, uint: u64) {
        if uint <= i64::MAX as u64 {
            self.write_integer(uint as i64);
        } else {
            // Out of the signed wire range; degrade to float64.
            self.write_float(uint as f64);
        }
    }

    pub fn write_big_int(&mut self, int: i128) {
        if int >= i64::MIN as i128 && int <= i64::MAX as i128 {
            self.write_integer(int as i64);
        } else {
            self.write_float(int as f64);
        }
    }

    pub fn write_float(&mut self, float: f64) {
        let narrowed = float as f32;
        if narrowed as f64 == float {
            self.writer.u8(b'd');
            self.writer.f32(narrowed);
        } else {
            self.writer.u8(b'D');
            self.writer.f64(float);
        }
    }

    /// Binary uses the strongly-typed uint8 array shorthand `[$U#<count>`.
    pub fn write_bin(&mut self, buf: &[u8]) {
        self.writer.u32(0x5b_24_55_23); // "[$U#"
        self.write_integer(buf.len() as i64);
        self.writer.buf(buf);
    }

    /// Strongly-typed arrays: `[$<type>#<count>` then packed big-endian
    /// elements. Kinds without a UBJSON numeric marker fall back to a plain
    /// array.
    pub fn write_typed_array(&mut self, arr: &TypedArray) {
        let marker = match arr {
            TypedArray::U8(_) => b'U',
            TypedArray::I8(_) => b'i',
            TypedArray::I16(_) => b'I',
            TypedArray::I32(_) => b'l',
            TypedArray::I64(_) => b'L',
            TypedArray::F32(_) => b'd',
            TypedArray::F64(_) => b'D',
            _ => {
                self.write_arr(&arr.to_values());
                return;
            }
        };
        self.writer.u8(b'[');
        self.writer.u8(b'$');
        self.writer.u8(marker);
        self.writer.u8(b'#');
        self.write_integer(arr.len() as i64);
        match arr {
            TypedArray::U8(v) => self.writer.buf(v),
            TypedArray::I8(v) => v.iter().for_each(|&n| self.writer.i8(n)),
            TypedArray::I16(v) => v.iter().for_each(|&n| self.writer.i16(n)),
            TypedArray::I32(v) => v.iter().for_each(|&n| self.writer.i32(n)),
            TypedArray::I64(v) => v.iter().for_each(|&n| self.writer.i64(n)),
            TypedArray::F32(v) => v.iter().for_each(|&n| self.writer.f32(n)),
            TypedArray::F64(v) => v.iter().for_each(|&n| self.writer.f64(n)),
            _ => unreachable!("handled above"),
        }
    }

    /// String: `S` + length integer + UTF-8 bytes. Header space is reserved
    /// from the worst-case size and the actual byte count patched back.
    pub fn write_str(&mut self, s: &str) {
        self.writer.u8(b'S');
        self.write_length_and_bytes(s);
    }

    /// Object key: length integer + UTF-8 bytes, no `S` marker.
    pub fn write_key(&mut self, s: &str) {
        self.write_length_and_bytes(s);
    }

    fn write_length_and_bytes(&mut self, s: &str) {
        let max_len = s.chars().count() * 4;
        self.writer.ensure_capacity(max_len + 5);
        let x = self.writer.x;
        if max_len < 0xff {
            self.writer.uint8[x] = b'U';
            self.writer.x = x + 2;
            let actual = self.writer.utf8(s);
            self.writer.uint8[x + 1] = actual as u8;
        } else {
            self.writer.uint8[x] = b'l';
            self.writer.x = x + 5;
            let actual = self.writer.utf8(s);
            self.writer.uint8[x + 1..x + 5].copy_from_slice(&(actual as u32).to_be_bytes());
        }
    }

    pub fn write_arr(&mut self, arr: &[PackValue]) {
        self.writer.u8(b'[');
        for item in arr {
            self.write_any(item);
        }
        self.writer.u8(b']');
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        self.writer.u8(b'{');
        for (key, val) in obj {
            self.write_key(key);
            self.write_any(val);
        }
        self.writer.u8(b'}');
    }

    /// UBJSON keys are strings; non-string map keys degrade to their
    /// decimal text.
    pub fn write_map(&mut self, map: &[(PackValue, PackValue)]) {
        self.writer.u8(b'{');
        for (key, val) in map {
            match key {
                PackValue::Str(s) => self.write_key(s),
                PackValue::Integer(i) => self.write_key(&i.to_string()),
                PackValue::UInteger(u) => self.write_key(&u.to_string()),
                _ => self.write_key(""),
            }
            self.write_any(val);
        }
        self.writer.u8(b'}');
    }
}
