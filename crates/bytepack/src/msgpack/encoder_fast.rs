//! Fast MessagePack encoder for the JSON subset of the value model.

use bytepack_buffers::Writer;

use super::constants;
use crate::{PackValue, RawValue};

/// Fast MessagePack encoder.
///
/// Handles the JSON subset with minimal dispatch. Variants outside that
/// subset fall back to the closest JSON-compatible shape; use
/// [`MsgPackEncoder`](super::MsgPackEncoder) for full fidelity.
pub struct MsgPackEncoderFast {
    pub writer: Writer,
}

impl Default for MsgPackEncoderFast {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgPackEncoderFast {
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
            PackValue::Null | PackValue::Undefined => self.write_null(),
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
            PackValue::Blob(blob) => self.write_blob(blob),
            PackValue::TypedArray(arr) => self.write_arr(&arr.to_values()),
            PackValue::Extension(_) => self.write_null(),
        }
    }

    /// Copies a pre-encoded MessagePack value verbatim.
    pub fn write_blob(&mut self, blob: &RawValue) {
        self.writer.buf(&blob.bytes);
    }

    pub fn write_null(&mut self) {
        self.writer.u8(constants::NIL);
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.writer
            .u8(if b { constants::TRUE } else { constants::FALSE });
    }

    pub fn write_float(&mut self, float: f64) {
        let narrowed = float as f32;
        if narrowed as f64 == float {
            self.writer.u8f32(constants::FLOAT32, narrowed);
        } else {
            self.writer.u8f64(constants::FLOAT64, float);
        }
    }

    /// Writes a non-negative integer in the narrowest unsigned form.
    pub fn write_unsigned(&mut self, num: u64) {
        if num <= 0x7f {
            self.writer.u8(num as u8);
        } else if num <= 0xff {
            self.writer.u16(0xcc00 | num as u16);
        } else if num <= 0xffff {
            self.writer.u8u16(0xcd, num as u16);
        } else if num <= 0xffff_ffff {
            self.writer.u8u32(0xce, num as u32);
        } else {
            self.writer.u8u64(0xcf, num);
        }
    }

    /// Writes a negative integer in the narrowest signed form.
    pub fn write_negative(&mut self, num: i64) {
        if num >= -0x20 {
            self.writer.u8((0x100 + num) as u8);
        } else if num >= -0x80 {
            self.writer.u8(0xd0);
            self.writer.i8(num as i8);
        } else if num >= -0x8000 {
            self.writer.u8u16(0xd1, num as i16 as u16);
        } else if num >= -0x8000_0000 {
            self.writer.u8u32(0xd2, num as i32 as u32);
        } else {
            self.writer.u8u64(0xd3, num as u64);
        }
    }

    pub fn write_integer(&mut self, int: i64) {
        if int >= 0 {
            self.write_unsigned(int as u64);
        } else {
            self.write_negative(int);
        }
    }

    pub fn write_u_integer(&mut self, uint: u64) {
        self.write_unsigned(uint);
    }

    pub fn write_big_int(&mut self, int: i128) {
        if int >= 0 && int <= u64::MAX as i128 {
            self.write_unsigned(int as u64);
        } else if int >= i64::MIN as i128 && int < 0 {
            self.write_negative(int as i64);
        } else {
            self.write_float(int as f64);
        }
    }

    pub fn write_str_hdr(&mut self, length: usize) {
        if length <= 0x1f {
            self.writer.u8(0xa0 | length as u8);
        } else if length <= 0xff {
            self.writer.u16(0xd900 | length as u16);
        } else if length <= 0xffff {
            self.writer.u8u16(constants::STR16, length as u16);
        } else {
            self.writer.u8u32(constants::STR32, length as u32);
        }
    }

    /// Writes a string, reserving header space from the 4-bytes-per-char
    /// worst case and patching the actual byte count back in.
    pub fn write_str(&mut self, s: &str) {
        let max_size = s.chars().count() * 4;
        self.writer.ensure_capacity(5 + max_size);

        let length_offset;
        if max_size <= 0x1f {
            length_offset = self.writer.x;
            self.writer.x += 1;
        } else if max_size <= 0xff {
            self.writer.uint8[self.writer.x] = constants::STR8;
            self.writer.x += 1;
            length_offset = self.writer.x;
            self.writer.x += 1;
        } else if max_size <= 0xffff {
            self.writer.uint8[self.writer.x] = constants::STR16;
            self.writer.x += 1;
            length_offset = self.writer.x;
            self.writer.x += 2;
        } else {
            self.writer.uint8[self.writer.x] = constants::STR32;
            self.writer.x += 1;
            length_offset = self.writer.x;
            self.writer.x += 4;
        }

        let written = self.writer.utf8(s);

        if max_size <= 0x1f {
            self.writer.uint8[length_offset] = 0xa0 | written as u8;
        } else if max_size <= 0xff {
            self.writer.uint8[length_offset] = written as u8;
        } else if max_size <= 0xffff {
            self.writer.uint8[length_offset..length_offset + 2]
                .copy_from_slice(&(written as u16).to_be_bytes());
        } else {
            self.writer.uint8[length_offset..length_offset + 4]
                .copy_from_slice(&(written as u32).to_be_bytes());
        }
    }

    /// Writes a known-ASCII string with an exact header.
    pub fn write_ascii_str(&mut self, s: &str) {
        self.write_str_hdr(s.len());
        self.writer.ascii(s);
    }

    pub fn write_arr_hdr(&mut self, length: usize) {
        if length <= 0xf {
            self.writer.u8(0x90 | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(constants::ARR16, length as u16);
        } else {
            self.writer.u8u32(constants::ARR32, length as u32);
        }
    }

    pub fn write_arr(&mut self, arr: &[PackValue]) {
        self.write_arr_hdr(arr.len());
        for item in arr {
            self.write_any(item);
        }
    }

    pub fn write_obj_hdr(&mut self, length: usize) {
        if length <= 0xf {
            self.writer.u8(0x80 | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(constants::MAP16, length as u16);
        } else {
            self.writer.u8u32(constants::MAP32, length as u32);
        }
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        self.write_obj_hdr(obj.len());
        for (key, val) in obj {
            self.write_str(key);
            self.write_any(val);
        }
    }

    /// Writes a map whose keys are arbitrary values.
    pub fn write_map(&mut self, map: &[(PackValue, PackValue)]) {
        self.write_obj_hdr(map.len());
        for (key, val) in map {
            self.write_any(key);
            self.write_any(val);
        }
    }

    pub fn write_bin_hdr(&mut self, length: usize) {
        if length <= 0xff {
            self.writer.u16((constants::BIN8 as u16) << 8 | length as u16);
        } else if length <= 0xffff {
            self.writer.u8u16(constants::BIN16, length as u16);
        } else {
            self.writer.u8u32(constants::BIN32, length as u32);
        }
    }

    pub fn write_bin(&mut self, buf: &[u8]) {
        self.write_bin_hdr(buf.len());
        self.writer.buf(buf);
    }
}
