//! Bencode encoder.
//!
//! Wire format: `i<decimal>e` integers, `<len>:<bytes>` strings, `l…e`
//! lists, `d…e` dictionaries with sorted keys, plus the common `t`/`f`/`n`/
//! `u` extensions for booleans, null, and undefined.

use bytepack_buffers::Writer;

use crate::PackValue;

pub struct BencodeEncoder {
    pub writer: Writer,
}

impl Default for BencodeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BencodeEncoder {
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
            PackValue::Null => self.writer.u8(b'n'),
            PackValue::Undefined => self.writer.u8(b'u'),
            PackValue::Bool(b) => self.writer.u8(if *b { b't' } else { b'f' }),
            PackValue::Integer(i) => self.write_integer(*i),
            PackValue::UInteger(u) => self.write_ascii_num(&u.to_string()),
            PackValue::Float(f) => self.write_integer(f.round() as i64),
            PackValue::BigInt(i) => self.write_ascii_num(&i.to_string()),
            PackValue::Bytes(b) => self.write_bin(b),
            PackValue::Str(s) => self.write_str(s),
            PackValue::Array(arr) => self.write_arr(arr),
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Map(map) => self.write_map(map),
            PackValue::Blob(blob) => self.writer.buf(&blob.bytes),
            PackValue::TypedArray(arr) => self.write_arr(&arr.to_values()),
            PackValue::Extension(ext) => self.write_any(&ext.val),
        }
    }

    pub fn write_integer(&mut self, int: i64) {
        self.write_ascii_num(&int.to_string());
    }

    fn write_ascii_num(&mut self, digits: &str) {
        self.writer.u8(b'i');
        self.writer.ascii(digits);
        self.writer.u8(b'e');
    }

    pub fn write_bin(&mut self, buf: &[u8]) {
        self.writer.ascii(&buf.len().to_string());
        self.writer.u8(b':');
        self.writer.buf(buf);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bin(s.as_bytes());
    }

    pub fn write_arr(&mut self, arr: &[PackValue]) {
        self.writer.u8(b'l');
        for item in arr {
            self.write_any(item);
        }
        self.writer.u8(b'e');
    }

    /// Dictionary keys are byte-sorted, as the format requires.
    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        let mut indices: Vec<usize> = (0..obj.len()).collect();
        indices.sort_by(|&a, &b| obj[a].0.as_bytes().cmp(obj[b].0.as_bytes()));
        self.writer.u8(b'd');
        for idx in indices {
            let (key, val) = &obj[idx];
            self.write_str(key);
            self.write_any(val);
        }
        self.writer.u8(b'e');
    }

    pub fn write_map(&mut self, map: &[(PackValue, PackValue)]) {
        let entries: Vec<(String, PackValue)> = map
            .iter()
            .filter_map(|(k, v)| match k {
                PackValue::Str(s) => Some((s.clone(), v.clone())),
                PackValue::Integer(i) => Some((i.to_string(), v.clone())),
                _ => None,
            })
            .collect();
        self.write_obj(&entries);
    }
}
