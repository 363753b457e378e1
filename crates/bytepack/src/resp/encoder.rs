//! RESP3 encoder.
//!
//! Type bytes: `_` null, `#` boolean, `:` integer, `,` double, `(` big
//! number, `+` simple string, `$` bulk string (and binary), `*` array, `%`
//! map, `~` set, `>` push, `=` verbatim string.

use bytepack_buffers::Writer;

use crate::PackValue;

const CRLF: &[u8] = b"\r\n";

pub struct RespEncoder {
    pub writer: Writer,
}

impl Default for RespEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RespEncoder {
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
            PackValue::UInteger(u) => self.write_big_number(&u.to_string()),
            PackValue::Float(f) => self.write_double(*f),
            PackValue::BigInt(i) => self.write_big_number(&i.to_string()),
            PackValue::Bytes(b) => self.write_bulk(b),
            PackValue::Str(s) => self.write_str(s),
            PackValue::Array(arr) => self.write_arr(arr),
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Map(map) => self.write_map(map),
            PackValue::Blob(blob) => self.writer.buf(&blob.bytes),
            PackValue::TypedArray(arr) => self.write_arr(&arr.to_values()),
            PackValue::Extension(ext) => self.write_any(&ext.val),
        }
    }

    pub fn write_null(&mut self) {
        self.writer.buf(b"_\r\n");
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.writer.buf(if b { b"#t\r\n" } else { b"#f\r\n" });
    }

    pub fn write_integer(&mut self, int: i64) {
        self.writer.u8(b':');
        self.writer.ascii(&int.to_string());
        self.writer.buf(CRLF);
    }

    /// RESP3 big number: `(<decimal>\r\n`.
    pub fn write_big_number(&mut self, digits: &str) {
        self.writer.u8(b'(');
        self.writer.ascii(digits);
        self.writer.buf(CRLF);
    }

    pub fn write_double(&mut self, float: f64) {
        self.writer.u8(b',');
        if float.is_nan() {
            self.writer.ascii("nan");
        } else if float == f64::INFINITY {
            self.writer.ascii("inf");
        } else if float == f64::NEG_INFINITY {
            self.writer.ascii("-inf");
        } else {
            self.writer.ascii(&format!("{float}"));
        }
        self.writer.buf(CRLF);
    }

    /// Simple string when the text is CRLF-free, bulk string otherwise.
    pub fn write_str(&mut self, s: &str) {
        if s.bytes().any(|b| b == b'\r' || b == b'\n') {
            self.write_bulk(s.as_bytes());
        } else {
            self.writer.u8(b'+');
            self.writer.utf8(s);
            self.writer.buf(CRLF);
        }
    }

    /// Simple error: `-<message>\r\n`.
    pub fn write_simple_error(&mut self, message: &str) {
        self.writer.u8(b'-');
        self.writer.utf8(message);
        self.writer.buf(CRLF);
    }

    /// Verbatim string: `=<len>\r\ntxt:<content>\r\n`.
    pub fn write_verbatim_str(&mut self, s: &str) {
        self.writer.u8(b'=');
        self.writer.ascii(&(s.len() + 4).to_string());
        self.writer.buf(CRLF);
        self.writer.ascii("txt:");
        self.writer.utf8(s);
        self.writer.buf(CRLF);
    }

    pub fn write_bulk(&mut self, data: &[u8]) {
        self.writer.u8(b'$');
        self.writer.ascii(&data.len().to_string());
        self.writer.buf(CRLF);
        self.writer.buf(data);
        self.writer.buf(CRLF);
    }

    pub fn write_arr(&mut self, arr: &[PackValue]) {
        self.writer.u8(b'*');
        self.writer.ascii(&arr.len().to_string());
        self.writer.buf(CRLF);
        for item in arr {
            self.write_any(item);
        }
    }

    /// RESP3 push: `><len>\r\n<items>`.
    pub fn write_push(&mut self, arr: &[PackValue]) {
        self.writer.u8(b'>');
        self.writer.ascii(&arr.len().to_string());
        self.writer.buf(CRLF);
        for item in arr {
            self.write_any(item);
        }
    }

    /// RESP3 set: `~<len>\r\n<items>`.
    pub fn write_set(&mut self, arr: &[PackValue]) {
        self.writer.u8(b'~');
        self.writer.ascii(&arr.len().to_string());
        self.writer.buf(CRLF);
        for item in arr {
            self.write_any(item);
        }
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        self.writer.u8(b'%');
        self.writer.ascii(&obj.len().to_string());
        self.writer.buf(CRLF);
        for (key, val) in obj {
            self.write_str(key);
            self.write_any(val);
        }
    }

    pub fn write_map(&mut self, map: &[(PackValue, PackValue)]) {
        self.writer.u8(b'%');
        self.writer.ascii(&map.len().to_string());
        self.writer.buf(CRLF);
        for (key, val) in map {
            self.write_any(key);
            self.write_any(val);
        }
    }
}
