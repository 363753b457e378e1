//! JSON encoder with deterministic key order.

use super::encoder::JsonEncoder;
use crate::PackValue;

/// JSON encoder that sorts object keys by Unicode code point, so equivalent
/// objects produce byte-identical output.
pub struct JsonEncoderStable {
    pub inner: JsonEncoder,
}

impl Default for JsonEncoderStable {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonEncoderStable {
    pub fn new() -> Self {
        Self {
            inner: JsonEncoder::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.inner.writer.reset();
        self.write_any(value);
        self.inner.writer.flush()
    }

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Array(arr) => {
                self.inner.writer.u8(b'[');
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        self.inner.writer.u8(b',');
                    }
                    self.write_any(item);
                }
                self.inner.writer.u8(b']');
            }
            PackValue::Object(obj) => self.write_obj(obj),
            other => self.inner.write_any(other),
        }
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        let mut indices: Vec<usize> = (0..obj.len()).collect();
        indices.sort_by(|&a, &b| obj[a].0.cmp(&obj[b].0));
        self.inner.writer.u8(b'{');
        for (i, &idx) in indices.iter().enumerate() {
            let (key, val) = &obj[idx];
            if i > 0 {
                self.inner.writer.u8(b',');
            }
            self.inner.write_str(key);
            self.inner.writer.u8(b':');
            self.write_any(val);
        }
        self.inner.writer.u8(b'}');
    }
}
