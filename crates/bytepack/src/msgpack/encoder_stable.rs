//! MessagePack encoder with deterministic output.

use super::encoder_fast::MsgPackEncoderFast;
use crate::PackValue;

/// MessagePack encoder that sorts object keys lexicographically and uses
/// exact string headers, so equivalent values produce identical bytes.
pub struct MsgPackEncoderStable {
    pub inner: MsgPackEncoderFast,
}

impl Default for MsgPackEncoderStable {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgPackEncoderStable {
    pub fn new() -> Self {
        Self {
            inner: MsgPackEncoderFast::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.inner.writer.reset();
        self.write_any(value);
        self.inner.writer.flush()
    }

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Array(arr) => {
                self.inner.write_arr_hdr(arr.len());
                for item in arr {
                    self.write_any(item);
                }
            }
            PackValue::Str(s) => self.write_str(s),
            other => self.inner.write_any(other),
        }
    }

    /// Exact-length string header; the patch-back guess would make output
    /// depend on character widths.
    pub fn write_str(&mut self, s: &str) {
        self.inner.write_str_hdr(s.len());
        self.inner.writer.utf8(s);
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        let mut indices: Vec<usize> = (0..obj.len()).collect();
        indices.sort_by(|&a, &b| obj[a].0.cmp(&obj[b].0));
        self.inner.write_obj_hdr(obj.len());
        for idx in indices {
            let (key, val) = &obj[idx];
            self.write_str(key);
            self.write_any(val);
        }
    }
}
