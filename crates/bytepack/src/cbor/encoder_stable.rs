//! CBOR encoder with deterministic output.

use super::encoder::CborEncoder;
use crate::PackValue;

/// CBOR encoder that sorts object keys lexicographically and uses exact
/// string headers, so equivalent values produce byte-identical output.
pub struct CborEncoderStable {
    pub inner: CborEncoder,
}

impl Default for CborEncoderStable {
    fn default() -> Self {
        Self::new()
    }
}

impl CborEncoderStable {
    pub fn new() -> Self {
        Self {
            inner: CborEncoder::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.inner.inner.writer.reset();
        self.write_any(value);
        self.inner.inner.writer.flush()
    }

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Array(arr) => {
                self.inner.inner.write_arr_hdr(arr.len());
                for item in arr {
                    self.write_any(item);
                }
            }
            PackValue::Str(s) => self.inner.inner.write_str_exact(s),
            PackValue::Extension(ext) => {
                self.inner.inner.write_tag_hdr(ext.tag);
                self.write_any(&ext.val);
            }
            other => self.inner.write_any(other),
        }
    }

    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) {
        let mut indices: Vec<usize> = (0..obj.len()).collect();
        indices.sort_by(|&a, &b| obj[a].0.cmp(&obj[b].0));
        self.inner.inner.write_obj_hdr(obj.len());
        for idx in indices {
            let (key, val) = &obj[idx];
            self.inner.inner.write_str_exact(key);
            self.write_any(val);
        }
    }
}
