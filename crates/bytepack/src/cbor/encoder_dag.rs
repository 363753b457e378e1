//! DAG-CBOR encoder profile.

use super::constants::{TAG_CID, TOKEN_F64};
use super::encoder::CborEncoder;
use super::error::CborError;
use crate::PackValue;

/// DAG-CBOR encoder.
///
/// Deterministic profile for content addressing: keys are ordered by length
/// then lexicographically, floats are always 64-bit with NaN and infinities
/// rejected and -0.0 folded to +0.0, and tag 42 is the only tag admitted.
pub struct CborEncoderDag {
    pub inner: CborEncoder,
}

impl Default for CborEncoderDag {
    fn default() -> Self {
        Self::new()
    }
}

impl CborEncoderDag {
    pub fn new() -> Self {
        Self {
            inner: CborEncoder::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Result<Vec<u8>, CborError> {
        self.inner.inner.writer.reset();
        self.write_any(value)?;
        Ok(self.inner.inner.writer.flush())
    }

    pub fn write_any(&mut self, value: &PackValue) -> Result<(), CborError> {
        match value {
            PackValue::Float(f) => self.write_float(*f),
            PackValue::Object(obj) => self.write_obj(obj),
            PackValue::Array(arr) => {
                self.inner.inner.write_arr_hdr(arr.len());
                for item in arr {
                    self.write_any(item)?;
                }
                Ok(())
            }
            PackValue::Str(s) => {
                self.inner.inner.write_str_exact(s);
                Ok(())
            }
            PackValue::Extension(ext) => {
                if ext.tag != TAG_CID {
                    return Err(CborError::UnsupportedValue);
                }
                self.inner.inner.write_tag_hdr(TAG_CID);
                self.write_any(&ext.val)
            }
            PackValue::Undefined | PackValue::TypedArray(_) | PackValue::Map(_) => {
                Err(CborError::UnsupportedValue)
            }
            other => {
                self.inner.write_any(other);
                Ok(())
            }
        }
    }

    /// Always 64-bit; rejects non-finite values; folds -0.0 into +0.0.
    pub fn write_float(&mut self, float: f64) -> Result<(), CborError> {
        if !float.is_finite() {
            return Err(CborError::UnsupportedValue);
        }
        let canonical = if float == 0.0 { 0.0 } else { float };
        self.inner.inner.writer.u8f64(TOKEN_F64, canonical);
        Ok(())
    }

    /// Keys sorted by byte length, ties broken lexicographically.
    pub fn write_obj(&mut self, obj: &[(String, PackValue)]) -> Result<(), CborError> {
        let mut indices: Vec<usize> = (0..obj.len()).collect();
        indices.sort_by(|&a, &b| {
            let (ka, kb) = (&obj[a].0, &obj[b].0);
            ka.len().cmp(&kb.len()).then_with(|| ka.cmp(kb))
        });
        self.inner.inner.write_obj_hdr(obj.len());
        for idx in indices {
            let (key, val) = &obj[idx];
            self.inner.inner.write_str_exact(key);
            self.write_any(val)?;
        }
        Ok(())
    }
}
