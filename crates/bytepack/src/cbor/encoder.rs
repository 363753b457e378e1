//! Full CBOR encoder: bignums, typed arrays, tags, and undefined.

use super::constants::{
    MAJOR_NINT, MAJOR_UINT, TAG_DATE_DAYS, TAG_DATE_STRING, TAG_HOMOGENEOUS, TAG_MULTI_DIM,
    TAG_MULTI_DIM_COLUMN, TAG_NEG_BIGNUM, TAG_POS_BIGNUM, TOKEN_UNDEFINED,
};
use super::encoder_fast::CborEncoderFast;
use crate::{PackValue, TypedArray};

/// Full CBOR encoder.
///
/// Extends the fast core with undefined, big integers (bignum tags 2/3 when
/// the value leaves the 64-bit wire range), tagged extensions, RFC 8746
/// typed-array tags, and the RFC 8943 date helpers.
pub struct CborEncoder {
    pub inner: CborEncoderFast,
}

impl Default for CborEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CborEncoder {
    pub fn new() -> Self {
        Self {
            inner: CborEncoderFast::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.inner.writer.reset();
        self.write_any(value);
        self.inner.writer.flush()
    }

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Undefined => self.inner.writer.u8(TOKEN_UNDEFINED),
            PackValue::BigInt(i) => self.write_big_int(*i),
            PackValue::TypedArray(arr) => self.write_typed_array(arr),
            PackValue::Extension(ext) => {
                self.inner.write_tag_hdr(ext.tag);
                self.write_any(&ext.val);
            }
            PackValue::Array(arr) => {
                self.inner.write_arr_hdr(arr.len());
                for item in arr {
                    self.write_any(item);
                }
            }
            PackValue::Object(obj) => {
                self.inner.write_obj_hdr(obj.len());
                for (key, val) in obj {
                    self.inner.write_str(key);
                    self.write_any(val);
                }
            }
            PackValue::Map(map) => {
                self.inner.write_obj_hdr(map.len());
                for (key, val) in map {
                    self.write_any(key);
                    self.write_any(val);
                }
            }
            other => self.inner.write_any(other),
        }
    }

    /// Writes a big integer: native major 0/1 when the argument fits 64
    /// bits, bignum tag 2/3 with a big-endian magnitude otherwise.
    pub fn write_big_int(&mut self, int: i128) {
        if int >= 0 {
            if int <= u64::MAX as i128 {
                self.inner.write_head(MAJOR_UINT, int as u64);
            } else {
                self.inner.write_tag_hdr(TAG_POS_BIGNUM);
                self.write_magnitude(int as u128);
            }
        } else {
            let encoded = -1i128 - int; // >= 0
            if encoded <= u64::MAX as i128 {
                self.inner.write_head(MAJOR_NINT, encoded as u64);
            } else {
                self.inner.write_tag_hdr(TAG_NEG_BIGNUM);
                self.write_magnitude(encoded as u128);
            }
        }
    }

    fn write_magnitude(&mut self, n: u128) {
        let bytes = n.to_be_bytes();
        let skip = bytes.iter().take_while(|&&b| b == 0).count();
        self.inner.write_bin(&bytes[skip.min(15)..]);
    }

    /// Writes a tagged value.
    pub fn write_tag(&mut self, tag: u64, value: &PackValue) {
        self.inner.write_tag_hdr(tag);
        self.write_any(value);
    }

    /// Writes a typed array as its RFC 8746 tag wrapping a byte string.
    /// Element bytes are little-endian, so the little-endian tag flavors are
    /// used; the half- and quad-float tags are never produced.
    pub fn write_typed_array(&mut self, arr: &TypedArray) {
        let tag: u64 = match arr {
            TypedArray::U8(_) => 64,
            TypedArray::U16(_) => 69,
            TypedArray::U32(_) => 70,
            TypedArray::U64(_) => 71,
            TypedArray::I8(_) => 72,
            TypedArray::I16(_) => 77,
            TypedArray::I32(_) => 78,
            TypedArray::I64(_) => 79,
            TypedArray::F32(_) => 85,
            TypedArray::F64(_) => 86,
        };
        self.inner.write_tag_hdr(tag);
        self.inner.write_bin(&arr.to_le_bytes());
    }

    /// Writes a multi-dimensional, row-major array (tag 40): a two-element
    /// array of the dimension list and the flat data.
    pub fn write_multi_dim(&mut self, dims: &[usize], data: &PackValue) {
        self.write_multi_dim_tagged(TAG_MULTI_DIM, dims, data);
    }

    /// Writes a multi-dimensional, column-major array (tag 1040).
    pub fn write_multi_dim_column_major(&mut self, dims: &[usize], data: &PackValue) {
        self.write_multi_dim_tagged(TAG_MULTI_DIM_COLUMN, dims, data);
    }

    fn write_multi_dim_tagged(&mut self, tag: u64, dims: &[usize], data: &PackValue) {
        self.inner.write_tag_hdr(tag);
        self.inner.write_arr_hdr(2);
        self.inner.write_arr_hdr(dims.len());
        for &d in dims {
            self.inner.write_u_integer(d as u64);
        }
        self.write_any(data);
    }

    /// Writes a homogeneous array (tag 41).
    pub fn write_homogeneous(&mut self, arr: &[PackValue]) {
        self.inner.write_tag_hdr(TAG_HOMOGENEOUS);
        self.inner.write_arr_hdr(arr.len());
        for item in arr {
            self.write_any(item);
        }
    }

    /// Writes a date as days since 1970-01-01 (tag 100).
    pub fn write_date_epoch_days(&mut self, days: i64) {
        self.inner.write_tag_hdr(TAG_DATE_DAYS);
        self.inner.write_integer(days);
    }

    /// Writes a date as an RFC 3339 full-date string (tag 1004).
    pub fn write_date_string(&mut self, date: &str) {
        self.inner.write_tag_hdr(TAG_DATE_STRING);
        self.inner.write_str(date);
    }
}
