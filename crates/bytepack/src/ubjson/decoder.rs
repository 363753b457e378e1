//! UBJSON decoder.

use bytepack_buffers::{BufferError, Reader};

use super::error::UbjsonError;
use crate::typed_array::elems;
use crate::{PackValue, TypedArray, DEFAULT_MAX_DEPTH};

/// UBJSON decoder. Strongly-typed arrays reconstruct as
/// [`PackValue::TypedArray`] (uint8 shorthand as [`PackValue::Bytes`]).
pub struct UbjsonDecoder<'a> {
    pub reader: Reader<'a>,
    max_depth: usize,
    depth: usize,
}

impl Default for UbjsonDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> UbjsonDecoder<'a> {
    pub fn new() -> Self {
        Self {
            reader: Reader::new(&[]),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, UbjsonError> {
        self.reader.reset(input);
        self.depth = 0;
        self.read_any()
    }

    #[inline]
    fn end(&self) -> UbjsonError {
        UbjsonError::UnexpectedEnd(self.reader.x)
    }

    #[inline]
    fn u8(&mut self) -> Result<u8, UbjsonError> {
        self.reader.try_u8().map_err(|_| self.end())
    }

    fn utf8(&mut self, len: usize) -> Result<String, UbjsonError> {
        let at = self.reader.x;
        match self.reader.try_utf8(len) {
            Ok(s) => Ok(s.to_owned()),
            Err(BufferError::InvalidUtf8) => Err(UbjsonError::InvalidUtf8(at)),
            Err(BufferError::EndOfBuffer) => Err(UbjsonError::UnexpectedEnd(at)),
        }
    }

    pub fn read_any(&mut self) -> Result<PackValue, UbjsonError> {
        let offset = self.reader.x;
        let marker = self.u8()?;
        match marker {
            b'Z' => Ok(PackValue::Null),
            b'N' => Ok(PackValue::Undefined),
            b'T' => Ok(PackValue::Bool(true)),
            b'F' => Ok(PackValue::Bool(false)),
            b'U' => Ok(PackValue::Integer(self.u8()? as i64)),
            b'i' => Ok(PackValue::Integer(
                self.reader.try_i8().map_err(|_| self.end())? as i64,
            )),
            b'I' => Ok(PackValue::Integer(
                self.reader.try_i16().map_err(|_| self.end())? as i64,
            )),
            b'l' => Ok(PackValue::Integer(
                self.reader.try_i32().map_err(|_| self.end())? as i64,
            )),
            b'L' => Ok(PackValue::Integer(
                self.reader.try_i64().map_err(|_| self.end())?,
            )),
            b'd' => Ok(PackValue::Float(
                self.reader.try_f32().map_err(|_| self.end())? as f64,
            )),
            b'D' => Ok(PackValue::Float(
                self.reader.try_f64().map_err(|_| self.end())?,
            )),
            b'C' => {
                let byte = self.u8()?;
                Ok(PackValue::Str((byte as char).to_string()))
            }
            b'S' => {
                let len = self.read_length()?;
                self.utf8(len).map(PackValue::Str)
            }
            b'[' => self.read_arr(),
            b'{' => self.read_obj(),
            marker => Err(UbjsonError::UnexpectedMarker { marker, offset }),
        }
    }

    /// Reads a length expressed as any UBJSON integer value.
    fn read_length(&mut self) -> Result<usize, UbjsonError> {
        match self.read_any()? {
            PackValue::Integer(i) if i >= 0 => Ok(i as usize),
            _ => Err(UbjsonError::InvalidLength),
        }
    }

    fn read_arr(&mut self) -> Result<PackValue, UbjsonError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(UbjsonError::DepthExceeded);
        }
        // Strongly-typed form: `$<type>` then `#<count>`.
        let mut elem_type: Option<u8> = None;
        if self.reader.peek() == Ok(b'$') {
            self.reader.skip(1);
            elem_type = Some(self.u8()?);
        }
        let mut count: Option<usize> = None;
        if self.reader.peek() == Ok(b'#') {
            self.reader.skip(1);
            count = Some(self.read_length()?);
        }

        let value = match (elem_type, count) {
            (Some(marker), Some(n)) => self.read_typed(marker, n)?,
            (Some(marker), None) => {
                let offset = self.reader.x;
                return Err(UbjsonError::UnexpectedMarker { marker, offset });
            }
            (None, Some(n)) => {
                let mut arr = Vec::with_capacity(n.min(4096));
                for _ in 0..n {
                    arr.push(self.read_any()?);
                }
                PackValue::Array(arr)
            }
            (None, None) => {
                let mut arr = Vec::new();
                loop {
                    if self.reader.peek().map_err(|_| self.end())? == b']' {
                        self.reader.skip(1);
                        break;
                    }
                    arr.push(self.read_any()?);
                }
                PackValue::Array(arr)
            }
        };
        self.depth -= 1;
        Ok(value)
    }

    /// Reads `count` packed big-endian elements of the given marker type.
    fn read_typed(&mut self, marker: u8, count: usize) -> Result<PackValue, UbjsonError> {
        let word = match marker {
            b'U' | b'i' => 1,
            b'I' => 2,
            b'l' | b'd' => 4,
            b'L' | b'D' => 8,
            _ => {
                let offset = self.reader.x;
                return Err(UbjsonError::UnexpectedMarker { marker, offset });
            }
        };
        let total = count.checked_mul(word).ok_or(UbjsonError::InvalidLength)?;
        let data = self.reader.try_buf(total).map_err(|_| self.end())?;
        Ok(match marker {
            b'U' => PackValue::Bytes(data.to_vec()),
            b'i' => PackValue::TypedArray(TypedArray::I8(
                data.iter().map(|&b| b as i8).collect(),
            )),
            b'I' => PackValue::TypedArray(TypedArray::I16(elems::i16_be(data))),
            b'l' => PackValue::TypedArray(TypedArray::I32(elems::i32_be(data))),
            b'L' => PackValue::TypedArray(TypedArray::I64(elems::i64_be(data))),
            b'd' => PackValue::TypedArray(TypedArray::F32(elems::f32_be(data))),
            b'D' => PackValue::TypedArray(TypedArray::F64(elems::f64_be(data))),
            _ => unreachable!("filtered above"),
        })
    }

    fn read_obj(&mut self) -> Result<PackValue, UbjsonError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(UbjsonError::DepthExceeded);
        }
        let mut obj = Vec::new();
        loop {
            if self.reader.peek().map_err(|_| self.end())? == b'}' {
                self.reader.skip(1);
                break;
            }
            let key_len = self.read_length()?;
            let key = self.utf8(key_len)?;
            if key == "__proto__" {
                return Err(UbjsonError::ProtoKeyForbidden);
            }
            let val = self.read_any()?;
            obj.push((key, val));
        }
        self.depth -= 1;
        Ok(PackValue::Object(obj))
    }
}
