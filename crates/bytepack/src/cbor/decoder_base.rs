//! Core CBOR decoder: all majors, indefinite lengths, and tag dispatch.

use bytepack_buffers::{BufferError, Reader};

use super::constants::{
    MAJOR_BYTES, MAJOR_STR, MINOR_INDEFINITE, TAG_NEG_BIGNUM, TAG_POS_BIGNUM, TOKEN_BREAK,
};
use super::error::CborError;
use crate::typed_array::elems;
use crate::{PackValue, TypedArray, DEFAULT_MAX_DEPTH};

/// Converts an IEEE 754 binary16 value to binary64.
pub fn f16_to_f64(h: u16) -> f64 {
    let exp = (h >> 10) & 0x1f;
    let frac = (h & 0x3ff) as f64;
    let val = if exp == 0 {
        frac * 2f64.powi(-24)
    } else if exp != 31 {
        (frac + 1024.0) * 2f64.powi(exp as i32 - 25)
    } else if frac == 0.0 {
        f64::INFINITY
    } else {
        f64::NAN
    };
    if h >> 15 == 1 {
        -val
    } else {
        val
    }
}

/// Core CBOR decoder over a borrowed buffer.
///
/// Handles every major type, the 24/25/26/27 argument widths, indefinite
/// strings/bytes (chunk concatenation) and containers (break-terminated),
/// half-floats, and the known tags: bignums become [`PackValue::BigInt`],
/// RFC 8746 typed-array tags become [`PackValue::TypedArray`], and any other
/// tag is preserved as [`PackValue::Extension`].
pub struct CborDecoderBase<'a> {
    pub reader: Reader<'a>,
    pub(super) max_depth: usize,
    pub(super) depth: usize,
}

impl Default for CborDecoderBase<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CborDecoderBase<'a> {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Creates a decoder with a custom recursion depth cap.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            reader: Reader::new(&[]),
            max_depth,
            depth: 0,
        }
    }

    pub fn reset(&mut self, input: &'a [u8]) {
        self.reader.reset(input);
        self.depth = 0;
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, CborError> {
        self.reset(input);
        self.read_any()
    }

    #[inline]
    pub(super) fn end(&self) -> CborError {
        CborError::UnexpectedEnd(self.reader.x)
    }

    #[inline]
    pub(super) fn u8(&mut self) -> Result<u8, CborError> {
        self.reader.try_u8().map_err(|_| self.end())
    }

    /// Reads the argument encoded by `minor`. `None` means indefinite.
    pub(super) fn read_arg(&mut self, minor: u8, offset: usize) -> Result<Option<u64>, CborError> {
        match minor {
            0..=23 => Ok(Some(minor as u64)),
            24 => Ok(Some(self.u8()? as u64)),
            25 => Ok(Some(self.reader.try_u16().map_err(|_| self.end())? as u64)),
            26 => Ok(Some(self.reader.try_u32().map_err(|_| self.end())? as u64)),
            27 => Ok(Some(self.reader.try_u64().map_err(|_| self.end())?)),
            MINOR_INDEFINITE => Ok(None),
            _ => Err(CborError::UnexpectedMinor { minor, offset }),
        }
    }

    /// Reads the argument of a definite-length head.
    pub(super) fn read_definite_arg(&mut self, minor: u8, offset: usize) -> Result<u64, CborError> {
        self.read_arg(minor, offset)?
            .ok_or(CborError::UnexpectedMinor { minor, offset })
    }

    #[inline]
    fn enter(&mut self) -> Result<(), CborError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(CborError::DepthExceeded);
        }
        Ok(())
    }

    /// Reads one complete data item at the cursor.
    pub fn read_any(&mut self) -> Result<PackValue, CborError> {
        let offset = self.reader.x;
        let octet = self.u8()?;
        let major = octet >> 5;
        let minor = octet & 0x1f;
        match major {
            0 => {
                let n = self.read_definite_arg(minor, offset)?;
                if n <= i64::MAX as u64 {
                    Ok(PackValue::Integer(n as i64))
                } else {
                    Ok(PackValue::UInteger(n))
                }
            }
            1 => {
                let n = self.read_definite_arg(minor, offset)?;
                if n <= i64::MAX as u64 {
                    Ok(PackValue::Integer(-1 - n as i64))
                } else {
                    Ok(PackValue::BigInt(-1 - n as i128))
                }
            }
            2 => self.read_bytes(minor, offset).map(PackValue::Bytes),
            3 => self.read_str(minor, offset).map(PackValue::Str),
            4 => self.read_arr(minor, offset),
            5 => self.read_map(minor, offset),
            6 => {
                let tag = self.read_definite_arg(minor, offset)?;
                self.read_tag(tag)
            }
            _ => match minor {
                20 => Ok(PackValue::Bool(false)),
                21 => Ok(PackValue::Bool(true)),
                22 => Ok(PackValue::Null),
                23 => Ok(PackValue::Undefined),
                25 => {
                    let bits = self.reader.try_u16().map_err(|_| self.end())?;
                    Ok(PackValue::Float(f16_to_f64(bits)))
                }
                26 => {
                    let v = self.reader.try_f32().map_err(|_| self.end())?;
                    Ok(PackValue::Float(v as f64))
                }
                27 => {
                    let v = self.reader.try_f64().map_err(|_| self.end())?;
                    Ok(PackValue::Float(v))
                }
                MINOR_INDEFINITE => Err(CborError::UnexpectedBreak(offset)),
                _ => Err(CborError::UnexpectedMinor { minor, offset }),
            },
        }
    }

    /// Whether the next byte is a break, consuming it when it is.
    fn at_break(&mut self) -> Result<bool, CborError> {
        let next = self.reader.peek().map_err(|_| self.end())?;
        if next == TOKEN_BREAK {
            self.reader.skip(1);
            return Ok(true);
        }
        Ok(false)
    }

    /// Reads a byte string: a single definite run or concatenated
    /// definite-length chunks terminated by a break.
    pub(super) fn read_bytes(&mut self, minor: u8, offset: usize) -> Result<Vec<u8>, CborError> {
        match self.read_arg(minor, offset)? {
            Some(n) => self
                .reader
                .try_buf(n as usize)
                .map(|b| b.to_vec())
                .map_err(|_| self.end()),
            None => {
                let mut out = Vec::new();
                loop {
                    if self.at_break()? {
                        return Ok(out);
                    }
                    let chunk_offset = self.reader.x;
                    let octet = self.u8()?;
                    if octet >> 5 != MAJOR_BYTES {
                        return Err(CborError::UnexpectedMajor {
                            major: octet >> 5,
                            offset: chunk_offset,
                        });
                    }
                    let len = self.read_definite_arg(octet & 0x1f, chunk_offset)?;
                    let chunk = self
                        .reader
                        .try_buf(len as usize)
                        .map_err(|_| self.end())?;
                    out.extend_from_slice(chunk);
                }
            }
        }
    }

    /// Reads a text string, definite or chunked.
    pub(super) fn read_str(&mut self, minor: u8, offset: usize) -> Result<String, CborError> {
        match self.read_arg(minor, offset)? {
            Some(n) => {
                let at = self.reader.x;
                match self.reader.try_utf8(n as usize) {
                    Ok(s) => Ok(s.to_owned()),
                    Err(BufferError::InvalidUtf8) => Err(CborError::InvalidUtf8(at)),
                    Err(BufferError::EndOfBuffer) => Err(CborError::UnexpectedEnd(at)),
                }
            }
            None => {
                let mut out = Vec::new();
                loop {
                    if self.at_break()? {
                        let at = self.reader.x;
                        return String::from_utf8(out).map_err(|_| CborError::InvalidUtf8(at));
                    }
                    let chunk_offset = self.reader.x;
                    let octet = self.u8()?;
                    if octet >> 5 != MAJOR_STR {
                        return Err(CborError::UnexpectedMajor {
                            major: octet >> 5,
                            offset: chunk_offset,
                        });
                    }
                    let len = self.read_definite_arg(octet & 0x1f, chunk_offset)?;
                    let chunk = self
                        .reader
                        .try_buf(len as usize)
                        .map_err(|_| self.end())?;
                    out.extend_from_slice(chunk);
                }
            }
        }
    }

    fn read_arr(&mut self, minor: u8, offset: usize) -> Result<PackValue, CborError> {
        self.enter()?;
        let mut arr = Vec::new();
        match self.read_arg(minor, offset)? {
            Some(n) => {
                arr.reserve((n as usize).min(4096));
                for _ in 0..n {
                    arr.push(self.read_any()?);
                }
            }
            None => loop {
                if self.at_break()? {
                    break;
                }
                arr.push(self.read_any()?);
            },
        }
        self.depth -= 1;
        Ok(PackValue::Array(arr))
    }

    fn read_map_entry(
        &mut self,
        entries: &mut Vec<(PackValue, PackValue)>,
        all_str: &mut bool,
    ) -> Result<(), CborError> {
        let key = self.read_any()?;
        match &key {
            PackValue::Str(s) if s == "__proto__" => return Err(CborError::ProtoKeyForbidden),
            PackValue::Str(_) => {}
            _ => *all_str = false,
        }
        let val = self.read_any()?;
        entries.push((key, val));
        Ok(())
    }

    fn read_map(&mut self, minor: u8, offset: usize) -> Result<PackValue, CborError> {
        self.enter()?;
        let mut entries: Vec<(PackValue, PackValue)> = Vec::new();
        let mut all_str = true;
        match self.read_arg(minor, offset)? {
            Some(n) => {
                entries.reserve((n as usize).min(4096));
                for _ in 0..n {
                    self.read_map_entry(&mut entries, &mut all_str)?;
                }
            }
            None => loop {
                if self.at_break()? {
                    break;
                }
                self.read_map_entry(&mut entries, &mut all_str)?;
            },
        }
        self.depth -= 1;
        if all_str {
            Ok(PackValue::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| match k {
                        PackValue::Str(s) => (s, v),
                        _ => unreachable!("non-string key in object branch"),
                    })
                    .collect(),
            ))
        } else {
            Ok(PackValue::Map(entries))
        }
    }

    /// Reads a tagged item and applies the known-tag transforms.
    fn read_tag(&mut self, tag: u64) -> Result<PackValue, CborError> {
        let payload = self.read_any()?;
        match tag {
            TAG_POS_BIGNUM | TAG_NEG_BIGNUM => {
                if let PackValue::Bytes(b) = &payload {
                    if let Some(mag) = magnitude(b) {
                        if mag <= i128::MAX as u128 {
                            let v = if tag == TAG_POS_BIGNUM {
                                mag as i128
                            } else {
                                -1 - mag as i128
                            };
                            return Ok(normalize_big(v));
                        }
                    }
                }
                Ok(PackValue::extension(tag, payload))
            }
            64..=87 => {
                if let PackValue::Bytes(b) = &payload {
                    if let Some(arr) = read_typed_array(tag, b) {
                        return Ok(PackValue::TypedArray(arr));
                    }
                }
                Ok(PackValue::extension(tag, payload))
            }
            _ => Ok(PackValue::extension(tag, payload)),
        }
    }
}

/// Big-endian magnitude of a bignum payload, when it fits 128 bits.
fn magnitude(bytes: &[u8]) -> Option<u128> {
    let stripped: &[u8] = {
        let skip = bytes.iter().take_while(|&&b| b == 0).count();
        &bytes[skip..]
    };
    if stripped.len() > 16 {
        return None;
    }
    let mut mag = 0u128;
    for &b in stripped {
        mag = (mag << 8) | b as u128;
    }
    Some(mag)
}

/// Narrows a decoded bignum to the smallest model variant.
fn normalize_big(v: i128) -> PackValue {
    if let Ok(i) = i64::try_from(v) {
        PackValue::Integer(i)
    } else if let Ok(u) = u64::try_from(v) {
        PackValue::UInteger(u)
    } else {
        PackValue::BigInt(v)
    }
}

/// Reconstructs a typed array from an RFC 8746 tag and its byte payload.
/// Returns `None` for the half/quad-float tags, which the model does not
/// carry.
fn read_typed_array(tag: u64, b: &[u8]) -> Option<TypedArray> {
    Some(match tag {
        64 | 68 => TypedArray::U8(b.to_vec()),
        65 => TypedArray::U16(elems::u16_be(b)),
        66 => TypedArray::U32(elems::u32_be(b)),
        67 => TypedArray::U64(elems::u64_be(b)),
        69 => TypedArray::U16(elems::u16_le(b)),
        70 => TypedArray::U32(elems::u32_le(b)),
        71 => TypedArray::U64(elems::u64_le(b)),
        72 => TypedArray::I8(b.iter().map(|&x| x as i8).collect()),
        73 => TypedArray::I16(elems::i16_be(b)),
        74 => TypedArray::I32(elems::i32_be(b)),
        75 => TypedArray::I64(elems::i64_be(b)),
        77 => TypedArray::I16(elems::i16_le(b)),
        78 => TypedArray::I32(elems::i32_le(b)),
        79 => TypedArray::I64(elems::i64_le(b)),
        81 => TypedArray::F32(elems::f32_be(b)),
        82 => TypedArray::F64(elems::f64_be(b)),
        85 => TypedArray::F32(elems::f32_le(b)),
        86 => TypedArray::F64(elems::f64_le(b)),
        _ => return None,
    })
}
