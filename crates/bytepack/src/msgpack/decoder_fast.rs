//! Fast MessagePack decoder.

use bytepack_buffers::{BufferError, Reader};

use super::error::MsgPackError;
use crate::{PackValue, DEFAULT_MAX_DEPTH};

/// Fast MessagePack decoder over a borrowed buffer.
///
/// Reconstructs a full [`PackValue`] tree. String and byte payloads are
/// copied out of the input; the input slice itself is only borrowed for the
/// duration of the decode.
pub struct MsgPackDecoderFast<'a> {
    pub reader: Reader<'a>,
    pub(super) max_depth: usize,
    pub(super) depth: usize,
}

impl Default for MsgPackDecoderFast<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MsgPackDecoderFast<'a> {
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

    /// Rebinds the decoder to a new input buffer.
    pub fn reset(&mut self, input: &'a [u8]) {
        self.reader.reset(input);
        self.depth = 0;
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, MsgPackError> {
        self.reset(input);
        self.read_any()
    }

    #[inline]
    pub(super) fn end(&self) -> MsgPackError {
        MsgPackError::UnexpectedEnd(self.reader.x)
    }

    #[inline]
    pub(super) fn u8(&mut self) -> Result<u8, MsgPackError> {
        self.reader.try_u8().map_err(|_| self.end())
    }

    #[inline]
    pub(super) fn u16(&mut self) -> Result<u16, MsgPackError> {
        self.reader.try_u16().map_err(|_| self.end())
    }

    #[inline]
    pub(super) fn u32(&mut self) -> Result<u32, MsgPackError> {
        self.reader.try_u32().map_err(|_| self.end())
    }

    pub(super) fn utf8(&mut self, size: usize) -> Result<String, MsgPackError> {
        let at = self.reader.x;
        match self.reader.try_utf8(size) {
            Ok(s) => Ok(s.to_owned()),
            Err(BufferError::InvalidUtf8) => Err(MsgPackError::InvalidUtf8(at)),
            Err(BufferError::EndOfBuffer) => Err(MsgPackError::UnexpectedEnd(at)),
        }
    }

    pub(super) fn buf(&mut self, size: usize) -> Result<Vec<u8>, MsgPackError> {
        self.reader
            .try_buf(size)
            .map(|b| b.to_vec())
            .map_err(|_| self.end())
    }

    #[inline]
    fn enter(&mut self) -> Result<(), MsgPackError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(MsgPackError::DepthExceeded);
        }
        Ok(())
    }

    /// Reads one complete value at the cursor.
    pub fn read_any(&mut self) -> Result<PackValue, MsgPackError> {
        let offset = self.reader.x;
        let byte = self.u8()?;

        // negative fixint: 0xe0..0xff
        if byte >= 0xe0 {
            return Ok(PackValue::Integer(byte as i8 as i64));
        }
        // positive fixint: 0x00..0x7f
        if byte <= 0x7f {
            return Ok(PackValue::Integer(byte as i64));
        }
        // fixmap 0x80..0x8f, fixarray 0x90..0x9f, fixstr 0xa0..0xbf
        if byte <= 0x8f {
            return self.read_obj((byte & 0xf) as usize);
        }
        if byte <= 0x9f {
            return self.read_arr((byte & 0xf) as usize);
        }
        if byte <= 0xbf {
            return self.utf8((byte & 0x1f) as usize).map(PackValue::Str);
        }

        match byte {
            0xc0 => Ok(PackValue::Null),
            0xc1 => Ok(PackValue::Undefined),
            0xc2 => Ok(PackValue::Bool(false)),
            0xc3 => Ok(PackValue::Bool(true)),
            0xc4 => {
                let n = self.u8()? as usize;
                self.buf(n).map(PackValue::Bytes)
            }
            0xc5 => {
                let n = self.u16()? as usize;
                self.buf(n).map(PackValue::Bytes)
            }
            0xc6 => {
                let n = self.u32()? as usize;
                self.buf(n).map(PackValue::Bytes)
            }
            0xc7 => {
                let n = self.u8()? as usize;
                self.read_ext(n)
            }
            0xc8 => {
                let n = self.u16()? as usize;
                self.read_ext(n)
            }
            0xc9 => {
                let n = self.u32()? as usize;
                self.read_ext(n)
            }
            0xca => {
                let v = self.reader.try_f32().map_err(|_| self.end())?;
                Ok(PackValue::Float(v as f64))
            }
            0xcb => {
                let v = self.reader.try_f64().map_err(|_| self.end())?;
                Ok(PackValue::Float(v))
            }
            0xcc => Ok(PackValue::Integer(self.u8()? as i64)),
            0xcd => Ok(PackValue::Integer(self.u16()? as i64)),
            0xce => Ok(PackValue::Integer(self.u32()? as i64)),
            0xcf => {
                let v = self.reader.try_u64().map_err(|_| self.end())?;
                if v <= i64::MAX as u64 {
                    Ok(PackValue::Integer(v as i64))
                } else {
                    Ok(PackValue::UInteger(v))
                }
            }
            0xd0 => Ok(PackValue::Integer(
                self.reader.try_i8().map_err(|_| self.end())? as i64,
            )),
            0xd1 => Ok(PackValue::Integer(
                self.reader.try_i16().map_err(|_| self.end())? as i64,
            )),
            0xd2 => Ok(PackValue::Integer(
                self.reader.try_i32().map_err(|_| self.end())? as i64,
            )),
            0xd3 => Ok(PackValue::Integer(
                self.reader.try_i64().map_err(|_| self.end())?,
            )),
            0xd4 => self.read_ext(1),
            0xd5 => self.read_ext(2),
            0xd6 => self.read_ext(4),
            0xd7 => self.read_ext(8),
            0xd8 => self.read_ext(16),
            0xd9 => {
                let n = self.u8()? as usize;
                self.utf8(n).map(PackValue::Str)
            }
            0xda => {
                let n = self.u16()? as usize;
                self.utf8(n).map(PackValue::Str)
            }
            0xdb => {
                let n = self.u32()? as usize;
                self.utf8(n).map(PackValue::Str)
            }
            0xdc => {
                let n = self.u16()? as usize;
                self.read_arr(n)
            }
            0xdd => {
                let n = self.u32()? as usize;
                self.read_arr(n)
            }
            0xde => {
                let n = self.u16()? as usize;
                self.read_obj(n)
            }
            0xdf => {
                let n = self.u32()? as usize;
                self.read_obj(n)
            }
            head => Err(MsgPackError::UnexpectedHead { head, offset }),
        }
    }

    fn read_arr(&mut self, size: usize) -> Result<PackValue, MsgPackError> {
        self.enter()?;
        let mut arr = Vec::with_capacity(size.min(4096));
        for _ in 0..size {
            arr.push(self.read_any()?);
        }
        self.depth -= 1;
        Ok(PackValue::Array(arr))
    }

    /// Reads a map. All-string keys produce an `Object`; anything else
    /// produces a `Map`.
    fn read_obj(&mut self, size: usize) -> Result<PackValue, MsgPackError> {
        self.enter()?;
        let mut entries: Vec<(PackValue, PackValue)> = Vec::with_capacity(size.min(4096));
        let mut all_str = true;
        for _ in 0..size {
            let key = self.read_any()?;
            match &key {
                PackValue::Str(s) if s == "__proto__" => {
                    return Err(MsgPackError::ProtoKeyForbidden)
                }
                PackValue::Str(_) => {}
                _ => all_str = false,
            }
            let val = self.read_any()?;
            entries.push((key, val));
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

    fn read_ext(&mut self, size: usize) -> Result<PackValue, MsgPackError> {
        let tag = self.reader.try_i8().map_err(|_| self.end())?;
        let data = self.buf(size)?;
        Ok(PackValue::extension(
            tag as u8 as u64,
            PackValue::Bytes(data),
        ))
    }

    /// Reads a string key at the cursor.
    pub fn read_key(&mut self) -> Result<String, MsgPackError> {
        let offset = self.reader.x;
        let byte = self.u8()?;
        if (0xa0..=0xbf).contains(&byte) {
            return self.utf8((byte & 0x1f) as usize);
        }
        match byte {
            0xd9 => {
                let n = self.u8()? as usize;
                self.utf8(n)
            }
            0xda => {
                let n = self.u16()? as usize;
                self.utf8(n)
            }
            0xdb => {
                let n = self.u32()? as usize;
                self.utf8(n)
            }
            _ => Err(MsgPackError::NotAString(offset)),
        }
    }
}
