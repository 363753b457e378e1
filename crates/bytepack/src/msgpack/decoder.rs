//! Deep MessagePack decoder: skipping, validation, and shallow reads.

use super::decoder_fast::MsgPackDecoderFast;
use super::error::MsgPackError;
use crate::{PackValue, PathSegment, RawValue};

/// MessagePack decoder with header-shallow reads and path navigation.
///
/// Builds on [`MsgPackDecoderFast`] and adds the operations that step over
/// values without materializing them: [`skip_any`](MsgPackDecoder::skip_any),
/// exact-span [`validate`](MsgPackDecoder::validate), container header reads,
/// and the path navigator ([`find`](MsgPackDecoder::find) /
/// [`read_at`](MsgPackDecoder::read_at)).
pub struct MsgPackDecoder<'a> {
    pub inner: MsgPackDecoderFast<'a>,
}

impl Default for MsgPackDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MsgPackDecoder<'a> {
    pub fn new() -> Self {
        Self {
            inner: MsgPackDecoderFast::new(),
        }
    }

    pub fn reset(&mut self, input: &'a [u8]) {
        self.inner.reset(input);
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, MsgPackError> {
        self.inner.decode(input)
    }

    /// Reads one value at the current cursor.
    pub fn read_any(&mut self) -> Result<PackValue, MsgPackError> {
        self.inner.read_any()
    }

    /// Steps over one complete value, returning the number of bytes it spans.
    pub fn skip_any(&mut self) -> Result<usize, MsgPackError> {
        let start = self.inner.reader.x;
        let offset = start;
        let byte = self.inner.u8()?;

        if byte >= 0xe0 || byte <= 0x7f {
            return Ok(1);
        }
        if byte <= 0x8f {
            self.skip_obj((byte & 0xf) as usize)?;
            return Ok(self.inner.reader.x - start);
        }
        if byte <= 0x9f {
            self.skip_arr((byte & 0xf) as usize)?;
            return Ok(self.inner.reader.x - start);
        }
        if byte <= 0xbf {
            self.skip((byte & 0x1f) as usize)?;
            return Ok(self.inner.reader.x - start);
        }

        match byte {
            0xc0..=0xc3 => {}
            0xc4 | 0xd9 => {
                let n = self.inner.u8()? as usize;
                self.skip(n)?;
            }
            0xc5 | 0xda => {
                let n = self.inner.u16()? as usize;
                self.skip(n)?;
            }
            0xc6 | 0xdb => {
                let n = self.inner.u32()? as usize;
                self.skip(n)?;
            }
            0xc7 => {
                let n = self.inner.u8()? as usize;
                self.skip(n + 1)?;
            }
            0xc8 => {
                let n = self.inner.u16()? as usize;
                self.skip(n + 1)?;
            }
            0xc9 => {
                let n = self.inner.u32()? as usize;
                self.skip(n + 1)?;
            }
            0xca => self.skip(4)?,
            0xcb => self.skip(8)?,
            0xcc | 0xd0 => self.skip(1)?,
            0xcd | 0xd1 => self.skip(2)?,
            0xce | 0xd2 => self.skip(4)?,
            0xcf | 0xd3 => self.skip(8)?,
            0xd4 => self.skip(2)?,
            0xd5 => self.skip(3)?,
            0xd6 => self.skip(5)?,
            0xd7 => self.skip(9)?,
            0xd8 => self.skip(17)?,
            0xdc => {
                let n = self.inner.u16()? as usize;
                self.skip_arr(n)?;
            }
            0xdd => {
                let n = self.inner.u32()? as usize;
                self.skip_arr(n)?;
            }
            0xde => {
                let n = self.inner.u16()? as usize;
                self.skip_obj(n)?;
            }
            0xdf => {
                let n = self.inner.u32()? as usize;
                self.skip_obj(n)?;
            }
            head => return Err(MsgPackError::UnexpectedHead { head, offset }),
        }
        Ok(self.inner.reader.x - start)
    }

    fn skip_arr(&mut self, size: usize) -> Result<(), MsgPackError> {
        for _ in 0..size {
            self.skip_any()?;
        }
        Ok(())
    }

    fn skip_obj(&mut self, size: usize) -> Result<(), MsgPackError> {
        for _ in 0..size {
            self.skip_any()?;
            self.skip_any()?;
        }
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<(), MsgPackError> {
        self.inner.reader.try_skip(n).map_err(|_| self.inner.end())
    }

    /// Checks that `data[offset..offset + size]` spans exactly one value.
    pub fn validate(
        &mut self,
        data: &'a [u8],
        offset: usize,
        size: usize,
    ) -> Result<(), MsgPackError> {
        self.reset(data);
        self.inner.reader.x = offset;
        let consumed = self.skip_any()?;
        if consumed != size {
            return Err(MsgPackError::InvalidSize);
        }
        Ok(())
    }

    /// Reads a map header, returning the entry count.
    pub fn read_obj_hdr(&mut self) -> Result<usize, MsgPackError> {
        let offset = self.inner.reader.x;
        let byte = self.inner.u8()?;
        if byte >> 4 == 0b1000 {
            return Ok((byte & 0xf) as usize);
        }
        match byte {
            0xde => Ok(self.inner.u16()? as usize),
            0xdf => Ok(self.inner.u32()? as usize),
            _ => Err(MsgPackError::NotAnObject(offset)),
        }
    }

    /// Reads an array header, returning the element count.
    pub fn read_arr_hdr(&mut self) -> Result<usize, MsgPackError> {
        let offset = self.inner.reader.x;
        let byte = self.inner.u8()?;
        if byte >> 4 == 0b1001 {
            return Ok((byte & 0xf) as usize);
        }
        match byte {
            0xdc => Ok(self.inner.u16()? as usize),
            0xdd => Ok(self.inner.u32()? as usize),
            _ => Err(MsgPackError::NotAnArray(offset)),
        }
    }

    /// Reads a string header, returning the byte length. The cursor is left
    /// at the first content byte.
    pub fn read_str_hdr(&mut self) -> Result<usize, MsgPackError> {
        let offset = self.inner.reader.x;
        let byte = self.inner.u8()?;
        if byte >> 5 == 0b101 {
            return Ok((byte & 0x1f) as usize);
        }
        match byte {
            0xd9 => Ok(self.inner.u8()? as usize),
            0xda => Ok(self.inner.u16()? as usize),
            0xdb => Ok(self.inner.u32()? as usize),
            _ => Err(MsgPackError::NotAString(offset)),
        }
    }

    /// Positions the cursor at the value of `key` in the map at the cursor.
    pub fn find_key(&mut self, key: &str) -> Result<&mut Self, MsgPackError> {
        let size = self.read_obj_hdr()?;
        for _ in 0..size {
            let current = self.inner.read_key()?;
            if current == key {
                return Ok(self);
            }
            self.skip_any()?;
        }
        Err(MsgPackError::KeyNotFound)
    }

    /// Positions the cursor at element `index` of the array at the cursor.
    pub fn find_index(&mut self, index: usize) -> Result<&mut Self, MsgPackError> {
        let size = self.read_arr_hdr()?;
        if index >= size {
            return Err(MsgPackError::IndexOutOfBounds);
        }
        for _ in 0..index {
            self.skip_any()?;
        }
        Ok(self)
    }

    /// Advances the cursor to the value addressed by `path`.
    pub fn find(&mut self, path: &[PathSegment<'_>]) -> Result<&mut Self, MsgPackError> {
        for segment in path {
            match segment {
                PathSegment::Key(key) => {
                    self.find_key(key)?;
                }
                PathSegment::Index(index) => {
                    self.find_index(*index)?;
                }
            }
        }
        Ok(self)
    }

    /// Decodes the value at `path` inside `data`.
    pub fn read_at(
        &mut self,
        data: &'a [u8],
        path: &[PathSegment<'_>],
    ) -> Result<PackValue, MsgPackError> {
        self.reset(data);
        self.find(path)?;
        self.read_any()
    }

    /// Captures the exact byte span of the value at `path` without decoding.
    pub fn read_raw_at(
        &mut self,
        data: &'a [u8],
        path: &[PathSegment<'_>],
    ) -> Result<RawValue, MsgPackError> {
        self.reset(data);
        self.find(path)?;
        let start = self.inner.reader.x;
        let size = self.skip_any()?;
        Ok(RawValue::new(data[start..start + size].to_vec()))
    }

    /// Decodes one level of the document: the top container's direct scalar
    /// children are decoded, nested containers are captured as blobs.
    pub fn read_level(&mut self, input: &'a [u8]) -> Result<PackValue, MsgPackError> {
        self.reset(input);
        let byte = self.inner.reader.peek().map_err(|_| self.inner.end())?;
        let is_map = matches!(byte, 0xde | 0xdf) || byte >> 4 == 0b1000;
        if is_map {
            let size = self.read_obj_hdr()?;
            let mut obj = Vec::with_capacity(size.min(4096));
            for _ in 0..size {
                let key = self.inner.read_key()?;
                let value = self.primitive()?;
                obj.push((key, value));
            }
            return Ok(PackValue::Object(obj));
        }
        let is_array = matches!(byte, 0xdc | 0xdd) || byte >> 4 == 0b1001;
        if is_array {
            let size = self.read_arr_hdr()?;
            let mut arr = Vec::with_capacity(size.min(4096));
            for _ in 0..size {
                arr.push(self.primitive()?);
            }
            return Ok(PackValue::Array(arr));
        }
        self.read_any()
    }

    /// Reads a scalar in place, or captures a nested container as a blob.
    fn primitive(&mut self) -> Result<PackValue, MsgPackError> {
        let byte = self.inner.reader.peek().map_err(|_| self.inner.end())?;
        let is_container = matches!(byte, 0xdc | 0xdd | 0xde | 0xdf)
            || byte >> 4 == 0b1000
            || byte >> 4 == 0b1001;
        if is_container {
            let start = self.inner.reader.x;
            let length = self.skip_any()?;
            let bytes = self.inner.reader.uint8[start..start + length].to_vec();
            return Ok(PackValue::blob(bytes));
        }
        self.read_any()
    }
}
