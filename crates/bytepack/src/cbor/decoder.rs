//! Deep CBOR decoder: skipping, validation, and shallow reads.

use super::constants::{MAJOR_ARR, MAJOR_MAP, MINOR_INDEFINITE, TOKEN_BREAK};
use super::decoder_base::CborDecoderBase;
use super::error::CborError;
use crate::{PackValue, PathSegment, RawValue};

/// CBOR decoder with value skipping, exact-span validation, and the path
/// navigator.
///
/// Builds on [`CborDecoderBase`]. Skipping parses just enough of each data
/// item to step over it, so path resolution costs bytes visited rather than
/// document size; indefinite-length containers still require walking their
/// children, but never descending into them.
pub struct CborDecoder<'a> {
    pub base: CborDecoderBase<'a>,
}

impl Default for CborDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CborDecoder<'a> {
    pub fn new() -> Self {
        Self {
            base: CborDecoderBase::new(),
        }
    }

    pub fn reset(&mut self, input: &'a [u8]) {
        self.base.reset(input);
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, CborError> {
        self.base.decode(input)
    }

    /// Reads one data item at the current cursor.
    pub fn read_any(&mut self) -> Result<PackValue, CborError> {
        self.base.read_any()
    }

    /// Steps over one complete data item, returning its byte span.
    pub fn skip_any(&mut self) -> Result<usize, CborError> {
        let start = self.base.reader.x;
        self.skip_one()?;
        Ok(self.base.reader.x - start)
    }

    fn skip_one(&mut self) -> Result<(), CborError> {
        let offset = self.base.reader.x;
        let octet = self.base.u8()?;
        let major = octet >> 5;
        let minor = octet & 0x1f;
        match major {
            0 | 1 => {
                self.base.read_definite_arg(minor, offset)?;
            }
            2 | 3 => match self.base.read_arg(minor, offset)? {
                Some(n) => self
                    .base
                    .reader
                    .try_skip(n as usize)
                    .map_err(|_| self.base.end())?,
                None => loop {
                    let next = self.base.reader.peek().map_err(|_| self.base.end())?;
                    if next == TOKEN_BREAK {
                        self.base.reader.skip(1);
                        break;
                    }
                    let chunk_offset = self.base.reader.x;
                    let chunk = self.base.u8()?;
                    if chunk >> 5 != major {
                        return Err(CborError::UnexpectedMajor {
                            major: chunk >> 5,
                            offset: chunk_offset,
                        });
                    }
                    let len = self.base.read_definite_arg(chunk & 0x1f, chunk_offset)?;
                    self.base
                        .reader
                        .try_skip(len as usize)
                        .map_err(|_| self.base.end())?;
                },
            },
            4 => self.skip_items(minor, offset, 1)?,
            5 => self.skip_items(minor, offset, 2)?,
            6 => {
                self.base.read_definite_arg(minor, offset)?;
                self.skip_one()?;
            }
            _ => match minor {
                0..=23 => {}
                24 => self
                    .base
                    .reader
                    .try_skip(1)
                    .map_err(|_| self.base.end())?,
                25 => self
                    .base
                    .reader
                    .try_skip(2)
                    .map_err(|_| self.base.end())?,
                26 => self
                    .base
                    .reader
                    .try_skip(4)
                    .map_err(|_| self.base.end())?,
                27 => self
                    .base
                    .reader
                    .try_skip(8)
                    .map_err(|_| self.base.end())?,
                MINOR_INDEFINITE => return Err(CborError::UnexpectedBreak(offset)),
                _ => return Err(CborError::UnexpectedMinor { minor, offset }),
            },
        }
        Ok(())
    }

    /// Skips container contents: `width` items per entry.
    fn skip_items(&mut self, minor: u8, offset: usize, width: usize) -> Result<(), CborError> {
        self.base.depth += 1;
        if self.base.depth > self.base.max_depth {
            return Err(CborError::DepthExceeded);
        }
        match self.base.read_arg(minor, offset)? {
            Some(n) => {
                for _ in 0..n {
                    for _ in 0..width {
                        self.skip_one()?;
                    }
                }
            }
            None => loop {
                let next = self.base.reader.peek().map_err(|_| self.base.end())?;
                if next == TOKEN_BREAK {
                    self.base.reader.skip(1);
                    break;
                }
                for _ in 0..width {
                    self.skip_one()?;
                }
            },
        }
        self.base.depth -= 1;
        Ok(())
    }

    /// Steps over `n` consecutive data items.
    pub fn skip_n(&mut self, n: usize) -> Result<usize, CborError> {
        let mut total = 0;
        for _ in 0..n {
            total += self.skip_any()?;
        }
        Ok(total)
    }

    /// Checks that `data[offset..offset + size]` spans exactly one data item.
    pub fn validate(
        &mut self,
        data: &'a [u8],
        offset: usize,
        size: usize,
    ) -> Result<(), CborError> {
        self.reset(data);
        self.base.reader.x = offset;
        let consumed = self.skip_any()?;
        if consumed != size {
            return Err(CborError::InvalidSize);
        }
        Ok(())
    }

    /// Reads a definite map header, returning the entry count.
    pub fn read_obj_hdr(&mut self) -> Result<usize, CborError> {
        let offset = self.base.reader.x;
        let octet = self.base.u8()?;
        if octet >> 5 != MAJOR_MAP {
            return Err(CborError::NotAnObject(offset));
        }
        let n = self.base.read_definite_arg(octet & 0x1f, offset)?;
        Ok(n as usize)
    }

    /// Reads a definite array header, returning the element count.
    pub fn read_arr_hdr(&mut self) -> Result<usize, CborError> {
        let offset = self.base.reader.x;
        let octet = self.base.u8()?;
        if octet >> 5 != MAJOR_ARR {
            return Err(CborError::NotAnArray(offset));
        }
        let n = self.base.read_definite_arg(octet & 0x1f, offset)?;
        Ok(n as usize)
    }

    /// Reads a definite text string header, returning the byte length and
    /// leaving the cursor at the first content byte.
    pub fn read_str_hdr(&mut self) -> Result<usize, CborError> {
        let offset = self.base.reader.x;
        let octet = self.base.u8()?;
        if octet >> 5 != 3 {
            return Err(CborError::NotAString(offset));
        }
        let n = self.base.read_definite_arg(octet & 0x1f, offset)?;
        Ok(n as usize)
    }

    /// Positions the cursor at the value of `key` in the map at the cursor.
    /// Entries with non-string keys are stepped over.
    pub fn find_key(&mut self, key: &str) -> Result<&mut Self, CborError> {
        let offset = self.base.reader.x;
        let octet = self.base.u8()?;
        if octet >> 5 != MAJOR_MAP {
            return Err(CborError::NotAnObject(offset));
        }
        match self.base.read_arg(octet & 0x1f, offset)? {
            Some(n) => {
                for _ in 0..n {
                    if self.entry_matches(key)? {
                        return Ok(self);
                    }
                }
            }
            None => loop {
                let next = self.base.reader.peek().map_err(|_| self.base.end())?;
                if next == TOKEN_BREAK {
                    self.base.reader.skip(1);
                    break;
                }
                if self.entry_matches(key)? {
                    return Ok(self);
                }
            },
        }
        Err(CborError::KeyNotFound)
    }

    /// Reads one map entry's key; on match the cursor rests at the value.
    fn entry_matches(&mut self, key: &str) -> Result<bool, CborError> {
        let entry_key = self.base.read_any()?;
        if matches!(&entry_key, PackValue::Str(s) if s == key) {
            return Ok(true);
        }
        self.skip_any()?;
        Ok(false)
    }

    /// Positions the cursor at element `index` of the array at the cursor.
    pub fn find_index(&mut self, index: usize) -> Result<&mut Self, CborError> {
        let offset = self.base.reader.x;
        let octet = self.base.u8()?;
        if octet >> 5 != MAJOR_ARR {
            return Err(CborError::NotAnArray(offset));
        }
        match self.base.read_arg(octet & 0x1f, offset)? {
            Some(n) => {
                if index as u64 >= n {
                    return Err(CborError::IndexOutOfBounds);
                }
                for _ in 0..index {
                    self.skip_any()?;
                }
            }
            None => {
                for _ in 0..index {
                    let next = self.base.reader.peek().map_err(|_| self.base.end())?;
                    if next == TOKEN_BREAK {
                        return Err(CborError::IndexOutOfBounds);
                    }
                    self.skip_any()?;
                }
                let next = self.base.reader.peek().map_err(|_| self.base.end())?;
                if next == TOKEN_BREAK {
                    return Err(CborError::IndexOutOfBounds);
                }
            }
        }
        Ok(self)
    }

    /// Advances the cursor to the value addressed by `path`.
    pub fn find(&mut self, path: &[PathSegment<'_>]) -> Result<&mut Self, CborError> {
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
    ) -> Result<PackValue, CborError> {
        self.reset(data);
        self.find(path)?;
        self.read_any()
    }

    /// Captures the exact byte span of the value at `path` without decoding.
    pub fn read_raw_at(
        &mut self,
        data: &'a [u8],
        path: &[PathSegment<'_>],
    ) -> Result<RawValue, CborError> {
        self.reset(data);
        self.find(path)?;
        let start = self.base.reader.x;
        let size = self.skip_any()?;
        Ok(RawValue::new(data[start..start + size].to_vec()))
    }

    /// Decodes one level of the document: direct scalar children of the top
    /// container are decoded, nested containers are captured as blobs.
    pub fn read_level(&mut self, input: &'a [u8]) -> Result<PackValue, CborError> {
        self.reset(input);
        let head = self.base.reader.peek().map_err(|_| self.base.end())?;
        match head >> 5 {
            MAJOR_MAP => {
                let offset = self.base.reader.x;
                let octet = self.base.u8()?;
                let mut obj = Vec::new();
                match self.base.read_arg(octet & 0x1f, offset)? {
                    Some(n) => {
                        for _ in 0..n {
                            self.level_entry(&mut obj)?;
                        }
                    }
                    None => loop {
                        let next = self.base.reader.peek().map_err(|_| self.base.end())?;
                        if next == TOKEN_BREAK {
                            self.base.reader.skip(1);
                            break;
                        }
                        self.level_entry(&mut obj)?;
                    },
                }
                Ok(PackValue::Object(obj))
            }
            MAJOR_ARR => {
                let offset = self.base.reader.x;
                let octet = self.base.u8()?;
                let mut arr = Vec::new();
                match self.base.read_arg(octet & 0x1f, offset)? {
                    Some(n) => {
                        for _ in 0..n {
                            let v = self.primitive()?;
                            arr.push(v);
                        }
                    }
                    None => loop {
                        let next = self.base.reader.peek().map_err(|_| self.base.end())?;
                        if next == TOKEN_BREAK {
                            self.base.reader.skip(1);
                            break;
                        }
                        let v = self.primitive()?;
                        arr.push(v);
                    },
                }
                Ok(PackValue::Array(arr))
            }
            _ => self.read_any(),
        }
    }

    fn level_entry(&mut self, obj: &mut Vec<(String, PackValue)>) -> Result<(), CborError> {
        let offset = self.base.reader.x;
        let key = match self.base.read_any()? {
            PackValue::Str(s) => s,
            _ => return Err(CborError::NotAString(offset)),
        };
        let val = self.primitive()?;
        obj.push((key, val));
        Ok(())
    }

    /// Reads a scalar in place, or captures a nested container as a blob.
    fn primitive(&mut self) -> Result<PackValue, CborError> {
        let head = self.base.reader.peek().map_err(|_| self.base.end())?;
        if matches!(head >> 5, MAJOR_ARR | MAJOR_MAP) {
            let start = self.base.reader.x;
            let size = self.skip_any()?;
            let bytes = self.base.reader.uint8[start..start + size].to_vec();
            return Ok(PackValue::blob(bytes));
        }
        self.read_any()
    }
}
