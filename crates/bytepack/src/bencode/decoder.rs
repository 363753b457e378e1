//! Bencode decoder.
//!
//! Strings decode as [`PackValue::Bytes`]: the format draws no distinction
//! between text and binary, so the raw bytes are preserved. Dictionary keys
//! must be valid UTF-8.

use bytepack_buffers::Reader;

use super::error::BencodeError;
use crate::{PackValue, DEFAULT_MAX_DEPTH};

pub struct BencodeDecoder<'a> {
    pub reader: Reader<'a>,
    max_depth: usize,
    depth: usize,
}

impl Default for BencodeDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> BencodeDecoder<'a> {
    pub fn new() -> Self {
        Self {
            reader: Reader::new(&[]),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, BencodeError> {
        self.reader.reset(input);
        self.depth = 0;
        self.read_any()
    }

    #[inline]
    fn end(&self) -> BencodeError {
        BencodeError::UnexpectedEnd(self.reader.x)
    }

    pub fn read_any(&mut self) -> Result<PackValue, BencodeError> {
        let offset = self.reader.x;
        let byte = self.reader.peek().map_err(|_| self.end())?;
        match byte {
            b'i' => self.read_integer(),
            b'l' => self.read_list(),
            b'd' => self.read_dict(),
            b'0'..=b'9' => self.read_bytes().map(PackValue::Bytes),
            b't' => {
                self.reader.skip(1);
                Ok(PackValue::Bool(true))
            }
            b'f' => {
                self.reader.skip(1);
                Ok(PackValue::Bool(false))
            }
            b'n' => {
                self.reader.skip(1);
                Ok(PackValue::Null)
            }
            b'u' => {
                self.reader.skip(1);
                Ok(PackValue::Undefined)
            }
            byte => Err(BencodeError::UnexpectedByte { byte, offset }),
        }
    }

    fn read_integer(&mut self) -> Result<PackValue, BencodeError> {
        let start = self.reader.x;
        self.reader.skip(1); // 'i'
        let digits_start = self.reader.x;
        loop {
            let b = self.reader.try_u8().map_err(|_| self.end())?;
            if b == b'e' {
                break;
            }
            if !b.is_ascii_digit() && b != b'-' {
                return Err(BencodeError::InvalidInteger(start));
            }
        }
        let digits = &self.reader.uint8[digits_start..self.reader.x - 1];
        let text =
            std::str::from_utf8(digits).map_err(|_| BencodeError::InvalidInteger(start))?;
        if let Ok(i) = text.parse::<i64>() {
            Ok(PackValue::Integer(i))
        } else if let Ok(u) = text.parse::<u64>() {
            Ok(PackValue::UInteger(u))
        } else if let Ok(i) = text.parse::<i128>() {
            Ok(PackValue::BigInt(i))
        } else {
            Err(BencodeError::InvalidInteger(start))
        }
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, BencodeError> {
        let start = self.reader.x;
        let mut len: usize = 0;
        loop {
            let b = self.reader.try_u8().map_err(|_| self.end())?;
            if b == b':' {
                break;
            }
            if !b.is_ascii_digit() {
                return Err(BencodeError::InvalidInteger(start));
            }
            len = len
                .checked_mul(10)
                .and_then(|n| n.checked_add((b - b'0') as usize))
                .ok_or(BencodeError::InvalidInteger(start))?;
        }
        self.reader
            .try_buf(len)
            .map(|b| b.to_vec())
            .map_err(|_| self.end())
    }

    fn read_list(&mut self) -> Result<PackValue, BencodeError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(BencodeError::DepthExceeded);
        }
        self.reader.skip(1); // 'l'
        let mut arr = Vec::new();
        loop {
            if self.reader.peek().map_err(|_| self.end())? == b'e' {
                self.reader.skip(1);
                break;
            }
            arr.push(self.read_any()?);
        }
        self.depth -= 1;
        Ok(PackValue::Array(arr))
    }

    fn read_dict(&mut self) -> Result<PackValue, BencodeError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(BencodeError::DepthExceeded);
        }
        self.reader.skip(1); // 'd'
        let mut obj = Vec::new();
        loop {
            if self.reader.peek().map_err(|_| self.end())? == b'e' {
                self.reader.skip(1);
                break;
            }
            let key_at = self.reader.x;
            let key_bytes = self.read_bytes()?;
            let key = String::from_utf8(key_bytes)
                .map_err(|_| BencodeError::InvalidUtf8(key_at))?;
            let val = self.read_any()?;
            obj.push((key, val));
        }
        self.depth -= 1;
        Ok(PackValue::Object(obj))
    }
}
