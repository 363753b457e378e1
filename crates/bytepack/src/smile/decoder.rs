//! Smile decoder.

use bytepack_buffers::{BufferError, Reader};

use super::constants::*;
use super::shared::SharedStringTable;
use super::vint::zigzag_decode;
use crate::{PackValue, DEFAULT_MAX_DEPTH};

/// Decoder configuration.
#[derive(Debug, Clone, Copy)]
pub struct SmileDecoderOptions {
    /// Live size cap of each shared-string table.
    pub max_shared_references: usize,
    /// Recursion depth cap.
    pub max_depth: usize,
}

impl Default for SmileDecoderOptions {
    fn default() -> Self {
        Self {
            max_shared_references: 1024,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Smile decoder.
///
/// Rebuilds the shared-name/value tables in the same order the encoder
/// appended them, so back-references resolve to the string the encoder saw.
pub struct SmileDecoder<'a> {
    pub reader: Reader<'a>,
    options: SmileDecoderOptions,
    shared_keys: SharedStringTable,
    shared_values: SharedStringTable,
    shared_names_enabled: bool,
    shared_values_enabled: bool,
    depth: usize,
}

impl Default for SmileDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SmileDecoder<'a> {
    pub fn new() -> Self {
        Self::with_options(SmileDecoderOptions::default())
    }

    pub fn with_options(options: SmileDecoderOptions) -> Self {
        Self {
            reader: Reader::new(&[]),
            options,
            shared_keys: SharedStringTable::with_capacity(options.max_shared_references),
            shared_values: SharedStringTable::with_capacity(options.max_shared_references),
            shared_names_enabled: false,
            shared_values_enabled: false,
            depth: 0,
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, super::SmileError> {
        self.reader.reset(input);
        self.shared_keys.clear();
        self.shared_values.clear();
        self.depth = 0;
        self.read_header()?;
        self.read_value()
    }

    fn read_header(&mut self) -> Result<(), super::SmileError> {
        let magic = self
            .reader
            .try_buf(3)
            .map_err(|_| super::SmileError::InvalidHeader)?;
        if magic != HEADER {
            return Err(super::SmileError::InvalidHeader);
        }
        let flags = self
            .reader
            .try_u8()
            .map_err(|_| super::SmileError::InvalidHeader)?;
        let version = flags >> 4;
        if version != 0 {
            return Err(super::SmileError::UnsupportedVersion(version));
        }
        self.shared_names_enabled = flags & FLAG_SHARED_NAMES != 0;
        self.shared_values_enabled = flags & FLAG_SHARED_VALUES != 0;
        Ok(())
    }

    #[inline]
    fn end(&self) -> super::SmileError {
        super::SmileError::UnexpectedEnd(self.reader.x)
    }

    #[inline]
    fn u8(&mut self) -> Result<u8, super::SmileError> {
        self.reader.try_u8().map_err(|_| self.end())
    }

    fn utf8(&mut self, size: usize) -> Result<String, super::SmileError> {
        let at = self.reader.x;
        match self.reader.try_utf8(size) {
            Ok(s) => Ok(s.to_owned()),
            Err(BufferError::InvalidUtf8) => Err(super::SmileError::InvalidUtf8(at)),
            Err(BufferError::EndOfBuffer) => Err(super::SmileError::UnexpectedEnd(at)),
        }
    }

    /// Reads an unsigned VInt: 7-bit groups low-first, terminated by a byte
    /// with the high bit set carrying the final 6 bits.
    fn read_vint(&mut self) -> Result<u64, super::SmileError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.u8()?;
            if byte & 0x80 != 0 {
                let tail = (byte & 0x3f) as u64;
                return Ok(value | tail.checked_shl(shift).unwrap_or(0));
            }
            if shift > 63 {
                return Err(super::SmileError::MalformedVInt);
            }
            value |= ((byte & 0x7f) as u64) << shift;
            shift += 7;
        }
    }

    /// Decodes 7-bit-safe content back into `orig_len` bytes.
    fn read_7bit(&mut self, orig_len: usize) -> Result<Vec<u8>, super::SmileError> {
        // The encoded run is longer than the payload, so a length claim
        // beyond the remaining input is already malformed.
        if orig_len > self.reader.remaining() {
            return Err(self.end());
        }
        let encoded_len = (orig_len * 8).div_ceil(7);
        let mut out = Vec::with_capacity(orig_len);
        let mut acc: u32 = 0;
        let mut bits: u32 = 0;
        for _ in 0..encoded_len {
            let offset = self.reader.x;
            let byte = self.u8()?;
            if byte & 0x80 != 0 {
                return Err(super::SmileError::InvalidToken {
                    token: byte,
                    offset,
                });
            }
            acc = (acc << 7) | byte as u32;
            bits += 7;
            if bits >= 8 && out.len() < orig_len {
                bits -= 8;
                out.push((acc >> bits) as u8);
            }
        }
        Ok(out)
    }

    /// Accumulates bytes until the string-end marker (0xfc) appears as a
    /// whole byte, then validates the run as UTF-8.
    fn read_long_str(&mut self) -> Result<String, super::SmileError> {
        let start = self.reader.x;
        let haystack = &self.reader.uint8[start..];
        let Some(pos) = haystack.iter().position(|&b| b == TOKEN_STRING_END) else {
            return Err(super::SmileError::UnexpectedEnd(self.reader.uint8.len()));
        };
        let s = std::str::from_utf8(&haystack[..pos])
            .map_err(|_| super::SmileError::InvalidUtf8(start))?
            .to_owned();
        self.reader.x = start + pos + 1;
        Ok(s)
    }

    #[inline]
    fn enter(&mut self) -> Result<(), super::SmileError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(super::SmileError::DepthExceeded);
        }
        Ok(())
    }

    fn shared_value(&self, index: usize) -> Result<PackValue, super::SmileError> {
        match self.shared_values.get(index) {
            Some(s) => Ok(PackValue::Str(s.to_owned())),
            None => Err(super::SmileError::InvalidReference(index)),
        }
    }

    /// Appends an eligible literal value string to the table, mirroring the
    /// encoder.
    fn note_value(&mut self, s: &str) {
        if self.shared_values_enabled && super::shared::shareable(s) {
            self.shared_values.append(s);
        }
    }

    /// Reads one value-mode token and its payload.
    pub fn read_value(&mut self) -> Result<PackValue, super::SmileError> {
        let offset = self.reader.x;
        let token = self.u8()?;
        match token {
            0x01..=0x1f => self.shared_value(token as usize - 1),
            TOKEN_EMPTY_STRING => Ok(PackValue::Str(String::new())),
            TOKEN_NULL => Ok(PackValue::Null),
            TOKEN_FALSE => Ok(PackValue::Bool(false)),
            TOKEN_TRUE => Ok(PackValue::Bool(true)),
            TOKEN_INT32 | TOKEN_INT64 => {
                let zz = self.read_vint()?;
                Ok(PackValue::Integer(zigzag_decode(zz)))
            }
            TOKEN_BIG_INTEGER => {
                let len = self.read_vint()? as usize;
                let bytes = self.read_7bit(len)?;
                Ok(big_from_twos_complement(&bytes))
            }
            TOKEN_FLOAT32 => {
                let mut bits: u64 = 0;
                for _ in 0..5 {
                    bits = (bits << 7) | self.u8()? as u64;
                }
                Ok(PackValue::Float(f32::from_bits(bits as u32) as f64))
            }
            TOKEN_FLOAT64 => {
                let mut bits: u128 = 0;
                for _ in 0..10 {
                    bits = (bits << 7) | self.u8()? as u128;
                }
                Ok(PackValue::Float(f64::from_bits(bits as u64)))
            }
            TOKEN_BIG_DECIMAL => {
                let scale = zigzag_decode(self.read_vint()?);
                let len = self.read_vint()? as usize;
                let bytes = self.read_7bit(len)?;
                let unscaled = match big_from_twos_complement(&bytes) {
                    PackValue::Integer(i) => i as f64,
                    PackValue::UInteger(u) => u as f64,
                    PackValue::BigInt(i) => i as f64,
                    _ => 0.0,
                };
                Ok(PackValue::Float(unscaled * 10f64.powi(-(scale as i32))))
            }
            0x40..=0x5f => {
                let s = self.utf8((token & 0x1f) as usize + 1)?;
                self.note_value(&s);
                Ok(PackValue::Str(s))
            }
            0x60..=0x7f => {
                let s = self.utf8((token & 0x1f) as usize + 33)?;
                self.note_value(&s);
                Ok(PackValue::Str(s))
            }
            0x80..=0x9f => {
                let s = self.utf8((token & 0x1f) as usize + 2)?;
                self.note_value(&s);
                Ok(PackValue::Str(s))
            }
            0xa0..=0xbf => {
                let s = self.utf8((token & 0x1f) as usize + 34)?;
                self.note_value(&s);
                Ok(PackValue::Str(s))
            }
            0xc0..=0xdf => Ok(PackValue::Integer(zigzag_decode((token & 0x1f) as u64))),
            TOKEN_LONG_ASCII | TOKEN_LONG_UNICODE => {
                let s = self.read_long_str()?;
                Ok(PackValue::Str(s))
            }
            TOKEN_BIN_7BIT => {
                let len = self.read_vint()? as usize;
                self.read_7bit(len).map(PackValue::Bytes)
            }
            0xec..=0xef => {
                let low = self.u8()? as usize;
                let index = ((token & 0x03) as usize) << 8 | low;
                self.shared_value(index)
            }
            TOKEN_START_ARRAY => self.read_arr(),
            TOKEN_START_OBJECT => self.read_obj(),
            TOKEN_BIN_RAW => {
                let len = self.read_vint()? as usize;
                self.reader
                    .try_buf(len)
                    .map(|b| PackValue::Bytes(b.to_vec()))
                    .map_err(|_| self.end())
            }
            _ => Err(super::SmileError::InvalidToken { token, offset }),
        }
    }

    fn read_arr(&mut self) -> Result<PackValue, super::SmileError> {
        self.enter()?;
        let mut arr = Vec::new();
        loop {
            let next = self.reader.peek().map_err(|_| self.end())?;
            if next == TOKEN_END_ARRAY {
                self.reader.skip(1);
                break;
            }
            arr.push(self.read_value()?);
        }
        self.depth -= 1;
        Ok(PackValue::Array(arr))
    }

    fn read_obj(&mut self) -> Result<PackValue, super::SmileError> {
        self.enter()?;
        let mut obj = Vec::new();
        loop {
            let next = self.reader.peek().map_err(|_| self.end())?;
            if next == TOKEN_END_OBJECT {
                self.reader.skip(1);
                break;
            }
            let key = self.read_key()?;
            let val = self.read_value()?;
            obj.push((key, val));
        }
        self.depth -= 1;
        Ok(PackValue::Object(obj))
    }

    /// Reads one key-mode token.
    pub fn read_key(&mut self) -> Result<String, super::SmileError> {
        let offset = self.reader.x;
        let token = self.u8()?;
        match token {
            KEY_EMPTY => Ok(String::new()),
            0x30..=0x33 => {
                let low = self.u8()? as usize;
                let index = ((token & 0x03) as usize) << 8 | low;
                match self.shared_keys.get(index) {
                    Some(s) => Ok(s.to_owned()),
                    None => Err(super::SmileError::InvalidReference(index)),
                }
            }
            KEY_LONG_UNICODE => self.read_long_str(),
            0x40..=0x7f => {
                let index = (token - KEY_SHARED_SHORT) as usize;
                match self.shared_keys.get(index) {
                    Some(s) => Ok(s.to_owned()),
                    None => Err(super::SmileError::InvalidReference(index)),
                }
            }
            0x80..=0xbf => {
                let s = self.utf8((token & 0x3f) as usize + 1)?;
                self.note_key(&s);
                Ok(s)
            }
            0xc0..=0xf7 => {
                let s = self.utf8((token & 0x3f) as usize + 2)?;
                self.note_key(&s);
                Ok(s)
            }
            _ => Err(super::SmileError::InvalidToken { token, offset }),
        }
    }

    fn note_key(&mut self, s: &str) {
        if self.shared_names_enabled && super::shared::shareable(s) {
            self.shared_keys.append(s);
        }
    }
}

/// Interprets a big-endian two's-complement run, narrowing to the smallest
/// model variant.
fn big_from_twos_complement(bytes: &[u8]) -> PackValue {
    if bytes.is_empty() {
        return PackValue::Integer(0);
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut value: i128 = if negative { -1 } else { 0 };
    for &b in bytes.iter().take(16) {
        value = (value << 8) | b as i128;
    }
    if let Ok(i) = i64::try_from(value) {
        PackValue::Integer(i)
    } else if let Ok(u) = u64::try_from(value) {
        PackValue::UInteger(u)
    } else {
        PackValue::BigInt(value)
    }
}
