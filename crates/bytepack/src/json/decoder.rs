//! Strict JSON decoder producing [`PackValue`].
//!
//! Beyond RFC 8259: strings carrying the configured base64 data-URI prefix
//! decode to [`PackValue::Bytes`], and the CBOR-undefined sentinel string
//! round-trips [`PackValue::Undefined`].

use bytepack_base64::from_base64_bin;

use super::error::JsonError;
use super::util::find_ending_quote;
use crate::json_binary::{BIN_URI_START, UNDEF_URI};
use crate::{PackValue, DEFAULT_MAX_DEPTH};

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct JsonDecoderOptions {
    /// Accept `"__proto__"` object keys instead of failing.
    pub allow_proto_key: bool,
    /// Prefix marking a string as base64-wrapped binary. `None` disables the
    /// binary round-trip entirely.
    pub binary_prefix: Option<String>,
    /// Recursion depth cap.
    pub max_depth: usize,
}

impl Default for JsonDecoderOptions {
    fn default() -> Self {
        Self {
            allow_proto_key: false,
            binary_prefix: Some(BIN_URI_START.to_owned()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Strict JSON decoder.
pub struct JsonDecoder<'a> {
    pub data: &'a [u8],
    pub x: usize,
    pub(super) options: JsonDecoderOptions,
    pub(super) depth: usize,
}

impl Default for JsonDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> JsonDecoder<'a> {
    pub fn new() -> Self {
        Self::with_options(JsonDecoderOptions::default())
    }

    pub fn with_options(options: JsonDecoderOptions) -> Self {
        Self {
            data: &[],
            x: 0,
            options,
            depth: 0,
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, JsonError> {
        self.data = input;
        self.x = 0;
        self.depth = 0;
        self.read_any()
    }

    pub fn read_any(&mut self) -> Result<PackValue, JsonError> {
        self.skip_whitespace();
        let x = self.x;
        if x >= self.data.len() {
            return Err(JsonError::InvalidJson(x));
        }
        match self.data[x] {
            b'"' => {
                if x + 1 < self.data.len() && self.data[x + 1] == b'd' {
                    if let Some(bin) = self.try_read_bin()? {
                        return Ok(PackValue::Bytes(bin));
                    }
                    if self.starts_with_at(UNDEF_URI.as_bytes(), x + 1)
                        && self.data.get(x + 1 + UNDEF_URI.len()) == Some(&b'"')
                    {
                        self.x = x + 2 + UNDEF_URI.len();
                        return Ok(PackValue::Undefined);
                    }
                }
                Ok(PackValue::Str(self.read_str()?))
            }
            b'[' => self.read_arr(),
            b'{' => self.read_obj(),
            b't' => self.read_literal(b"true", PackValue::Bool(true)),
            b'f' => self.read_literal(b"false", PackValue::Bool(false)),
            b'n' => self.read_literal(b"null", PackValue::Null),
            c if c.is_ascii_digit() || c == b'-' => self.read_num(),
            _ => Err(JsonError::InvalidJson(x)),
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.x < self.data.len() {
            match self.data[self.x] {
                b' ' | b'\t' | b'\n' | b'\r' => self.x += 1,
                _ => break,
            }
        }
    }

    fn starts_with_at(&self, needle: &[u8], at: usize) -> bool {
        self.data.len() >= at + needle.len() && &self.data[at..at + needle.len()] == needle
    }

    fn read_literal(&mut self, word: &[u8], value: PackValue) -> Result<PackValue, JsonError> {
        if !self.starts_with_at(word, self.x) {
            return Err(JsonError::InvalidJson(self.x));
        }
        self.x += word.len();
        Ok(value)
    }

    /// Reads a number. The body scan admits `e`/`E` exponents with an
    /// optional sign; integers widen i64 → u64 → i128 as needed.
    pub fn read_num(&mut self) -> Result<PackValue, JsonError> {
        let start = self.x;
        let data = self.data;
        let len = data.len();
        let mut x = self.x;
        if x < len && data[x] == b'-' {
            x += 1;
        }
        while x < len && data[x].is_ascii_digit() {
            x += 1;
        }
        let mut is_float = false;
        if x < len && data[x] == b'.' {
            is_float = true;
            x += 1;
            while x < len && data[x].is_ascii_digit() {
                x += 1;
            }
        }
        if x < len && (data[x] == b'e' || data[x] == b'E') {
            is_float = true;
            x += 1;
            if x < len && (data[x] == b'+' || data[x] == b'-') {
                x += 1;
            }
            while x < len && data[x].is_ascii_digit() {
                x += 1;
            }
        }
        self.x = x;

        let s = std::str::from_utf8(&data[start..x]).map_err(|_| JsonError::InvalidUtf8(start))?;
        if is_float {
            let f: f64 = s.parse().map_err(|_| JsonError::InvalidJson(start))?;
            Ok(PackValue::Float(f))
        } else if let Ok(i) = s.parse::<i64>() {
            Ok(PackValue::Integer(i))
        } else if let Ok(u) = s.parse::<u64>() {
            Ok(PackValue::UInteger(u))
        } else if let Ok(i) = s.parse::<i128>() {
            Ok(PackValue::BigInt(i))
        } else {
            Err(JsonError::InvalidJson(start))
        }
    }

    /// Reads a quoted string, decoding escapes.
    pub fn read_str(&mut self) -> Result<String, JsonError> {
        if self.x >= self.data.len() || self.data[self.x] != b'"' {
            return Err(JsonError::InvalidJson(self.x));
        }
        let x0 = self.x + 1;
        let x1 = find_ending_quote(self.data, x0)?;
        let s = decode_string_body(&self.data[x0..x1], x0)?;
        self.x = x1 + 1;
        Ok(s)
    }

    /// Attempts to read a base64 data-URI string as binary.
    pub fn try_read_bin(&mut self) -> Result<Option<Vec<u8>>, JsonError> {
        let prefix = match &self.options.binary_prefix {
            Some(p) => p.as_bytes(),
            None => return Ok(None),
        };
        let x = self.x;
        if x >= self.data.len() || self.data[x] != b'"' {
            return Ok(None);
        }
        let content_start = x + 1;
        if !self.starts_with_at(prefix, content_start) {
            return Ok(None);
        }
        let b64_start = content_start + prefix.len();
        let b64_end = find_ending_quote(self.data, b64_start)?;
        let bin = from_base64_bin(self.data, b64_start, b64_end - b64_start)
            .map_err(|_| JsonError::InvalidJson(b64_start))?;
        self.x = b64_end + 1;
        Ok(Some(bin))
    }

    pub fn read_arr(&mut self) -> Result<PackValue, JsonError> {
        if self.x >= self.data.len() || self.data[self.x] != b'[' {
            return Err(JsonError::InvalidJson(self.x));
        }
        self.enter()?;
        self.x += 1;
        let mut arr = Vec::new();
        let mut first = true;
        loop {
            self.skip_whitespace();
            if self.x >= self.data.len() {
                return Err(JsonError::InvalidJson(self.x));
            }
            match self.data[self.x] {
                b']' => {
                    self.x += 1;
                    self.depth -= 1;
                    return Ok(PackValue::Array(arr));
                }
                b',' => {
                    if first {
                        return Err(JsonError::InvalidJson(self.x));
                    }
                    self.x += 1;
                }
                _ if !first => return Err(JsonError::InvalidJson(self.x)),
                _ => {}
            }
            self.skip_whitespace();
            arr.push(self.read_any()?);
            first = false;
        }
    }

    pub fn read_obj(&mut self) -> Result<PackValue, JsonError> {
        if self.x >= self.data.len() || self.data[self.x] != b'{' {
            return Err(JsonError::InvalidJson(self.x));
        }
        self.enter()?;
        self.x += 1;
        let mut obj = Vec::new();
        let mut first = true;
        loop {
            self.skip_whitespace();
            if self.x >= self.data.len() {
                return Err(JsonError::InvalidJson(self.x));
            }
            match self.data[self.x] {
                b'}' => {
                    self.x += 1;
                    self.depth -= 1;
                    return Ok(PackValue::Object(obj));
                }
                b',' => {
                    if first {
                        return Err(JsonError::InvalidJson(self.x));
                    }
                    self.x += 1;
                }
                _ if !first => return Err(JsonError::InvalidJson(self.x)),
                _ => {}
            }
            self.skip_whitespace();
            if self.x >= self.data.len() || self.data[self.x] != b'"' {
                return Err(JsonError::InvalidJson(self.x));
            }
            let key = self.read_key()?;
            self.skip_whitespace();
            if self.x >= self.data.len() || self.data[self.x] != b':' {
                return Err(JsonError::InvalidJson(self.x));
            }
            self.x += 1;
            self.skip_whitespace();
            let val = self.read_any()?;
            obj.push((key, val));
            first = false;
        }
    }

    /// Reads a quoted object key.
    pub fn read_key(&mut self) -> Result<String, JsonError> {
        let key = self.read_str()?;
        if key == "__proto__" && !self.options.allow_proto_key {
            return Err(JsonError::ProtoKeyForbidden);
        }
        Ok(key)
    }

    #[inline]
    fn enter(&mut self) -> Result<(), JsonError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(JsonError::DepthExceeded);
        }
        Ok(())
    }
}

/// Decodes a string body (between the quotes) with escape handling.
fn decode_string_body(bytes: &[u8], offset: usize) -> Result<String, JsonError> {
    // Fast path: no escapes.
    if !bytes.contains(&b'\\') {
        return std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| JsonError::InvalidUtf8(offset));
    }
    // Re-quote and let serde_json resolve escapes and surrogate pairs.
    let mut quoted = Vec::with_capacity(bytes.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(bytes);
    quoted.push(b'"');
    serde_json::from_slice(&quoted).map_err(|_| JsonError::InvalidJson(offset))
}
