//! Fault-tolerant JSON decoder.
//!
//! Parses input that may be truncated mid-container or contain a corrupt
//! element, returning the prefix that was successfully assembled. Structural
//! errors that cannot be recovered in place (an unterminated string span, a
//! forbidden key) still fail.

use super::decoder::{JsonDecoder, JsonDecoderOptions};
use super::error::JsonError;
use crate::PackValue;

/// Carries a partially-decoded value up the call stack. `None` means the
/// element was unusable and is dropped; `Some(v)` is partial but kept.
struct Recovered(Option<PackValue>);

/// Tolerant JSON decoder.
pub struct JsonDecoderPartial<'a> {
    pub inner: JsonDecoder<'a>,
}

impl Default for JsonDecoderPartial<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> JsonDecoderPartial<'a> {
    pub fn new() -> Self {
        Self {
            inner: JsonDecoder::new(),
        }
    }

    pub fn with_options(options: JsonDecoderOptions) -> Self {
        Self {
            inner: JsonDecoder::with_options(options),
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, JsonError> {
        self.inner.data = input;
        self.inner.x = 0;
        self.inner.depth = 0;
        match self.read_any_partial() {
            Ok(v) => Ok(v),
            Err(Recovered(Some(v))) => Ok(v),
            Err(Recovered(None)) => Err(JsonError::InvalidJson(self.inner.x)),
        }
    }

    /// Containers dispatch to the tolerant readers; scalars to the strict
    /// core.
    fn read_any_partial(&mut self) -> Result<PackValue, Recovered> {
        self.inner.skip_whitespace();
        if self.inner.x >= self.inner.data.len() {
            return Err(Recovered(None));
        }
        match self.inner.data[self.inner.x] {
            b'[' => {
                if self.inner.depth >= self.inner.options.max_depth {
                    return Err(Recovered(None));
                }
                self.inner.depth += 1;
                let result = self.read_arr().map_err(|_| Recovered(None));
                self.inner.depth -= 1;
                result
            }
            b'{' => {
                if self.inner.depth >= self.inner.options.max_depth {
                    return Err(Recovered(None));
                }
                self.inner.depth += 1;
                let result = self.read_obj().map_err(|_| Recovered(None));
                self.inner.depth -= 1;
                result
            }
            _ => self.inner.read_any().map_err(|_| Recovered(None)),
        }
    }

    pub fn read_arr(&mut self) -> Result<PackValue, JsonError> {
        if self.inner.x >= self.inner.data.len() || self.inner.data[self.inner.x] != b'[' {
            return Err(JsonError::InvalidJson(self.inner.x));
        }
        self.inner.x += 1;
        let mut arr: Vec<PackValue> = Vec::new();
        let mut first = true;
        loop {
            self.inner.skip_whitespace();
            if self.inner.x >= self.inner.data.len() {
                // Truncated input: keep what was collected.
                return Ok(PackValue::Array(arr));
            }
            let ch = self.inner.data[self.inner.x];
            if ch == b']' {
                self.inner.x += 1;
                return Ok(PackValue::Array(arr));
            }
            if ch == b',' {
                self.inner.x += 1;
                self.inner.skip_whitespace();
                // Repeated or trailing commas yield no element.
                if self.inner.x < self.inner.data.len()
                    && matches!(self.inner.data[self.inner.x], b',' | b']')
                {
                    continue;
                }
            } else if !first {
                // Missing separator: stop here.
                return Ok(PackValue::Array(arr));
            }
            if self.inner.x >= self.inner.data.len() {
                return Ok(PackValue::Array(arr));
            }
            match self.read_any_partial() {
                Ok(v) => arr.push(v),
                Err(Recovered(Some(v))) => {
                    arr.push(v);
                    return Ok(PackValue::Array(arr));
                }
                Err(Recovered(None)) => return Ok(PackValue::Array(arr)),
            }
            first = false;
        }
    }

    pub fn read_obj(&mut self) -> Result<PackValue, JsonError> {
        if self.inner.x >= self.inner.data.len() || self.inner.data[self.inner.x] != b'{' {
            return Err(JsonError::InvalidJson(self.inner.x));
        }
        self.inner.x += 1;
        let mut obj: Vec<(String, PackValue)> = Vec::new();
        loop {
            self.inner.skip_whitespace();
            if self.inner.x >= self.inner.data.len() {
                return Ok(PackValue::Object(obj));
            }
            let ch = self.inner.data[self.inner.x];
            if ch == b'}' {
                self.inner.x += 1;
                return Ok(PackValue::Object(obj));
            }
            if ch == b',' {
                self.inner.x += 1;
                continue;
            }
            if ch != b'"' {
                return Ok(PackValue::Object(obj));
            }
            let key = match self.inner.read_key() {
                Ok(k) => k,
                Err(JsonError::ProtoKeyForbidden) => return Err(JsonError::ProtoKeyForbidden),
                Err(_) => return Ok(PackValue::Object(obj)),
            };
            self.inner.skip_whitespace();
            if self.inner.x >= self.inner.data.len() || self.inner.data[self.inner.x] != b':' {
                // Key without a value: drop the entry.
                return Ok(PackValue::Object(obj));
            }
            self.inner.x += 1;
            self.inner.skip_whitespace();
            match self.read_any_partial() {
                Ok(v) => obj.push((key, v)),
                Err(Recovered(Some(v))) => {
                    obj.push((key, v));
                    return Ok(PackValue::Object(obj));
                }
                Err(Recovered(None)) => return Ok(PackValue::Object(obj)),
            }
        }
    }
}
