//! RESP v2/v3 decoder.

use bytepack_buffers::Reader;

use super::error::RespError;
use crate::{PackValue, DEFAULT_MAX_DEPTH};

/// RESP decoder. Accepts both protocol versions: RESP2 null bulk/array
/// (`$-1`, `*-1`) and the RESP3 types.
pub struct RespDecoder<'a> {
    pub reader: Reader<'a>,
    max_depth: usize,
    depth: usize,
}

impl Default for RespDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RespDecoder<'a> {
    pub fn new() -> Self {
        Self {
            reader: Reader::new(&[]),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, RespError> {
        self.reader.reset(input);
        self.depth = 0;
        self.read_any()
    }

    #[inline]
    fn end(&self) -> RespError {
        RespError::UnexpectedEnd(self.reader.x)
    }

    /// Reads bytes up to (excluding) the next CRLF and consumes the CRLF.
    fn read_line(&mut self) -> Result<&'a [u8], RespError> {
        let start = self.reader.x;
        let data = self.reader.uint8;
        let mut x = start;
        while x + 1 < data.len() {
            if data[x] == b'\r' && data[x + 1] == b'\n' {
                self.reader.x = x + 2;
                return Ok(&data[start..x]);
            }
            x += 1;
        }
        Err(RespError::MissingTerminator(start))
    }

    fn line_str(&mut self) -> Result<&'a str, RespError> {
        let at = self.reader.x;
        let line = self.read_line()?;
        std::str::from_utf8(line).map_err(|_| RespError::InvalidUtf8(at))
    }

    fn line_integer(&mut self) -> Result<i64, RespError> {
        let at = self.reader.x;
        self.line_str()?
            .parse()
            .map_err(|_| RespError::InvalidNumber(at))
    }

    /// Length line that may be `-1` (RESP2 null).
    fn line_length(&mut self) -> Result<Option<usize>, RespError> {
        let n = self.line_integer()?;
        if n < 0 {
            Ok(None)
        } else {
            Ok(Some(n as usize))
        }
    }

    pub fn read_any(&mut self) -> Result<PackValue, RespError> {
        let offset = self.reader.x;
        let byte = self.reader.try_u8().map_err(|_| self.end())?;
        match byte {
            b'_' => {
                self.read_line()?;
                Ok(PackValue::Null)
            }
            b'#' => {
                let line = self.read_line()?;
                Ok(PackValue::Bool(line == b"t"))
            }
            b':' => self.line_integer().map(PackValue::Integer),
            b',' => {
                let at = self.reader.x;
                let text = self.line_str()?;
                let f = match text {
                    "inf" => f64::INFINITY,
                    "-inf" => f64::NEG_INFINITY,
                    "nan" => f64::NAN,
                    other => other.parse().map_err(|_| RespError::InvalidNumber(at))?,
                };
                Ok(PackValue::Float(f))
            }
            b'(' => {
                let at = self.reader.x;
                let text = self.line_str()?;
                if let Ok(i) = text.parse::<i64>() {
                    Ok(PackValue::Integer(i))
                } else if let Ok(u) = text.parse::<u64>() {
                    Ok(PackValue::UInteger(u))
                } else if let Ok(i) = text.parse::<i128>() {
                    Ok(PackValue::BigInt(i))
                } else {
                    Err(RespError::InvalidNumber(at))
                }
            }
            b'+' => self.line_str().map(|s| PackValue::Str(s.to_owned())),
            b'-' | b'!' => {
                // Errors decode as strings; `!` carries a length-prefixed
                // payload.
                if byte == b'!' {
                    let Some(len) = self.line_length()? else {
                        return Ok(PackValue::Null);
                    };
                    let payload = self.read_payload(len)?;
                    let at = self.reader.x;
                    return String::from_utf8(payload)
                        .map(PackValue::Str)
                        .map_err(|_| RespError::InvalidUtf8(at));
                }
                self.line_str().map(|s| PackValue::Str(s.to_owned()))
            }
            b'$' => {
                let Some(len) = self.line_length()? else {
                    return Ok(PackValue::Null);
                };
                let payload = self.read_payload(len)?;
                // Valid UTF-8 decodes as text, anything else stays binary.
                match String::from_utf8(payload) {
                    Ok(s) => Ok(PackValue::Str(s)),
                    Err(err) => Ok(PackValue::Bytes(err.into_bytes())),
                }
            }
            b'=' => {
                let Some(len) = self.line_length()? else {
                    return Ok(PackValue::Null);
                };
                let payload = self.read_payload(len)?;
                let at = self.reader.x;
                let text =
                    String::from_utf8(payload).map_err(|_| RespError::InvalidUtf8(at))?;
                // Strip the `txt:`/`mkd:` discipline prefix.
                Ok(PackValue::Str(
                    text.get(4..).map(str::to_owned).unwrap_or(text),
                ))
            }
            b'*' | b'~' | b'>' => {
                let Some(len) = self.line_length()? else {
                    return Ok(PackValue::Null);
                };
                self.read_items(len).map(PackValue::Array)
            }
            b'%' => {
                let Some(len) = self.line_length()? else {
                    return Ok(PackValue::Null);
                };
                self.read_map(len)
            }
            byte => Err(RespError::UnexpectedType { byte, offset }),
        }
    }

    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, RespError> {
        let data = self
            .reader
            .try_buf(len)
            .map(|b| b.to_vec())
            .map_err(|_| self.end())?;
        let at = self.reader.x;
        let crlf = self.reader.try_buf(2).map_err(|_| self.end())?;
        if crlf != b"\r\n" {
            return Err(RespError::MissingTerminator(at));
        }
        Ok(data)
    }

    fn read_items(&mut self, len: usize) -> Result<Vec<PackValue>, RespError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RespError::DepthExceeded);
        }
        let mut items = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            items.push(self.read_any()?);
        }
        self.depth -= 1;
        Ok(items)
    }

    fn read_map(&mut self, len: usize) -> Result<PackValue, RespError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RespError::DepthExceeded);
        }
        let mut entries = Vec::with_capacity(len.min(4096));
        let mut all_str = true;
        for _ in 0..len {
            let key = self.read_any()?;
            if !matches!(key, PackValue::Str(_)) {
                all_str = false;
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
}
