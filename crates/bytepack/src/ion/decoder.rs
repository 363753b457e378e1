//! Ion binary decoder.

use bytepack_buffers::{BufferError, Reader};

use super::error::IonError;
use super::symbols::{IonSymbols, SID_ION_SYMBOL_TABLE, SID_SYMBOLS};
use super::ION_BVM;
use crate::PackValue;

pub struct IonDecoder<'a> {
    pub reader: Reader<'a>,
    symbols: IonSymbols,
}

impl Default for IonDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IonDecoder<'a> {
    pub fn new() -> Self {
        Self {
            reader: Reader::new(&[]),
            symbols: IonSymbols::new(),
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<PackValue, IonError> {
        self.reader.reset(input);
        self.symbols.clear();
        let marker = self
            .reader
            .try_buf(4)
            .map_err(|_| IonError::InvalidVersionMarker)?;
        if marker != ION_BVM {
            return Err(IonError::InvalidVersionMarker);
        }
        loop {
            let value = self.read_value()?;
            // Local symbol tables precede the data they describe.
            if let Some(symbols) = take_symbol_table(&value) {
                for sym in symbols {
                    self.symbols.import(sym);
                }
                continue;
            }
            return Ok(strip_annotation(value));
        }
    }

    #[inline]
    fn end(&self) -> IonError {
        IonError::UnexpectedEnd(self.reader.x)
    }

    fn read_varuint(&mut self) -> Result<u64, IonError> {
        let mut value = 0u64;
        for _ in 0..10 {
            let byte = self.reader.try_u8().map_err(|_| self.end())?;
            value = (value << 7) | (byte & 0x7f) as u64;
            if byte & 0x80 != 0 {
                return Ok(value);
            }
        }
        Err(IonError::MalformedVarUInt)
    }

    /// Reads the length encoded by the descriptor's low nibble.
    fn read_length(&mut self, low: u8) -> Result<usize, IonError> {
        if low == 14 {
            Ok(self.read_varuint()? as usize)
        } else {
            Ok(low as usize)
        }
    }

    fn read_value(&mut self) -> Result<PackValue, IonError> {
        let offset = self.reader.x;
        let descriptor = self.reader.try_u8().map_err(|_| self.end())?;
        let high = descriptor >> 4;
        let low = descriptor & 0x0f;

        // Null of any type.
        if low == 15 {
            return Ok(PackValue::Null);
        }

        match high {
            0x0 => Ok(PackValue::Null),
            0x1 => Ok(PackValue::Bool(low != 0)),
            0x2 => {
                let len = self.read_length(low)?;
                let magnitude = self.read_magnitude(len)?;
                Ok(narrow_uint(magnitude))
            }
            0x3 => {
                let len = self.read_length(low)?;
                let magnitude = self.read_magnitude(len)?;
                Ok(narrow_int(-(magnitude as i128)))
            }
            0x4 => {
                let len = self.read_length(low)?;
                match len {
                    0 => Ok(PackValue::Float(0.0)),
                    4 => {
                        let v = self.reader.try_f32().map_err(|_| self.end())?;
                        Ok(PackValue::Float(v as f64))
                    }
                    8 => {
                        let v = self.reader.try_f64().map_err(|_| self.end())?;
                        Ok(PackValue::Float(v))
                    }
                    _ => Err(IonError::UnsupportedType { descriptor, offset }),
                }
            }
            0x7 => {
                // Symbol value: resolve through the table.
                let len = self.read_length(low)?;
                let sid = self.read_magnitude(len)? as usize;
                match self.symbols.resolve(sid) {
                    Some(text) => Ok(PackValue::Str(text.to_owned())),
                    None => Err(IonError::UnknownSymbol(sid)),
                }
            }
            0x8 => {
                let len = self.read_length(low)?;
                let at = self.reader.x;
                match self.reader.try_utf8(len) {
                    Ok(s) => Ok(PackValue::Str(s.to_owned())),
                    Err(BufferError::InvalidUtf8) => Err(IonError::InvalidUtf8(at)),
                    Err(BufferError::EndOfBuffer) => Err(IonError::UnexpectedEnd(at)),
                }
            }
            0x9 | 0xa => {
                let len = self.read_length(low)?;
                self.reader
                    .try_buf(len)
                    .map(|b| PackValue::Bytes(b.to_vec()))
                    .map_err(|_| self.end())
            }
            0xb | 0xc => {
                let len = self.read_length(low)?;
                if len > self.reader.remaining() {
                    return Err(self.end());
                }
                let end = self.reader.x + len;
                let mut arr = Vec::new();
                while self.reader.x < end {
                    arr.push(self.read_value()?);
                }
                Ok(PackValue::Array(arr))
            }
            0xd => {
                let len = self.read_length(low)?;
                if len > self.reader.remaining() {
                    return Err(self.end());
                }
                let end = self.reader.x + len;
                let mut obj = Vec::new();
                while self.reader.x < end {
                    let sid = self.read_varuint()? as usize;
                    let val = self.read_value()?;
                    let key = self
                        .symbols
                        .resolve(sid)
                        .map(str::to_owned)
                        .unwrap_or_else(|| format!("${sid}"));
                    obj.push((key, val));
                }
                Ok(PackValue::Object(obj))
            }
            0xe => {
                // Annotation wrapper: keep the annotations as an extension
                // so the symbol-table pass can inspect them.
                let _len = self.read_length(low)?;
                let annot_len = self.read_varuint()? as usize;
                if annot_len > self.reader.remaining() {
                    return Err(self.end());
                }
                let annot_end = self.reader.x + annot_len;
                let mut first_sid = 0usize;
                let mut first = true;
                while self.reader.x < annot_end {
                    let sid = self.read_varuint()? as usize;
                    if first {
                        first_sid = sid;
                        first = false;
                    }
                }
                let inner = self.read_value()?;
                Ok(PackValue::extension(first_sid as u64, inner))
            }
            _ => Err(IonError::UnsupportedType { descriptor, offset }),
        }
    }

    fn read_magnitude(&mut self, len: usize) -> Result<u128, IonError> {
        let bytes = self.reader.try_buf(len).map_err(|_| self.end())?;
        if bytes.len() > 16 {
            return Err(IonError::MalformedVarUInt);
        }
        Ok(bytes.iter().fold(0u128, |acc, &b| (acc << 8) | b as u128))
    }
}

fn narrow_uint(magnitude: u128) -> PackValue {
    if magnitude <= i64::MAX as u128 {
        PackValue::Integer(magnitude as i64)
    } else if magnitude <= u64::MAX as u128 {
        PackValue::UInteger(magnitude as u64)
    } else {
        PackValue::BigInt(magnitude as i128)
    }
}

fn narrow_int(value: i128) -> PackValue {
    if let Ok(i) = i64::try_from(value) {
        PackValue::Integer(i)
    } else {
        PackValue::BigInt(value)
    }
}

/// Extracts the symbol list from a `$ion_symbol_table` annotation, if the
/// value is one.
fn take_symbol_table(value: &PackValue) -> Option<Vec<String>> {
    let PackValue::Extension(ext) = value else {
        return None;
    };
    if ext.tag != SID_ION_SYMBOL_TABLE as u64 {
        return None;
    }
    let PackValue::Object(fields) = ext.val.as_ref() else {
        return None;
    };
    let symbols_key = format!("${SID_SYMBOLS}");
    for (key, val) in fields {
        if key == "symbols" || *key == symbols_key {
            if let PackValue::Array(items) = val {
                return Some(
                    items
                        .iter()
                        .filter_map(|item| match item {
                            PackValue::Str(s) => Some(s.clone()),
                            _ => None,
                        })
                        .collect(),
                );
            }
        }
    }
    Some(Vec::new())
}

/// Unwraps a non-symbol-table annotation to its inner value.
fn strip_annotation(value: PackValue) -> PackValue {
    match value {
        PackValue::Extension(ext) if ext.tag != SID_ION_SYMBOL_TABLE as u64 => *ext.val,
        other => other,
    }
}
