//! BSON document decoder.

use bytepack_buffers::{BufferError, Reader};

use super::error::BsonError;
use super::values::{BsonBinary, BsonObjectId, BsonValue};

pub struct BsonDecoder<'a> {
    pub reader: Reader<'a>,
}

impl Default for BsonDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> BsonDecoder<'a> {
    pub fn new() -> Self {
        Self {
            reader: Reader::new(&[]),
        }
    }

    pub fn decode(&mut self, input: &'a [u8]) -> Result<Vec<(String, BsonValue)>, BsonError> {
        self.reader.reset(input);
        self.read_document()
    }

    #[inline]
    fn end(&self) -> BsonError {
        BsonError::UnexpectedEnd(self.reader.x)
    }

    fn read_document(&mut self) -> Result<Vec<(String, BsonValue)>, BsonError> {
        let start = self.reader.x;
        let size = self.reader.try_u32_le().map_err(|_| self.end())? as usize;
        if size < 5 || start + size > self.reader.uint8.len() {
            return Err(BsonError::InvalidSize);
        }
        let mut fields = Vec::new();
        loop {
            let element = self.reader.try_u8().map_err(|_| self.end())?;
            if element == 0 {
                break;
            }
            let key = self.read_cstring()?;
            let value = self.read_value(element)?;
            fields.push((key, value));
        }
        if self.reader.x != start + size {
            return Err(BsonError::InvalidSize);
        }
        Ok(fields)
    }

    fn read_cstring(&mut self) -> Result<String, BsonError> {
        let start = self.reader.x;
        let data = self.reader.uint8;
        let mut x = start;
        while x < data.len() && data[x] != 0 {
            x += 1;
        }
        if x >= data.len() {
            return Err(BsonError::MissingTerminator);
        }
        let s = std::str::from_utf8(&data[start..x])
            .map_err(|_| BsonError::InvalidUtf8(start))?
            .to_owned();
        self.reader.x = x + 1;
        Ok(s)
    }

    fn read_string(&mut self) -> Result<String, BsonError> {
        let len = self.reader.try_u32_le().map_err(|_| self.end())? as usize;
        if len == 0 {
            return Err(BsonError::InvalidSize);
        }
        let at = self.reader.x;
        let s = match self.reader.try_utf8(len - 1) {
            Ok(s) => s.to_owned(),
            Err(BufferError::InvalidUtf8) => return Err(BsonError::InvalidUtf8(at)),
            Err(BufferError::EndOfBuffer) => return Err(self.end()),
        };
        let nul = self.reader.try_u8().map_err(|_| self.end())?;
        if nul != 0 {
            return Err(BsonError::MissingTerminator);
        }
        Ok(s)
    }

    fn read_value(&mut self, element: u8) -> Result<BsonValue, BsonError> {
        let offset = self.reader.x;
        match element {
            0x01 => Ok(BsonValue::Float(
                self.reader.try_f64_le().map_err(|_| self.end())?,
            )),
            0x02 => self.read_string().map(BsonValue::Str),
            0x03 => self.read_document().map(BsonValue::Document),
            0x04 => {
                let doc = self.read_document()?;
                Ok(BsonValue::Array(doc.into_iter().map(|(_, v)| v).collect()))
            }
            0x05 => {
                let len = self.reader.try_u32_le().map_err(|_| self.end())? as usize;
                let subtype = self.reader.try_u8().map_err(|_| self.end())?;
                let data = self
                    .reader
                    .try_buf(len)
                    .map(|b| b.to_vec())
                    .map_err(|_| self.end())?;
                Ok(BsonValue::Binary(BsonBinary { subtype, data }))
            }
            0x06 => Ok(BsonValue::Undefined),
            0x07 => {
                let timestamp = self.reader.try_u32().map_err(|_| self.end())?;
                let p = self.reader.try_buf(5).map_err(|_| self.end())?;
                let process = p.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
                let c = self.reader.try_buf(3).map_err(|_| self.end())?;
                let counter = c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                Ok(BsonValue::ObjectId(BsonObjectId {
                    timestamp,
                    process,
                    counter,
                }))
            }
            0x08 => Ok(BsonValue::Boolean(
                self.reader.try_u8().map_err(|_| self.end())? != 0,
            )),
            0x09 => Ok(BsonValue::DateTime(
                self.reader.try_i64_le().map_err(|_| self.end())?,
            )),
            0x0a => Ok(BsonValue::Null),
            0x0b => {
                let pattern = self.read_cstring()?;
                let flags = self.read_cstring()?;
                Ok(BsonValue::Regex(pattern, flags))
            }
            0x10 => Ok(BsonValue::Int32(
                self.reader.try_i32_le().map_err(|_| self.end())?,
            )),
            0x11 => {
                let inc = self.reader.try_u32_le().map_err(|_| self.end())?;
                let sec = self.reader.try_u32_le().map_err(|_| self.end())?;
                Ok(BsonValue::Timestamp(inc, sec))
            }
            0x12 => Ok(BsonValue::Int64(
                self.reader.try_i64_le().map_err(|_| self.end())?,
            )),
            0xff => Ok(BsonValue::MinKey),
            0x7f => Ok(BsonValue::MaxKey),
            element => Err(BsonError::UnknownElementType { element, offset }),
        }
    }
}
