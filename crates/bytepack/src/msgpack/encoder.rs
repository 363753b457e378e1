//! Full MessagePack encoder: extensions, undefined, and timestamps.

use super::constants::{EXT_TIMESTAMP, UNDEFINED};
use super::encoder_fast::MsgPackEncoderFast;
use crate::{PackExtension, PackValue};

/// Full MessagePack encoder.
///
/// Extends the fast core with the extension family (fixext1..16,
/// ext8/16/32), the undefined marker, and the standard timestamp extension.
pub struct MsgPackEncoder {
    pub inner: MsgPackEncoderFast,
}

impl Default for MsgPackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgPackEncoder {
    pub fn new() -> Self {
        Self {
            inner: MsgPackEncoderFast::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.inner.writer.reset();
        self.write_any(value);
        self.inner.writer.flush()
    }

    pub fn write_any(&mut self, value: &PackValue) {
        match value {
            PackValue::Undefined => self.inner.writer.u8(UNDEFINED),
            PackValue::Extension(ext) => self.write_ext(ext),
            PackValue::Array(arr) => {
                self.inner.write_arr_hdr(arr.len());
                for item in arr {
                    self.write_any(item);
                }
            }
            PackValue::Object(obj) => {
                self.inner.write_obj_hdr(obj.len());
                for (key, val) in obj {
                    self.inner.write_str(key);
                    self.write_any(val);
                }
            }
            PackValue::Map(map) => {
                self.inner.write_obj_hdr(map.len());
                for (key, val) in map {
                    self.write_any(key);
                    self.write_any(val);
                }
            }
            other => self.inner.write_any(other),
        }
    }

    pub fn write_ext_hdr(&mut self, tag: i8, length: usize) {
        let writer = &mut self.inner.writer;
        match length {
            1 => writer.u16(0xd4_00 | tag as u8 as u16),
            2 => writer.u16(0xd5_00 | tag as u8 as u16),
            4 => writer.u16(0xd6_00 | tag as u8 as u16),
            8 => writer.u16(0xd7_00 | tag as u8 as u16),
            16 => writer.u16(0xd8_00 | tag as u8 as u16),
            _ => {
                if length <= 0xff {
                    writer.u16(0xc7_00 | length as u16);
                } else if length <= 0xffff {
                    writer.u8u16(0xc8, length as u16);
                } else {
                    writer.u8u32(0xc9, length as u32);
                }
                writer.i8(tag);
            }
        }
    }

    /// Writes an extension value. The payload must already be bytes; other
    /// payloads are encoded in place without an extension envelope.
    pub fn write_ext(&mut self, ext: &PackExtension) {
        match ext.val.as_ref() {
            PackValue::Bytes(data) => {
                self.write_ext_hdr(ext.tag as i8, data.len());
                self.inner.writer.buf(data);
            }
            other => self.write_any(other),
        }
    }

    /// Writes the standard timestamp extension (type -1) in its smallest of
    /// the 32/64/96-bit layouts.
    pub fn write_timestamp(&mut self, sec: i64, nsec: u32) {
        let writer = &mut self.inner.writer;
        if nsec == 0 && (0..=u32::MAX as i64).contains(&sec) {
            writer.u16(0xd6_00 | EXT_TIMESTAMP as u8 as u16);
            writer.u32(sec as u32);
        } else if (0..1 << 34).contains(&sec) {
            writer.u16(0xd7_00 | EXT_TIMESTAMP as u8 as u16);
            writer.u64(((nsec as u64) << 34) | sec as u64);
        } else {
            writer.u16(0xc7_00 | 12);
            writer.i8(EXT_TIMESTAMP);
            writer.u32(nsec);
            writer.i64(sec);
        }
    }
}
