//! Ion binary encoder.
//!
//! Emits the version marker, a local symbol table covering every struct
//! field name in the document, then the value. Container contents are built
//! bottom-up so each type descriptor carries a known length.

use bytepack_buffers::Writer;

use super::symbols::{IonSymbols, SID_ION_SYMBOL_TABLE, SID_SYMBOLS};
use super::ION_BVM;
use crate::PackValue;

// Type descriptor high nibbles.
const T_NULL: u8 = 0x0;
const T_BOOL: u8 = 0x1;
const T_POS_INT: u8 = 0x2;
const T_NEG_INT: u8 = 0x3;
const T_FLOAT: u8 = 0x4;
const T_STRING: u8 = 0x8;
const T_BLOB: u8 = 0xa;
const T_LIST: u8 = 0xb;
const T_STRUCT: u8 = 0xd;
const T_ANNOTATION: u8 = 0xe;

pub struct IonEncoder {
    pub writer: Writer,
    symbols: IonSymbols,
}

impl Default for IonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl IonEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
            symbols: IonSymbols::new(),
        }
    }

    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.writer.reset();
        self.symbols.clear();
        self.collect_symbols(value);
        self.writer.buf(&ION_BVM);
        if self.symbols.has_user_symbols() {
            self.write_symbol_table();
        }
        let body = self.value_bytes(value);
        self.writer.buf(&body);
        self.writer.flush()
    }

    /// First pass: register every struct field name.
    fn collect_symbols(&mut self, value: &PackValue) {
        match value {
            PackValue::Object(obj) => {
                for (key, val) in obj {
                    self.symbols.add(key);
                    self.collect_symbols(val);
                }
            }
            PackValue::Map(map) => {
                for (key, val) in map {
                    if let PackValue::Str(k) = key {
                        self.symbols.add(k);
                    }
                    self.collect_symbols(val);
                }
            }
            PackValue::Array(arr) => {
                for item in arr {
                    self.collect_symbols(item);
                }
            }
            PackValue::Extension(ext) => self.collect_symbols(&ext.val),
            _ => {}
        }
    }

    /// `$ion_symbol_table::{ symbols: [...] }` annotation wrapper.
    fn write_symbol_table(&mut self) {
        let mut symbols_list = Vec::new();
        for sym in self.symbols.user_symbols() {
            push_descriptor(&mut symbols_list, T_STRING, sym.len());
            symbols_list.extend_from_slice(sym.as_bytes());
        }

        let mut list = Vec::new();
        push_descriptor(&mut list, T_LIST, symbols_list.len());
        list.extend_from_slice(&symbols_list);

        let mut strukt = Vec::new();
        let mut fields = Vec::new();
        push_varuint(&mut fields, SID_SYMBOLS as u64);
        fields.extend_from_slice(&list);
        push_descriptor(&mut strukt, T_STRUCT, fields.len());
        strukt.extend_from_slice(&fields);

        // Annotation wrapper: annot_length, annotation SIDs, value.
        let mut annots = Vec::new();
        push_varuint(&mut annots, SID_ION_SYMBOL_TABLE as u64);
        let mut body = Vec::new();
        push_varuint(&mut body, annots.len() as u64);
        body.extend_from_slice(&annots);
        body.extend_from_slice(&strukt);

        let mut out = Vec::new();
        push_descriptor(&mut out, T_ANNOTATION, body.len());
        out.extend_from_slice(&body);
        self.writer.buf(&out);
    }

    /// Builds the byte representation of one value.
    fn value_bytes(&self, value: &PackValue) -> Vec<u8> {
        let mut out = Vec::new();
        self.push_value(&mut out, value);
        out
    }

    fn push_value(&self, out: &mut Vec<u8>, value: &PackValue) {
        match value {
            PackValue::Null | PackValue::Undefined => out.push((T_NULL << 4) | 0x0f),
            PackValue::Bool(b) => out.push((T_BOOL << 4) | *b as u8),
            PackValue::Integer(i) => push_int(out, *i as i128),
            PackValue::UInteger(u) => push_uint_magnitude(out, T_POS_INT, *u as u128),
            PackValue::BigInt(i) => push_int(out, *i),
            PackValue::Float(f) => {
                let narrowed = *f as f32;
                if narrowed as f64 == *f {
                    out.push((T_FLOAT << 4) | 4);
                    out.extend_from_slice(&narrowed.to_be_bytes());
                } else {
                    out.push((T_FLOAT << 4) | 8);
                    out.extend_from_slice(&f.to_be_bytes());
                }
            }
            PackValue::Str(s) => {
                push_descriptor(out, T_STRING, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            PackValue::Bytes(b) => {
                push_descriptor(out, T_BLOB, b.len());
                out.extend_from_slice(b);
            }
            PackValue::Array(arr) => {
                let mut content = Vec::new();
                for item in arr {
                    self.push_value(&mut content, item);
                }
                push_descriptor(out, T_LIST, content.len());
                out.extend_from_slice(&content);
            }
            PackValue::Object(obj) => {
                let mut content = Vec::new();
                for (key, val) in obj {
                    let sid = self.symbols.lookup(key).unwrap_or(0);
                    push_varuint(&mut content, sid as u64);
                    self.push_value(&mut content, val);
                }
                push_descriptor(out, T_STRUCT, content.len());
                out.extend_from_slice(&content);
            }
            PackValue::Map(map) => {
                let mut content = Vec::new();
                for (key, val) in map {
                    if let PackValue::Str(k) = key {
                        let sid = self.symbols.lookup(k).unwrap_or(0);
                        push_varuint(&mut content, sid as u64);
                        self.push_value(&mut content, val);
                    }
                }
                push_descriptor(out, T_STRUCT, content.len());
                out.extend_from_slice(&content);
            }
            PackValue::TypedArray(arr) => {
                self.push_value(out, &PackValue::Array(arr.to_values()))
            }
            PackValue::Extension(ext) => self.push_value(out, &ext.val),
            PackValue::Blob(blob) => out.extend_from_slice(&blob.bytes),
        }
    }
}

/// Type descriptor with inline (L < 14) or VarUInt length.
fn push_descriptor(out: &mut Vec<u8>, high: u8, len: usize) {
    if len < 14 {
        out.push((high << 4) | len as u8);
    } else {
        out.push((high << 4) | 14);
        push_varuint(out, len as u64);
    }
}

/// VarUInt: 7-bit groups, most significant first, final byte flagged with
/// the high bit.
fn push_varuint(out: &mut Vec<u8>, n: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    let mut rest = n;
    loop {
        groups[count] = (rest & 0x7f) as u8;
        count += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (1..count).rev() {
        out.push(groups[i]);
    }
    out.push(groups[0] | 0x80);
}

fn push_int(out: &mut Vec<u8>, value: i128) {
    if value >= 0 {
        push_uint_magnitude(out, T_POS_INT, value as u128);
    } else {
        push_uint_magnitude(out, T_NEG_INT, value.unsigned_abs());
    }
}

/// Magnitude as minimal big-endian bytes under the given type nibble.
/// Zero encodes as `0x20`, the zero-length positive int.
fn push_uint_magnitude(out: &mut Vec<u8>, high: u8, magnitude: u128) {
    let bytes = magnitude.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let minimal = &bytes[skip..];
    push_descriptor(out, high, minimal.len());
    out.extend_from_slice(minimal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varuint_single_and_multi_byte() {
        let mut out = Vec::new();
        push_varuint(&mut out, 0);
        assert_eq!(out, [0x80]);
        out.clear();
        push_varuint(&mut out, 127);
        assert_eq!(out, [0xff]);
        out.clear();
        push_varuint(&mut out, 128);
        assert_eq!(out, [0x01, 0x80]);
    }

    #[test]
    fn null_document() {
        let mut enc = IonEncoder::new();
        assert_eq!(enc.encode(&PackValue::Null), [0xe0, 0x01, 0x00, 0xea, 0x0f]);
    }

    #[test]
    fn booleans() {
        let mut enc = IonEncoder::new();
        assert_eq!(enc.encode(&PackValue::Bool(true)), [0xe0, 0x01, 0x00, 0xea, 0x11]);
        assert_eq!(
            enc.encode(&PackValue::Bool(false)),
            [0xe0, 0x01, 0x00, 0xea, 0x10]
        );
    }

    #[test]
    fn zero_is_zero_length_uint() {
        let mut enc = IonEncoder::new();
        assert_eq!(
            enc.encode(&PackValue::Integer(0)),
            [0xe0, 0x01, 0x00, 0xea, 0x20]
        );
    }
}
