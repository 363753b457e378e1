//! Ion decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IonError {
    #[error("missing or invalid ion version marker")]
    InvalidVersionMarker,
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("unsupported type descriptor 0x{descriptor:02x} at byte {offset}")]
    UnsupportedType { descriptor: u8, offset: usize },
    #[error("unknown symbol id {0}")]
    UnknownSymbol(usize),
    #[error("invalid utf-8 at byte {0}")]
    InvalidUtf8(usize),
    #[error("malformed variable-length integer")]
    MalformedVarUInt,
}
