//! CBOR encode/decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected major {major} at byte {offset}")]
    UnexpectedMajor { major: u8, offset: usize },
    #[error("unexpected minor {minor} at byte {offset}")]
    UnexpectedMinor { minor: u8, offset: usize },
    #[error("unexpected break (0xff) at byte {0}")]
    UnexpectedBreak(usize),
    #[error("invalid utf-8 in text string at byte {0}")]
    InvalidUtf8(usize),
    #[error("value span does not match expected size")]
    InvalidSize,
    #[error("recursion depth limit exceeded")]
    DepthExceeded,
    #[error("key not found")]
    KeyNotFound,
    #[error("array index out of bounds")]
    IndexOutOfBounds,
    #[error("expected map at byte {0}")]
    NotAnObject(usize),
    #[error("expected array at byte {0}")]
    NotAnArray(usize),
    #[error("expected text string at byte {0}")]
    NotAString(usize),
    #[error("forbidden object key \"__proto__\"")]
    ProtoKeyForbidden,
    #[error("value cannot be represented in this encoder profile")]
    UnsupportedValue,
}
