//! MessagePack decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MsgPackError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected head byte 0x{head:02x} at byte {offset}")]
    UnexpectedHead { head: u8, offset: usize },
    #[error("invalid utf-8 in string at byte {0}")]
    InvalidUtf8(usize),
    #[error("recursion depth limit exceeded")]
    DepthExceeded,
    #[error("key not found")]
    KeyNotFound,
    #[error("array index out of bounds")]
    IndexOutOfBounds,
    #[error("expected object at byte {0}")]
    NotAnObject(usize),
    #[error("expected array at byte {0}")]
    NotAnArray(usize),
    #[error("expected string at byte {0}")]
    NotAString(usize),
    #[error("value span does not match expected size")]
    InvalidSize,
    #[error("forbidden object key \"__proto__\"")]
    ProtoKeyForbidden,
}
