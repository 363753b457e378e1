//! BSON decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BsonError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("document size field does not match content")]
    InvalidSize,
    #[error("unknown element type 0x{element:02x} at byte {offset}")]
    UnknownElementType { element: u8, offset: usize },
    #[error("invalid utf-8 at byte {0}")]
    InvalidUtf8(usize),
    #[error("missing document terminator")]
    MissingTerminator,
}
