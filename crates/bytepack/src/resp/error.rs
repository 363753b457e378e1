//! RESP decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RespError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected type byte 0x{byte:02x} at byte {offset}")]
    UnexpectedType { byte: u8, offset: usize },
    #[error("missing crlf terminator at byte {0}")]
    MissingTerminator(usize),
    #[error("invalid number literal at byte {0}")]
    InvalidNumber(usize),
    #[error("invalid utf-8 at byte {0}")]
    InvalidUtf8(usize),
    #[error("recursion depth limit exceeded")]
    DepthExceeded,
}
