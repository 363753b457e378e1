//! Bencode decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BencodeError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected byte 0x{byte:02x} at byte {offset}")]
    UnexpectedByte { byte: u8, offset: usize },
    #[error("invalid integer literal at byte {0}")]
    InvalidInteger(usize),
    #[error("invalid utf-8 in dictionary key at byte {0}")]
    InvalidUtf8(usize),
    #[error("recursion depth limit exceeded")]
    DepthExceeded,
}
