//! Smile encode/decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SmileError {
    #[error("invalid smile header")]
    InvalidHeader,
    #[error("unsupported smile version {0}")]
    UnsupportedVersion(u8),
    #[error("invalid token 0x{token:02x} at byte {offset}")]
    InvalidToken { token: u8, offset: usize },
    #[error("shared string reference {0} outside live table")]
    InvalidReference(usize),
    #[error("variable-length integer missing terminator")]
    MalformedVInt,
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("invalid utf-8 in string at byte {0}")]
    InvalidUtf8(usize),
    #[error("recursion depth limit exceeded")]
    DepthExceeded,
}
