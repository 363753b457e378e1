//! UBJSON decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UbjsonError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected marker 0x{marker:02x} at byte {offset}")]
    UnexpectedMarker { marker: u8, offset: usize },
    #[error("invalid utf-8 in string at byte {0}")]
    InvalidUtf8(usize),
    #[error("negative or non-integer length")]
    InvalidLength,
    #[error("recursion depth limit exceeded")]
    DepthExceeded,
    #[error("forbidden object key \"__proto__\"")]
    ProtoKeyForbidden,
}
