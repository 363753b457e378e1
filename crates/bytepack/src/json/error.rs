//! JSON decode errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("invalid json at byte {0}")]
    InvalidJson(usize),
    #[error("invalid utf-8 at byte {0}")]
    InvalidUtf8(usize),
    #[error("forbidden object key \"__proto__\"")]
    ProtoKeyForbidden,
    #[error("recursion depth limit exceeded")]
    DepthExceeded,
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
}

impl From<serde_json::Error> for JsonError {
    fn from(_: serde_json::Error) -> Self {
        JsonError::InvalidJson(0)
    }
}
