//! Byte-level I/O substrate shared by every bytepack codec.
//!
//! [`Writer`] is a growable output buffer with an explicit cursor, designed
//! for single-pass encoders that occasionally need to patch a length field
//! after the fact. [`Reader`] is a cursor over a borrowed byte slice with
//! bounds-checked accessors.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors surfaced by the buffer primitives.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read would cross the end of the underlying slice.
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    /// String bytes failed UTF-8 validation.
    #[error("invalid utf-8 sequence")]
    InvalidUtf8,
}
