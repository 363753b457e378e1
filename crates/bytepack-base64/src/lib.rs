//! Base64 encoding and decoding.
//!
//! Supports the standard alphabet with padding and the URL-safe alphabet
//! without padding. The decoder offers an offset/length entry point so JSON
//! scanners can decode a base64 span straight out of a larger buffer.
//!
//! # Example
//!
//! ```
//! use bytepack_base64::{from_base64, to_base64};
//!
//! let encoded = to_base64(b"hello world");
//! assert_eq!(encoded, "aGVsbG8gd29ybGQ=");
//! assert_eq!(from_base64(&encoded).unwrap(), b"hello world");
//! ```

mod constants;
mod decode;
mod encode;

pub use constants::{ALPHABET, ALPHABET_URL, PAD};
pub use decode::{from_base64, from_base64_bin, from_base64_url};
pub use encode::{to_base64, to_base64_url};

use thiserror::Error;

/// Errors surfaced by base64 decoding.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Base64Error {
    /// The input contains a byte outside the active alphabet.
    #[error("invalid base64 character")]
    InvalidCharacter,
    /// The input length is not a valid base64 quantum.
    #[error("invalid base64 length")]
    InvalidLength,
}
