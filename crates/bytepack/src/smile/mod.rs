//! Smile (v1.0.6) encoder/decoder with shared-string dictionaries and
//! 7-bit-safe binary and float payloads.

mod constants;
mod decoder;
mod encoder;
mod error;
mod shared;
mod vint;

pub use constants::*;
pub use decoder::{SmileDecoder, SmileDecoderOptions};
pub use encoder::{SmileEncoder, SmileEncoderOptions};
pub use error::SmileError;
pub use shared::{SharedStringSet, MAX_SHARED_ENTRIES, MAX_SHAREABLE_BYTES};
pub use vint::{zigzag_decode, zigzag_encode};
