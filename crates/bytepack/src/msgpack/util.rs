//! Convenience MessagePack entry points.

use super::{MsgPackDecoderFast, MsgPackEncoder, MsgPackEncoderFast, MsgPackError};
use crate::PackValue;

/// Encodes with the fast encoder.
pub fn encode(value: &PackValue) -> Vec<u8> {
    MsgPackEncoderFast::new().encode(value)
}

/// Encodes with the full encoder.
pub fn encode_full(value: &PackValue) -> Vec<u8> {
    MsgPackEncoder::new().encode(value)
}

/// Decodes one value from `blob`.
pub fn decode(blob: &[u8]) -> Result<PackValue, MsgPackError> {
    MsgPackDecoderFast::new().decode(blob)
}
