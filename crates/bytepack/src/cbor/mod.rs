//! CBOR (RFC 8949) encoder/decoder family, with the typed-array tags of
//! RFC 8746 and the date tags of RFC 8943.

mod constants;
mod decoder;
mod decoder_base;
mod encoder;
mod encoder_dag;
mod encoder_fast;
mod encoder_stable;
mod error;

pub use constants::*;
pub use decoder::CborDecoder;
pub use decoder_base::CborDecoderBase;
pub use encoder::CborEncoder;
pub use encoder_dag::CborEncoderDag;
pub use encoder_fast::CborEncoderFast;
pub use encoder_stable::CborEncoderStable;
pub use error::CborError;
