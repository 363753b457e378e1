//! MessagePack encoder/decoder family.

mod constants;
mod decoder;
mod decoder_fast;
mod encoder;
mod encoder_fast;
mod encoder_stable;
mod error;
mod util;

pub use constants::*;
pub use decoder::MsgPackDecoder;
pub use decoder_fast::MsgPackDecoderFast;
pub use encoder::MsgPackEncoder;
pub use encoder_fast::MsgPackEncoderFast;
pub use encoder_stable::MsgPackEncoderStable;
pub use error::MsgPackError;
pub use util::{decode, encode, encode_full};
