//! Tolerant JSON decoder/encoder family with binary round-trip support.

mod decoder;
mod decoder_partial;
mod encoder;
mod encoder_stable;
mod error;
mod util;

pub use decoder::{JsonDecoder, JsonDecoderOptions};
pub use decoder_partial::JsonDecoderPartial;
pub use encoder::JsonEncoder;
pub use encoder_stable::JsonEncoderStable;
pub use error::JsonError;
