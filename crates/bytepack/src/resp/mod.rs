//! RESP (REdis Serialization Protocol) v2/v3 encoder/decoder.

mod decoder;
mod encoder;
mod error;

pub use decoder::RespDecoder;
pub use encoder::RespEncoder;
pub use error::RespError;
