//! BSON (MongoDB 1.1) encoder/decoder.

mod decoder;
mod encoder;
mod error;
mod values;

pub use decoder::BsonDecoder;
pub use encoder::BsonEncoder;
pub use error::BsonError;
pub use values::{BsonBinary, BsonObjectId, BsonValue};
