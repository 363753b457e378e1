//! Amazon Ion binary encoder/decoder.

mod decoder;
mod encoder;
mod error;
mod symbols;

pub use decoder::IonDecoder;
pub use encoder::IonEncoder;
pub use error::IonError;
pub use symbols::{IonSymbols, SID_IMPORTS, SID_ION_SYMBOL_TABLE, SID_MAX_ID, SID_SYMBOLS};

/// Ion 1.0 binary version marker.
pub const ION_BVM: [u8; 4] = [0xe0, 0x01, 0x00, 0xea];
