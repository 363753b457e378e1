//! Embedding binary data in JSON via data-URI strings.

mod codec;

pub use codec::{parse, stringify, stringify_binary, unwrap_binary, wrap_binary};

/// Prefix marking a string as base64-wrapped binary.
pub const BIN_URI_START: &str = "data:application/octet-stream;base64,";

/// Prefix marking a string as a base64-wrapped pre-encoded value.
pub const MSGPACK_URI_START: &str = "data:application/msgpack;base64,";

/// Prefix marking a string as a base64-wrapped extension: `ext=<tag>,<b64>`.
pub const MSGPACK_EXT_START: &str = "data:application/msgpack;base64;ext=";

/// Sentinel string content representing the undefined value: a CBOR data URI
/// whose payload is the single undefined byte (0xf7).
pub const UNDEF_URI: &str = "data:application/cbor,base64;9w==";
