//! CBOR wire constants.

pub const MAJOR_UINT: u8 = 0;
pub const MAJOR_NINT: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_STR: u8 = 3;
pub const MAJOR_ARR: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;
pub const MAJOR_TOKEN: u8 = 7;

pub const TOKEN_FALSE: u8 = 0xf4;
pub const TOKEN_TRUE: u8 = 0xf5;
pub const TOKEN_NULL: u8 = 0xf6;
pub const TOKEN_UNDEFINED: u8 = 0xf7;
pub const TOKEN_F16: u8 = 0xf9;
pub const TOKEN_F32: u8 = 0xfa;
pub const TOKEN_F64: u8 = 0xfb;
pub const TOKEN_BREAK: u8 = 0xff;

/// Minor signalling an indefinite-length container or string.
pub const MINOR_INDEFINITE: u8 = 31;

/// Bignum tags (RFC 8949 §3.4.3).
pub const TAG_POS_BIGNUM: u64 = 2;
pub const TAG_NEG_BIGNUM: u64 = 3;

/// Multi-dimensional, row-major array (RFC 8746 §3.1).
pub const TAG_MULTI_DIM: u64 = 40;
/// Homogeneous array (RFC 8746 §3.2).
pub const TAG_HOMOGENEOUS: u64 = 41;
/// Multi-dimensional, column-major array (RFC 8746 §3.1.2).
pub const TAG_MULTI_DIM_COLUMN: u64 = 1040;
/// Content-addressed identifier, the one tag DAG-CBOR admits.
pub const TAG_CID: u64 = 42;
/// Days since the epoch (RFC 8943).
pub const TAG_DATE_DAYS: u64 = 100;
/// RFC 3339 full-date string (RFC 8943).
pub const TAG_DATE_STRING: u64 = 1004;

pub fn is_f32_exact(value: f64) -> bool {
    (value as f32) as f64 == value
}
