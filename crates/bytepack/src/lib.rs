//! Binary and textual serialization codecs over a universal value model.
//!
//! Every codec translates between [`PackValue`] — the JSON data model
//! extended with byte strings, tagged extensions, big integers, maps with
//! non-string keys, pre-encoded fragments, and typed arrays — and one wire
//! format. All encoders emit through [`bytepack_buffers::Writer`]; all
//! decoders walk a borrowed slice through [`bytepack_buffers::Reader`].
//!
//! Core codecs: [`msgpack`], [`cbor`], [`smile`], [`json`] (with the
//! [`json_binary`] data-URI bridge). Boundary codecs sharing the same
//! substrate: [`ubjson`], [`bencode`], [`resp`], [`bson`], [`ion`].

mod constants;
mod extension;
mod pack_value;
mod path;
mod raw_value;
mod typed_array;

pub mod bencode;
pub mod bson;
pub mod cbor;
pub mod ion;
pub mod json;
pub mod json_binary;
pub mod msgpack;
pub mod resp;
pub mod smile;
pub mod ubjson;

pub use constants::{EncodingFormat, DEFAULT_MAX_DEPTH};
pub use extension::PackExtension;
pub use pack_value::PackValue;
pub use path::PathSegment;
pub use raw_value::RawValue;
pub use typed_array::TypedArray;
