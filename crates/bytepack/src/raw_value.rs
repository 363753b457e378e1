//! [`RawValue`] — an already-encoded fragment.

/// A pre-encoded value span.
///
/// Encoders copy the bytes verbatim; decoders produce one when asked to
/// capture a value without materializing it (shallow reads, `read_raw_at`).
/// The bytes are meaningful only in the wire format that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub bytes: Vec<u8>,
}

impl RawValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}
