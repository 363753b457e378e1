//! Base64 decoders.

use crate::constants::{PAD, REVERSE, REVERSE_URL};
use crate::Base64Error;

fn decode_with(view: &[u8], table: &[u8; 256]) -> Result<Vec<u8>, Base64Error> {
    // Strip trailing padding.
    let mut length = view.len();
    while length > 0 && view[length - 1] == PAD {
        length -= 1;
    }
    if length % 4 == 1 {
        return Err(Base64Error::InvalidLength);
    }
    let mut out = Vec::with_capacity(length * 3 / 4);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in &view[..length] {
        let sextet = table[byte as usize];
        if sextet == 0xff {
            return Err(Base64Error::InvalidCharacter);
        }
        acc = (acc << 6) | sextet as u32;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    Ok(out)
}

/// Decodes a standard base64 string (padding optional).
pub fn from_base64(encoded: &str) -> Result<Vec<u8>, Base64Error> {
    decode_with(encoded.as_bytes(), &REVERSE)
}

/// Decodes a URL-safe base64 string.
pub fn from_base64_url(encoded: &str) -> Result<Vec<u8>, Base64Error> {
    decode_with(encoded.as_bytes(), &REVERSE_URL)
}

/// Decodes `length` base64 bytes starting at `offset` inside `view`.
///
/// Lets scanners decode a span in place without slicing a `&str` first.
pub fn from_base64_bin(view: &[u8], offset: usize, length: usize) -> Result<Vec<u8>, Base64Error> {
    let end = offset
        .checked_add(length)
        .filter(|&e| e <= view.len())
        .ok_or(Base64Error::InvalidLength)?;
    decode_with(&view[offset..end], &REVERSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_base64;

    #[test]
    fn decodes_rfc4648_vectors() {
        assert_eq!(from_base64("").unwrap(), b"");
        assert_eq!(from_base64("Zg==").unwrap(), b"f");
        assert_eq!(from_base64("Zm8=").unwrap(), b"fo");
        assert_eq!(from_base64("Zm9v").unwrap(), b"foo");
        assert_eq!(from_base64("Zm9vYmFy").unwrap(), b"foobar");
    }

    #[test]
    fn decodes_without_padding() {
        assert_eq!(from_base64("Zg").unwrap(), b"f");
        assert_eq!(from_base64("Zm8").unwrap(), b"fo");
    }

    #[test]
    fn rejects_invalid_characters() {
        assert_eq!(from_base64("Z!=="), Err(Base64Error::InvalidCharacter));
        assert_eq!(from_base64("Z"), Err(Base64Error::InvalidLength));
    }

    #[test]
    fn url_alphabet() {
        assert_eq!(from_base64_url("--8").unwrap(), [0xfb, 0xef]);
    }

    #[test]
    fn offset_decoding() {
        let doc = b"xx aGVsbG8= yy";
        assert_eq!(from_base64_bin(doc, 3, 8).unwrap(), b"hello");
        assert!(from_base64_bin(doc, 12, 10).is_err());
    }

    #[test]
    fn roundtrips_binary() {
        let data: Vec<u8> = (0u16..=255).map(|b| b as u8).collect();
        assert_eq!(from_base64(&to_base64(&data)).unwrap(), data);
    }
}
