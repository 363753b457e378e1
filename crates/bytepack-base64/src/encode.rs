//! Table-driven base64 encoders.

use crate::constants::{ALPHABET, ALPHABET_URL, PAD};

fn encode_with(uint8: &[u8], alphabet: &[u8; 64], pad: bool) -> String {
    let len = uint8.len();
    let mut out = Vec::with_capacity(len.div_ceil(3) * 4);
    let main = len - len % 3;
    let mut i = 0;
    while i < main {
        let word = ((uint8[i] as u32) << 16) | ((uint8[i + 1] as u32) << 8) | uint8[i + 2] as u32;
        out.push(alphabet[(word >> 18) as usize & 0x3f]);
        out.push(alphabet[(word >> 12) as usize & 0x3f]);
        out.push(alphabet[(word >> 6) as usize & 0x3f]);
        out.push(alphabet[word as usize & 0x3f]);
        i += 3;
    }
    match len - main {
        1 => {
            let word = (uint8[main] as u32) << 4;
            out.push(alphabet[(word >> 6) as usize & 0x3f]);
            out.push(alphabet[word as usize & 0x3f]);
            if pad {
                out.push(PAD);
                out.push(PAD);
            }
        }
        2 => {
            let word = ((uint8[main] as u32) << 10) | ((uint8[main + 1] as u32) << 2);
            out.push(alphabet[(word >> 12) as usize & 0x3f]);
            out.push(alphabet[(word >> 6) as usize & 0x3f]);
            out.push(alphabet[word as usize & 0x3f]);
            if pad {
                out.push(PAD);
            }
        }
        _ => {}
    }
    // The output contains only alphabet and pad bytes, all ASCII.
    String::from_utf8(out).expect("base64 output is ascii")
}

/// Encodes bytes with the standard alphabet and padding.
pub fn to_base64(uint8: &[u8]) -> String {
    encode_with(uint8, ALPHABET, true)
}

/// Encodes bytes with the URL-safe alphabet, without padding.
pub fn to_base64_url(uint8: &[u8]) -> String {
    encode_with(uint8, ALPHABET_URL, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_rfc4648_vectors() {
        assert_eq!(to_base64(b""), "");
        assert_eq!(to_base64(b"f"), "Zg==");
        assert_eq!(to_base64(b"fo"), "Zm8=");
        assert_eq!(to_base64(b"foo"), "Zm9v");
        assert_eq!(to_base64(b"foob"), "Zm9vYg==");
        assert_eq!(to_base64(b"fooba"), "Zm9vYmE=");
        assert_eq!(to_base64(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn url_variant_drops_padding() {
        assert_eq!(to_base64_url(b"f"), "Zg");
        assert_eq!(to_base64_url(&[0xfb, 0xef]), "--8");
    }
}
