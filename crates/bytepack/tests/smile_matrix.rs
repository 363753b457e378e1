use bytepack::smile::{
    SmileDecoder, SmileDecoderOptions, SmileEncoder, SmileEncoderOptions, SmileError,
};
use bytepack::PackValue;

fn obj(fields: &[(&str, PackValue)]) -> PackValue {
    PackValue::Object(
        fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    )
}

fn roundtrip(value: &PackValue) -> PackValue {
    let mut encoder = SmileEncoder::new();
    let mut decoder = SmileDecoder::new();
    let bytes = encoder.encode(value);
    decoder.decode(&bytes).unwrap()
}

#[test]
fn null_document_bytes() {
    let mut encoder = SmileEncoder::new();
    assert_eq!(
        encoder.encode(&PackValue::Null),
        vec![0x3a, 0x29, 0x0a, 0x01, 0x21]
    );
}

#[test]
fn header_flags_reflect_options() {
    let mut encoder = SmileEncoder::with_options(SmileEncoderOptions {
        shared_property_names: true,
        shared_string_values: true,
        raw_binary: true,
    });
    let bytes = encoder.encode(&PackValue::Null);
    assert_eq!(bytes[3], 0x07);

    let mut encoder = SmileEncoder::with_options(SmileEncoderOptions {
        shared_property_names: false,
        shared_string_values: false,
        raw_binary: false,
    });
    let bytes = encoder.encode(&PackValue::Null);
    assert_eq!(bytes[3], 0x00);
}

#[test]
fn invalid_header_is_rejected() {
    let mut decoder = SmileDecoder::new();
    assert_eq!(
        decoder.decode(&[0x3a, 0x29, 0x0b, 0x00, 0x21]),
        Err(SmileError::InvalidHeader)
    );
    assert_eq!(
        decoder.decode(&[0x3a, 0x29, 0x0a, 0x10, 0x21]),
        Err(SmileError::UnsupportedVersion(1))
    );
}

#[test]
fn scalar_tokens() {
    let mut encoder = SmileEncoder::new();
    // Past the 4-byte header: true, false, empty string.
    assert_eq!(encoder.encode(&PackValue::Bool(true))[4], 0x23);
    assert_eq!(encoder.encode(&PackValue::Bool(false))[4], 0x22);
    assert_eq!(encoder.encode(&PackValue::Str(String::new()))[4], 0x20);
    // Small ints carry zigzag in the low 5 bits.
    assert_eq!(encoder.encode(&PackValue::Integer(0))[4], 0xc0);
    assert_eq!(encoder.encode(&PackValue::Integer(-1))[4], 0xc1);
    assert_eq!(encoder.encode(&PackValue::Integer(1))[4], 0xc2);
    assert_eq!(encoder.encode(&PackValue::Integer(15))[4], 0xde);
    assert_eq!(encoder.encode(&PackValue::Integer(-16))[4], 0xdf);
    // Outside the small range: int32 with zigzag vint.
    let bytes = encoder.encode(&PackValue::Integer(16));
    assert_eq!(&bytes[4..], &[0x24, 0x80 | 32]);
}

#[test]
fn integer_roundtrip_matrix() {
    for n in [
        0i64,
        1,
        -1,
        15,
        -16,
        16,
        -17,
        1000,
        -1000,
        i32::MAX as i64,
        i32::MIN as i64,
        i32::MAX as i64 + 1,
        i64::MAX,
        i64::MIN,
    ] {
        assert_eq!(
            roundtrip(&PackValue::Integer(n)),
            PackValue::Integer(n),
            "for {n}"
        );
    }
}

#[test]
fn big_integer_roundtrip() {
    let large = i128::from(u64::MAX) * 3;
    assert_eq!(roundtrip(&PackValue::BigInt(large)), PackValue::BigInt(large));
    assert_eq!(
        roundtrip(&PackValue::BigInt(-large)),
        PackValue::BigInt(-large)
    );
    assert_eq!(
        roundtrip(&PackValue::UInteger(u64::MAX)),
        PackValue::UInteger(u64::MAX)
    );
}

#[test]
fn float_septets_roundtrip() {
    for f in [0.0f64, 1.5, -1.5, 0.1, 1e300, -1e-300, f64::MAX] {
        assert_eq!(roundtrip(&PackValue::Float(f)), PackValue::Float(f), "for {f}");
    }
    // f32-exact values take the 5-septet form.
    let mut encoder = SmileEncoder::new();
    let bytes = encoder.encode(&PackValue::Float(1.5));
    assert_eq!(bytes[4], 0x28);
    assert_eq!(bytes.len(), 4 + 1 + 5);
    let bytes = encoder.encode(&PackValue::Float(0.1));
    assert_eq!(bytes[4], 0x29);
    assert_eq!(bytes.len(), 4 + 1 + 10);
}

#[test]
fn string_length_boundaries() {
    // Tiny/short ASCII boundaries: 1, 32, 33, 64, 65 bytes.
    for len in [1usize, 31, 32, 33, 63, 64, 65, 200] {
        let s: String = "a".repeat(len);
        assert_eq!(
            roundtrip(&PackValue::Str(s.clone())),
            PackValue::Str(s),
            "ascii len {len}"
        );
    }
    // Unicode boundaries in UTF-8 bytes: 2, 33, 34, 65, 66.
    for chars in [1usize, 16, 17, 32, 33, 40] {
        let s: String = "é".repeat(chars);
        assert_eq!(
            roundtrip(&PackValue::Str(s.clone())),
            PackValue::Str(s),
            "unicode chars {chars}"
        );
    }
}

#[test]
fn tiny_ascii_token_values() {
    let mut encoder = SmileEncoder::new();
    let bytes = encoder.encode(&PackValue::Str("a".into()));
    assert_eq!(&bytes[4..], &[0x40, b'a']);
    let bytes = encoder.encode(&PackValue::Str("ab".into()));
    assert_eq!(&bytes[4..], &[0x41, b'a', b'b']);
    let s33 = "a".repeat(33);
    let bytes = encoder.encode(&PackValue::Str(s33));
    assert_eq!(bytes[4], 0x60);
    let s65 = "a".repeat(65);
    let bytes = encoder.encode(&PackValue::Str(s65.clone()));
    assert_eq!(bytes[4], 0xe0);
    assert_eq!(*bytes.last().unwrap(), 0xfc);
}

#[test]
fn binary_7bit_roundtrip() {
    for len in [0usize, 1, 6, 7, 8, 13, 14, 100] {
        let data: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
        assert_eq!(
            roundtrip(&PackValue::Bytes(data.clone())),
            PackValue::Bytes(data),
            "len {len}"
        );
    }
    // Encoded payload must stay below 0x80 throughout.
    let mut encoder = SmileEncoder::new();
    let bytes = encoder.encode(&PackValue::Bytes(vec![0xff; 14]));
    assert_eq!(bytes[4], 0xe8);
    for &b in &bytes[6..] {
        assert!(b < 0x80, "byte 0x{b:02x} not 7-bit safe");
    }
}

#[test]
fn raw_binary_mode() {
    let mut encoder = SmileEncoder::with_options(SmileEncoderOptions {
        raw_binary: true,
        ..Default::default()
    });
    let data = vec![0xde, 0xad, 0xbe, 0xef];
    let bytes = encoder.encode(&PackValue::Bytes(data.clone()));
    assert_eq!(bytes[4], 0xfd);
    assert_eq!(&bytes[6..], &data[..]);
    let mut decoder = SmileDecoder::new();
    assert_eq!(decoder.decode(&bytes).unwrap(), PackValue::Bytes(data));
}

#[test]
fn shared_key_back_reference() {
    let mut encoder = SmileEncoder::new();
    let doc = PackValue::Array(vec![
        obj(&[("n", PackValue::Integer(1))]),
        obj(&[("n", PackValue::Integer(2))]),
    ]);
    let bytes = encoder.encode(&doc);
    // [ {, "n" literal, 1, }, {, shared-key #0, 2, }, ]
    assert_eq!(
        bytes[4..].to_vec(),
        vec![0xf8, 0xfa, 0x80, b'n', 0xc2, 0xfb, 0xfa, 0x40, 0xc4, 0xfb, 0xf9]
    );
    let mut decoder = SmileDecoder::new();
    assert_eq!(decoder.decode(&bytes).unwrap(), doc);
}

#[test]
fn shared_values_require_the_flag() {
    let repeated = PackValue::Array(vec![
        PackValue::Str("value".into()),
        PackValue::Str("value".into()),
    ]);
    let mut plain = SmileEncoder::new();
    let plain_bytes = plain.encode(&repeated);
    let mut sharing = SmileEncoder::with_options(SmileEncoderOptions {
        shared_string_values: true,
        ..Default::default()
    });
    let shared_bytes = sharing.encode(&repeated);
    assert!(shared_bytes.len() < plain_bytes.len());
    // Second occurrence is the one-byte reference to index 0.
    assert_eq!(shared_bytes[shared_bytes.len() - 2], 0x01);

    let mut decoder = SmileDecoder::new();
    assert_eq!(decoder.decode(&plain_bytes).unwrap(), repeated);
    assert_eq!(decoder.decode(&shared_bytes).unwrap(), repeated);
}

#[test]
fn shared_value_long_reference() {
    // Force > 31 distinct shared values, then repeat an early-but-not-first
    // one so the two-byte reference form is exercised.
    let mut values: Vec<PackValue> = (0..40)
        .map(|i| PackValue::Str(format!("value-{i:03}")))
        .collect();
    values.push(PackValue::Str("value-035".into()));
    let doc = PackValue::Array(values);
    let mut encoder = SmileEncoder::with_options(SmileEncoderOptions {
        shared_string_values: true,
        ..Default::default()
    });
    let bytes = encoder.encode(&doc);
    let mut decoder = SmileDecoder::new();
    assert_eq!(decoder.decode(&bytes).unwrap(), doc);
    // The tail holds the long reference to index 35: 0xec, 35, then ].
    assert_eq!(&bytes[bytes.len() - 3..], &[0xec, 35, 0xf9]);
}

#[test]
fn invalid_reference_is_detected() {
    // Header with shared values on, then a reference with an empty table.
    let bytes = [0x3a, 0x29, 0x0a, 0x03, 0x01];
    let mut decoder = SmileDecoder::new();
    assert_eq!(decoder.decode(&bytes), Err(SmileError::InvalidReference(0)));
}

#[test]
fn tables_reset_between_documents() {
    let doc = obj(&[("key", PackValue::Integer(1))]);
    let mut encoder = SmileEncoder::new();
    let first = encoder.encode(&doc);
    let second = encoder.encode(&doc);
    // Identical bytes: the table does not leak across encode calls.
    assert_eq!(first, second);
    let mut decoder = SmileDecoder::new();
    assert_eq!(decoder.decode(&first).unwrap(), doc);
    assert_eq!(decoder.decode(&second).unwrap(), doc);
}

#[test]
fn nested_structure_roundtrip() {
    let doc = obj(&[
        (
            "users",
            PackValue::Array(vec![
                obj(&[
                    ("name", PackValue::Str("ann".into())),
                    ("age", PackValue::Integer(30)),
                ]),
                obj(&[
                    ("name", PackValue::Str("bob".into())),
                    ("age", PackValue::Integer(31)),
                ]),
            ]),
        ),
        ("total", PackValue::Integer(2)),
        ("ratio", PackValue::Float(0.5)),
        ("blob", PackValue::Bytes(vec![1, 2, 3])),
        ("note", PackValue::Str("héllo wörld".into())),
        ("none", PackValue::Null),
    ]);
    assert_eq!(roundtrip(&doc), doc);
}

#[test]
fn empty_containers_roundtrip() {
    assert_eq!(
        roundtrip(&PackValue::Array(Vec::new())),
        PackValue::Array(Vec::new())
    );
    assert_eq!(
        roundtrip(&PackValue::Object(Vec::new())),
        PackValue::Object(Vec::new())
    );
    assert_eq!(
        roundtrip(&PackValue::Bytes(Vec::new())),
        PackValue::Bytes(Vec::new())
    );
}

#[test]
fn long_keys_roundtrip() {
    let long_ascii_key = "k".repeat(80);
    let long_unicode_key = "ké".repeat(40);
    let doc = obj(&[
        (long_ascii_key.as_str(), PackValue::Integer(1)),
        (long_unicode_key.as_str(), PackValue::Integer(2)),
        ("", PackValue::Integer(3)),
    ]);
    assert_eq!(roundtrip(&doc), doc);
}

#[test]
fn table_overflow_clears_and_restarts() {
    // More distinct keys than the decoder cap, spread across objects.
    let fields: Vec<(String, PackValue)> = (0..1500)
        .map(|i| (format!("key-{i:04}"), PackValue::Integer(i)))
        .collect();
    let doc = PackValue::Object(fields);
    let mut encoder = SmileEncoder::new();
    let bytes = encoder.encode(&doc);
    let mut decoder = SmileDecoder::with_options(SmileDecoderOptions::default());
    assert_eq!(decoder.decode(&bytes).unwrap(), doc);
}

#[test]
fn truncated_document_reports_end() {
    let mut encoder = SmileEncoder::new();
    let bytes = encoder.encode(&obj(&[("a", PackValue::Str("hello".into()))]));
    let mut decoder = SmileDecoder::new();
    for cut in 5..bytes.len() {
        let result = decoder.decode(&bytes[..cut]);
        assert!(result.is_err(), "cut at {cut} should fail");
    }
}
