use bytepack::cbor::{
    CborDecoder, CborDecoderBase, CborEncoder, CborEncoderDag, CborEncoderFast, CborEncoderStable,
    CborError,
};
use bytepack::{PackValue, PathSegment, TypedArray};

fn obj(fields: &[(&str, PackValue)]) -> PackValue {
    PackValue::Object(
        fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    )
}

#[test]
fn integer_head_matrix() {
    let mut encoder = CborEncoderFast::new();
    assert_eq!(encoder.encode(&PackValue::Integer(0)), vec![0x00]);
    assert_eq!(encoder.encode(&PackValue::Integer(23)), vec![0x17]);
    assert_eq!(encoder.encode(&PackValue::Integer(24)), vec![0x18, 24]);
    assert_eq!(encoder.encode(&PackValue::Integer(255)), vec![0x18, 255]);
    assert_eq!(encoder.encode(&PackValue::Integer(256)), vec![0x19, 1, 0]);
    assert_eq!(encoder.encode(&PackValue::Integer(-1)), vec![0x20]);
    assert_eq!(encoder.encode(&PackValue::Integer(-24)), vec![0x37]);
    assert_eq!(encoder.encode(&PackValue::Integer(-25)), vec![0x38, 24]);
    assert_eq!(
        encoder.encode(&PackValue::UInteger(u64::MAX)),
        vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
}

#[test]
fn token_matrix() {
    let mut encoder = CborEncoderFast::new();
    assert_eq!(encoder.encode(&PackValue::Null), vec![0xf6]);
    assert_eq!(encoder.encode(&PackValue::Bool(false)), vec![0xf4]);
    assert_eq!(encoder.encode(&PackValue::Bool(true)), vec![0xf5]);
    let mut full = CborEncoder::new();
    assert_eq!(full.encode(&PackValue::Undefined), vec![0xf7]);
}

#[test]
fn wide_text_headers_follow_char_count_guess() {
    let mut encoder = CborEncoderFast::new();
    // Six 3-byte code points: 18 actual bytes, worst case 24, so the
    // one-byte-length header form is chosen.
    let bytes = encoder.encode(&PackValue::Str("€€€€€€".into()));
    assert_eq!(bytes[0], 0x78);
    assert_eq!(bytes[1], 18);
}

#[test]
fn roundtrip_matrix() {
    let mut encoder = CborEncoder::new();
    let values = vec![
        PackValue::Null,
        PackValue::Undefined,
        PackValue::Bool(true),
        PackValue::Integer(0),
        PackValue::Integer(-1),
        PackValue::Integer(i64::MIN),
        PackValue::UInteger(u64::MAX),
        PackValue::Float(1.5),
        PackValue::Float(0.1),
        PackValue::Str(String::new()),
        PackValue::Str("hello".into()),
        PackValue::Bytes(Vec::new()),
        PackValue::Bytes(vec![0xff, 0x00]),
        PackValue::Array(Vec::new()),
        PackValue::Object(Vec::new()),
        obj(&[("a", PackValue::Integer(1)), ("b", PackValue::Null)]),
        PackValue::Map(vec![(PackValue::Integer(1), PackValue::Bool(true))]),
        PackValue::extension(1234, PackValue::Str("tagged".into())),
        PackValue::BigInt(i128::from(u64::MAX) + 1),
        PackValue::BigInt(-(i128::from(u64::MAX) + 2)),
        PackValue::TypedArray(TypedArray::I16(vec![256, -1])),
        PackValue::TypedArray(TypedArray::F64(vec![1.25, -0.5])),
    ];
    for value in values {
        let bytes = encoder.encode(&value);
        let mut decoder = CborDecoderBase::new();
        assert_eq!(decoder.decode(&bytes).unwrap(), value, "for {value:?}");
    }
}

#[test]
fn typed_array_int16_le_uses_tag_77() {
    let mut encoder = CborEncoder::new();
    let bytes = encoder.encode(&PackValue::TypedArray(TypedArray::I16(vec![256, -1])));
    // Tag 77: 0xd8 0x4d, then a 4-byte string.
    assert_eq!(bytes, vec![0xd8, 77, 0x44, 0x00, 0x01, 0xff, 0xff]);
    let mut decoder = CborDecoderBase::new();
    assert_eq!(
        decoder.decode(&bytes).unwrap(),
        PackValue::TypedArray(TypedArray::I16(vec![256, -1]))
    );
}

#[test]
fn indefinite_array_decodes_to_definite_value() {
    let mut decoder = CborDecoderBase::new();
    let value = decoder.decode(&[0x9f, 0x01, 0x02, 0x03, 0xff]).unwrap();
    assert_eq!(
        value,
        PackValue::Array(vec![
            PackValue::Integer(1),
            PackValue::Integer(2),
            PackValue::Integer(3),
        ])
    );
}

#[test]
fn indefinite_string_concatenates_chunks() {
    let mut decoder = CborDecoderBase::new();
    // (_ "he" "llo")
    let bytes = [0x7f, 0x62, b'h', b'e', 0x63, b'l', b'l', b'o', 0xff];
    assert_eq!(
        decoder.decode(&bytes).unwrap(),
        PackValue::Str("hello".into())
    );
    // Zero chunks decode to the empty string / empty bytes.
    assert_eq!(
        decoder.decode(&[0x7f, 0xff]).unwrap(),
        PackValue::Str(String::new())
    );
    assert_eq!(
        decoder.decode(&[0x5f, 0xff]).unwrap(),
        PackValue::Bytes(Vec::new())
    );
    assert_eq!(
        decoder.decode(&[0xbf, 0xff]).unwrap(),
        PackValue::Object(Vec::new())
    );
}

#[test]
fn streaming_writer_emits_indefinite_containers() {
    let mut encoder = CborEncoderFast::new();
    encoder.write_start_arr();
    encoder.write_any(&PackValue::Integer(1));
    encoder.write_any(&PackValue::Integer(2));
    encoder.write_end();
    let bytes = encoder.writer.flush();
    assert_eq!(bytes, vec![0x9f, 0x01, 0x02, 0xff]);
}

#[test]
fn half_float_decodes() {
    let mut decoder = CborDecoderBase::new();
    // 1.0 as binary16.
    assert_eq!(
        decoder.decode(&[0xf9, 0x3c, 0x00]).unwrap(),
        PackValue::Float(1.0)
    );
    // -2.5
    assert_eq!(
        decoder.decode(&[0xf9, 0xc1, 0x00]).unwrap(),
        PackValue::Float(-2.5)
    );
    // +inf
    assert_eq!(
        decoder.decode(&[0xf9, 0x7c, 0x00]).unwrap(),
        PackValue::Float(f64::INFINITY)
    );
}

#[test]
fn bare_break_is_an_error() {
    let mut decoder = CborDecoderBase::new();
    assert_eq!(decoder.decode(&[0xff]), Err(CborError::UnexpectedBreak(0)));
}

#[test]
fn truncations_report_unexpected_end() {
    let mut decoder = CborDecoderBase::new();
    for bytes in [
        &[0x18u8][..],
        &[0x62, b'h'][..],
        &[0x82, 0x01][..],
        &[0x9f, 0x01][..],
    ] {
        assert!(
            matches!(decoder.decode(bytes), Err(CborError::UnexpectedEnd(_))),
            "for {bytes:?}"
        );
    }
}

#[test]
fn stable_encoder_is_permutation_invariant() {
    let mut encoder = CborEncoderStable::new();
    let a = obj(&[("b", PackValue::Integer(1)), ("a", PackValue::Integer(2))]);
    let b = obj(&[("a", PackValue::Integer(2)), ("b", PackValue::Integer(1))]);
    let bytes_a = encoder.encode(&a);
    let bytes_b = encoder.encode(&b);
    assert_eq!(bytes_a, bytes_b);
    // Keys sorted: a then b.
    assert_eq!(bytes_a, vec![0xa2, 0x61, b'a', 0x02, 0x61, b'b', 0x01]);
    // Encoding twice is byte-identical.
    assert_eq!(encoder.encode(&a), bytes_a);
}

#[test]
fn dag_profile_restrictions() {
    let mut encoder = CborEncoderDag::new();
    assert!(encoder.encode(&PackValue::Float(f64::NAN)).is_err());
    assert!(encoder.encode(&PackValue::Float(f64::INFINITY)).is_err());
    assert!(encoder
        .encode(&PackValue::extension(7, PackValue::Null))
        .is_err());
    // Negative zero folds to positive zero, always 64-bit.
    let bytes = encoder.encode(&PackValue::Float(-0.0)).unwrap();
    assert_eq!(bytes, 0.0f64.to_be_bytes().iter().fold(vec![0xfb], |mut v, &b| {
        v.push(b);
        v
    }));
    // Keys order by length first.
    let bytes = encoder
        .encode(&obj(&[
            ("bb", PackValue::Integer(1)),
            ("a", PackValue::Integer(2)),
        ]))
        .unwrap();
    assert_eq!(&bytes[1..4], &[0x61, b'a', 0x02]);
    // Tag 42 is allowed.
    assert!(encoder
        .encode(&PackValue::extension(42, PackValue::Bytes(vec![0, 1])))
        .is_ok());
}

#[test]
fn validate_checks_exact_span() {
    let mut encoder = CborEncoderFast::new();
    let bytes = encoder.encode(&obj(&[("k", PackValue::Array(vec![PackValue::Integer(1)]))]));
    let mut decoder = CborDecoder::new();
    decoder.validate(&bytes, 0, bytes.len()).unwrap();
    assert_eq!(
        decoder.validate(&bytes, 0, bytes.len() + 1),
        Err(CborError::InvalidSize)
    );
}

#[test]
fn path_navigation() {
    let mut encoder = CborEncoderFast::new();
    let doc = obj(&[(
        "a",
        obj(&[(
            "b",
            PackValue::Array(vec![
                PackValue::Integer(10),
                PackValue::Integer(20),
                PackValue::Integer(30),
            ]),
        )]),
    )]);
    let bytes = encoder.encode(&doc);
    let mut decoder = CborDecoder::new();

    let raw = decoder
        .read_raw_at(
            &bytes,
            &[
                PathSegment::Key("a"),
                PathSegment::Key("b"),
                PathSegment::Index(1),
            ],
        )
        .unwrap();
    assert_eq!(raw.bytes, vec![0x14]);

    let value = decoder
        .read_at(&bytes, &[PathSegment::Key("a"), PathSegment::Key("b")])
        .unwrap();
    assert_eq!(
        value,
        PackValue::Array(vec![
            PackValue::Integer(10),
            PackValue::Integer(20),
            PackValue::Integer(30),
        ])
    );
}

#[test]
fn path_navigation_over_indefinite_containers() {
    // {_ "x": [_ 1, 2]}
    let bytes = [
        0xbf, 0x61, b'x', 0x9f, 0x01, 0x02, 0xff, 0xff,
    ];
    let mut decoder = CborDecoder::new();
    let value = decoder
        .read_at(&bytes, &[PathSegment::Key("x"), PathSegment::Index(1)])
        .unwrap();
    assert_eq!(value, PackValue::Integer(2));
    assert_eq!(
        decoder
            .read_at(&bytes, &[PathSegment::Key("x"), PathSegment::Index(2)])
            .unwrap_err(),
        CborError::IndexOutOfBounds
    );
}

#[test]
fn read_level_blobs_nested_containers() {
    let mut encoder = CborEncoderFast::new();
    let bytes = encoder.encode(&obj(&[
        ("n", PackValue::Integer(7)),
        ("inner", PackValue::Array(vec![PackValue::Integer(1)])),
    ]));
    let mut decoder = CborDecoder::new();
    let level = decoder.read_level(&bytes).unwrap();
    let PackValue::Object(fields) = level else {
        panic!("expected object");
    };
    assert_eq!(fields[0].1, PackValue::Integer(7));
    assert!(matches!(&fields[1].1, PackValue::Blob(raw) if raw.bytes == vec![0x81, 0x01]));
}

#[test]
fn date_tag_helpers() {
    let mut encoder = CborEncoder::new();
    encoder.write_date_epoch_days(19_000);
    let bytes = encoder.inner.writer.flush();
    // Tag 100 = 0xd8 0x64, then uint 19000.
    assert_eq!(&bytes[..2], &[0xd8, 100]);
    let mut decoder = CborDecoderBase::new();
    let value = decoder.decode(&bytes).unwrap();
    assert_eq!(value, PackValue::extension(100, PackValue::Integer(19_000)));

    encoder.write_date_string("2023-03-15");
    let bytes = encoder.inner.writer.flush();
    assert_eq!(&bytes[..3], &[0xd9, 0x03, 0xec]);
}

#[test]
fn depth_limit_guards_recursion() {
    let mut bytes = vec![0x81u8; 2000];
    bytes.push(0x00);
    let mut decoder = CborDecoderBase::new();
    assert_eq!(decoder.decode(&bytes), Err(CborError::DepthExceeded));
}
