use bytepack::json::{
    JsonDecoder, JsonDecoderOptions, JsonDecoderPartial, JsonEncoder, JsonEncoderStable, JsonError,
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

#[test]
fn encoder_primitives() {
    let mut enc = JsonEncoder::new();
    assert_eq!(enc.encode(&PackValue::Null), b"null");
    assert_eq!(enc.encode(&PackValue::Bool(true)), b"true");
    assert_eq!(enc.encode(&PackValue::Bool(false)), b"false");
    assert_eq!(enc.encode(&PackValue::Integer(42)), b"42");
    assert_eq!(enc.encode(&PackValue::Integer(-7)), b"-7");
    assert_eq!(enc.encode(&PackValue::Float(1.5)), b"1.5");
    assert_eq!(enc.encode(&PackValue::Str("hello".into())), b"\"hello\"");
}

#[test]
fn encoder_containers() {
    let mut enc = JsonEncoder::new();
    let arr = PackValue::Array(vec![PackValue::Integer(1), PackValue::Integer(2)]);
    assert_eq!(enc.encode(&arr), b"[1,2]");
    assert_eq!(
        enc.encode(&obj(&[("a", PackValue::Integer(1))])),
        b"{\"a\":1}"
    );
    assert_eq!(enc.encode(&PackValue::Object(Vec::new())), b"{}");
    assert_eq!(enc.encode(&PackValue::Array(Vec::new())), b"[]");
}

#[test]
fn encoder_escapes_strings() {
    let mut enc = JsonEncoder::new();
    assert_eq!(enc.encode(&PackValue::Str("a\nb".into())), b"\"a\\nb\"");
    assert_eq!(
        enc.encode(&PackValue::Str("quote\"back\\".into())),
        b"\"quote\\\"back\\\\\""
    );
}

#[test]
fn binary_becomes_data_uri() {
    let mut enc = JsonEncoder::new();
    let out = enc.encode(&PackValue::Bytes(vec![1, 2, 3]));
    let text = std::str::from_utf8(&out).unwrap();
    assert!(text.starts_with("\"data:application/octet-stream;base64,"));
    assert!(text.ends_with('"'));
}

#[test]
fn decoder_primitives() {
    let mut dec = JsonDecoder::new();
    assert_eq!(dec.decode(b"null").unwrap(), PackValue::Null);
    assert_eq!(dec.decode(b"true").unwrap(), PackValue::Bool(true));
    assert_eq!(dec.decode(b"false").unwrap(), PackValue::Bool(false));
    assert_eq!(dec.decode(b"42").unwrap(), PackValue::Integer(42));
    assert_eq!(dec.decode(b"-7").unwrap(), PackValue::Integer(-7));
    assert_eq!(dec.decode(b"1.5").unwrap(), PackValue::Float(1.5));
    assert_eq!(
        dec.decode(b"\"hello\"").unwrap(),
        PackValue::Str("hello".into())
    );
    assert_eq!(dec.decode(b"  [1 , 2]  ").unwrap(),
        PackValue::Array(vec![PackValue::Integer(1), PackValue::Integer(2)]));
}

#[test]
fn decoder_scientific_notation() {
    let mut dec = JsonDecoder::new();
    assert_eq!(dec.decode(b"1.5e+10").unwrap(), PackValue::Float(1.5e10));
    assert_eq!(dec.decode(b"1E-3").unwrap(), PackValue::Float(1e-3));
    assert_eq!(dec.decode(b"2e2").unwrap(), PackValue::Float(200.0));
    assert_eq!(dec.decode(b"-1.25e-1").unwrap(), PackValue::Float(-0.125));
}

#[test]
fn decoder_integer_widening() {
    let mut dec = JsonDecoder::new();
    assert_eq!(
        dec.decode(b"9223372036854775807").unwrap(),
        PackValue::Integer(i64::MAX)
    );
    assert_eq!(
        dec.decode(b"18446744073709551615").unwrap(),
        PackValue::UInteger(u64::MAX)
    );
    assert_eq!(
        dec.decode(b"36893488147419103232").unwrap(),
        PackValue::BigInt(1i128 << 65)
    );
}

#[test]
fn binary_roundtrip_via_data_uri() {
    let mut enc = JsonEncoder::new();
    let mut dec = JsonDecoder::new();
    let original = PackValue::Bytes(vec![0u8, 1, 2, 253, 254, 255]);
    let text = enc.encode(&original);
    assert_eq!(dec.decode(&text).unwrap(), original);
}

#[test]
fn undefined_sentinel_roundtrip() {
    let mut enc = JsonEncoder::new();
    let mut dec = JsonDecoder::new();
    let text = enc.encode(&PackValue::Undefined);
    assert_eq!(dec.decode(&text).unwrap(), PackValue::Undefined);
    let doc = obj(&[
        ("u", PackValue::Undefined),
        ("n", PackValue::Integer(1)),
    ]);
    let text = enc.encode(&doc);
    assert_eq!(dec.decode(&text).unwrap(), doc);
}

#[test]
fn custom_binary_prefix() {
    let mut dec = JsonDecoder::with_options(JsonDecoderOptions {
        binary_prefix: Some("bin:".to_owned()),
        ..Default::default()
    });
    assert_eq!(
        dec.decode(b"\"bin:AQID\"").unwrap(),
        PackValue::Bytes(vec![1, 2, 3])
    );
    // The default prefix is now ordinary text.
    let mut dec = JsonDecoder::with_options(JsonDecoderOptions {
        binary_prefix: None,
        ..Default::default()
    });
    let text = b"\"data:application/octet-stream;base64,AQID\"";
    assert!(matches!(dec.decode(text).unwrap(), PackValue::Str(_)));
}

#[test]
fn proto_key_handling() {
    let mut dec = JsonDecoder::new();
    assert_eq!(
        dec.decode(b"{\"__proto__\":1}"),
        Err(JsonError::ProtoKeyForbidden)
    );
    let mut relaxed = JsonDecoder::with_options(JsonDecoderOptions {
        allow_proto_key: true,
        ..Default::default()
    });
    assert!(relaxed.decode(b"{\"__proto__\":1}").is_ok());
}

#[test]
fn strict_decoder_rejects_malformed_input() {
    let mut dec = JsonDecoder::new();
    for bad in [
        &b"{\"a\":1,"[..],
        &b"[1, 2,"[..],
        &b"[1 2]"[..],
        &b"tru"[..],
        &b"{\"a\" 1}"[..],
        &b"\"unterminated"[..],
        &b""[..],
    ] {
        assert!(dec.decode(bad).is_err(), "should reject {bad:?}");
    }
}

#[test]
fn partial_decoder_recovers_arrays() {
    let mut dec = JsonDecoderPartial::new();
    assert_eq!(
        dec.decode(b"[1, 2, 3").unwrap(),
        PackValue::Array(vec![
            PackValue::Integer(1),
            PackValue::Integer(2),
            PackValue::Integer(3),
        ])
    );
    assert_eq!(
        dec.decode(b"[1, 2, ").unwrap(),
        PackValue::Array(vec![PackValue::Integer(1), PackValue::Integer(2)])
    );
    assert_eq!(
        dec.decode(b"[1, 2, x").unwrap(),
        PackValue::Array(vec![PackValue::Integer(1), PackValue::Integer(2)])
    );
    assert_eq!(
        dec.decode(b"[1,, 2]").unwrap(),
        PackValue::Array(vec![PackValue::Integer(1), PackValue::Integer(2)])
    );
}

#[test]
fn partial_decoder_recovers_objects() {
    let mut dec = JsonDecoderPartial::new();
    assert_eq!(
        dec.decode(b"{\"a\":1,\"b\":").unwrap(),
        obj(&[("a", PackValue::Integer(1))])
    );
    assert_eq!(
        dec.decode(b"{\"a\":1,\"b\":2").unwrap(),
        obj(&[("a", PackValue::Integer(1)), ("b", PackValue::Integer(2))])
    );
    // Nested partial containers surface attached to the parent.
    assert_eq!(
        dec.decode(b"{\"a\": [1, 2").unwrap(),
        obj(&[(
            "a",
            PackValue::Array(vec![PackValue::Integer(1), PackValue::Integer(2)])
        )])
    );
}

#[test]
fn partial_decoder_still_fails_on_garbage() {
    let mut dec = JsonDecoderPartial::new();
    assert!(dec.decode(b"nonsense").is_err());
    assert!(dec.decode(b"").is_err());
}

#[test]
fn stable_encoder_sorts_keys() {
    let mut enc = JsonEncoderStable::new();
    let a = obj(&[
        ("b", PackValue::Integer(1)),
        ("a", PackValue::Integer(2)),
        ("c", PackValue::Integer(3)),
    ]);
    let b = obj(&[
        ("c", PackValue::Integer(3)),
        ("a", PackValue::Integer(2)),
        ("b", PackValue::Integer(1)),
    ]);
    let out_a = enc.encode(&a);
    let out_b = enc.encode(&b);
    assert_eq!(out_a, out_b);
    assert_eq!(out_a, b"{\"a\":2,\"b\":1,\"c\":3}");
}

#[test]
fn depth_limit_guards_recursion() {
    let text = vec![b'['; 2000];
    let mut dec = JsonDecoder::new();
    assert_eq!(dec.decode(&text), Err(JsonError::DepthExceeded));
}
