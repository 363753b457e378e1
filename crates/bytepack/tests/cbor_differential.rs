//! Differential checks of the CBOR codec against ciborium.
//!
//! Decode side: ciborium-produced buffers must decode to the expected value
//! model. Encode side: stable-encoder output must be readable by ciborium
//! and mean the same thing.

use bytepack::cbor::{CborDecoderBase, CborEncoderStable};
use bytepack::PackValue;
use ciborium::value::Value as CiboriumValue;

fn ciborium_bytes(value: &CiboriumValue) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).expect("ciborium encode");
    out
}

#[test]
fn decodes_ciborium_scalars() {
    let cases: Vec<(CiboriumValue, PackValue)> = vec![
        (CiboriumValue::Null, PackValue::Null),
        (CiboriumValue::Bool(true), PackValue::Bool(true)),
        (CiboriumValue::Integer(0.into()), PackValue::Integer(0)),
        (CiboriumValue::Integer(23.into()), PackValue::Integer(23)),
        (CiboriumValue::Integer(500.into()), PackValue::Integer(500)),
        (
            CiboriumValue::Integer((-1_000_000).into()),
            PackValue::Integer(-1_000_000),
        ),
        (
            CiboriumValue::Integer(i64::MAX.into()),
            PackValue::Integer(i64::MAX),
        ),
        (CiboriumValue::Float(1.5), PackValue::Float(1.5)),
        (CiboriumValue::Float(0.1), PackValue::Float(0.1)),
        (
            CiboriumValue::Text("hello".to_owned()),
            PackValue::Str("hello".into()),
        ),
        (
            CiboriumValue::Bytes(vec![1, 2, 3]),
            PackValue::Bytes(vec![1, 2, 3]),
        ),
    ];
    for (input, expected) in cases {
        let bytes = ciborium_bytes(&input);
        let mut decoder = CborDecoderBase::new();
        assert_eq!(decoder.decode(&bytes).unwrap(), expected, "for {input:?}");
    }
}

#[test]
fn decodes_ciborium_containers() {
    let mut decoder = CborDecoderBase::new();
    let input = CiboriumValue::Map(vec![
        (
            CiboriumValue::Text("list".to_owned()),
            CiboriumValue::Array(vec![
                CiboriumValue::Integer(1.into()),
                CiboriumValue::Text("two".to_owned()),
                CiboriumValue::Null,
            ]),
        ),
        (
            CiboriumValue::Text("flag".to_owned()),
            CiboriumValue::Bool(false),
        ),
    ]);
    let bytes = ciborium_bytes(&input);
    let expected = PackValue::Object(vec![
        (
            "list".to_owned(),
            PackValue::Array(vec![
                PackValue::Integer(1),
                PackValue::Str("two".into()),
                PackValue::Null,
            ]),
        ),
        ("flag".to_owned(), PackValue::Bool(false)),
    ]);
    assert_eq!(decoder.decode(&bytes).unwrap(), expected);
}

#[test]
fn decodes_ciborium_tags() {
    let mut decoder = CborDecoderBase::new();
    let input = CiboriumValue::Tag(1234, Box::new(CiboriumValue::Text("payload".to_owned())));
    let bytes = ciborium_bytes(&input);
    assert_eq!(
        decoder.decode(&bytes).unwrap(),
        PackValue::extension(1234, PackValue::Str("payload".into()))
    );
}

#[test]
fn stable_output_reads_back_through_ciborium() {
    let mut encoder = CborEncoderStable::new();
    let value = PackValue::Object(vec![
        ("zz".to_owned(), PackValue::Integer(-5)),
        ("a".to_owned(), PackValue::Str("text".into())),
        (
            "mid".to_owned(),
            PackValue::Array(vec![PackValue::Bool(true), PackValue::Bytes(vec![9])]),
        ),
    ]);
    let bytes = encoder.encode(&value);
    let read_back: CiboriumValue =
        ciborium::de::from_reader(bytes.as_slice()).expect("ciborium decode");
    let CiboriumValue::Map(entries) = read_back else {
        panic!("expected map");
    };
    // Keys arrive sorted.
    let keys: Vec<String> = entries
        .iter()
        .map(|(k, _)| match k {
            CiboriumValue::Text(s) => s.clone(),
            other => panic!("unexpected key {other:?}"),
        })
        .collect();
    assert_eq!(keys, ["a", "mid", "zz"]);
}
