//! Schema compilation: accepted forms, name resolution, and rejected schemas

mod common;

use common::*;
use schema_codec::{compile, Codec, NameRule, Schema, SchemaError, SchemaKind, Value};

#[test]
fn test_primitive_schema_forms() {
    for form in ["int", r#""int""#, r#"{"type":"int"}"#, r#" {"type":{"type":"int"}} "#] {
        let codec = compile(form).unwrap_or_else(|e| panic!("{}: {}", form, e));
        assert_eq!(codec.type_name(), "int", "{}", form);
        assert_eq!(binary(form, &Value::Int(3)), b"\x06");
    }
    assert!(matches!(compile("integer"), Err(SchemaError::Json(_))));
}

#[test]
fn test_codec_accessors() {
    let text = r#"{"type":"record","name":"Point","namespace":"geo","fields":[{"name":"x","type":"double"},{"name":"y","type":"double","default":0.0}]}"#;
    let codec = Codec::new(text).unwrap();

    assert_eq!(codec.schema(), text);
    assert_eq!(codec.to_string(), text);
    assert_eq!(codec.type_name(), "geo.Point");
    assert_eq!(codec.root().kind(), SchemaKind::Record);

    let Schema::Record { fields, .. } = codec.root() else {
        panic!("Expected record root, got {:?}", codec.root());
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].default, None);
    assert_eq!(fields[1].default, Some(Value::Double(0.0)));
    assert_eq!(codec.node(fields[1].schema), &Schema::Double);

    assert_eq!(compile(r#"["null","int"]"#).unwrap().type_name(), "union");
    assert_eq!(compile(r#"{"type":"map","values":"int"}"#).unwrap().type_name(), "map");
}

#[test]
fn test_named_reference_resolution() {
    let schema = r#"{
        "type": "record",
        "name": "Hand",
        "namespace": "com.example",
        "fields": [
            {"name": "first", "type": {"type": "enum", "name": "Suit", "symbols": ["HEART", "SPADE"]}},
            {"name": "short", "type": "Suit"},
            {"name": "full", "type": "com.example.Suit"}
        ]
    }"#;
    let hand: Value = [("first", "SPADE"), ("short", "HEART"), ("full", "SPADE")].into_iter().collect();
    binary_codec_pass(schema, hand, b"\x02\x00\x02");
}

#[test]
fn test_inner_namespace_applies_to_children() {
    let schema = r#"{
        "type": "record",
        "name": "Outer",
        "namespace": "a",
        "fields": [
            {"name": "inner", "type": {"type": "fixed", "name": "Pair", "namespace": "b", "size": 2}},
            {"name": "again", "type": "b.Pair"}
        ]
    }"#;
    assert!(compile(schema).is_ok());

    let unqualified = schema.replace("b.Pair", "Pair");
    assert!(matches!(compile(&unqualified), Err(SchemaError::UndefinedReference(_))));
}

#[test]
fn test_undefined_reference() {
    assert!(matches!(compile(r#""com.example.Missing""#), Err(SchemaError::UndefinedReference(_))));
    // a name only becomes visible once its definition has been compiled
    let forward = r#"["null","Later",{"type":"fixed","name":"Later","size":1}]"#;
    assert!(matches!(compile(forward), Err(SchemaError::UndefinedReference(_))));
}

#[test]
fn test_duplicate_name() {
    let schema = r#"{"type":"record","name":"R","fields":[
        {"name":"a","type":{"type":"fixed","name":"F","size":1}},
        {"name":"b","type":{"type":"enum","name":"F","symbols":["X"]}}
    ]}"#;
    match compile(schema) {
        Err(SchemaError::DuplicateName(name)) => assert_eq!(name, "F"),
        other => panic!("Expected DuplicateName, got {:?}", other),
    }
}

#[test]
fn test_invalid_names() {
    let bad_first = compile(r#"{"type":"fixed","name":"1st","size":1}"#);
    match bad_first {
        Err(SchemaError::InvalidName(e)) => assert_eq!(e.rule, NameRule::FirstCharacter),
        other => panic!("Expected InvalidName, got {:?}", other),
    }
    assert!(matches!(
        compile(r#"{"type":"fixed","name":"com..F","size":1}"#),
        Err(SchemaError::InvalidName(_))
    ));
    assert!(matches!(
        compile(r#"{"type":"record","name":"R","fields":[{"name":"bad-field","type":"int"}]}"#),
        Err(SchemaError::InvalidName(_))
    ));
    assert!(matches!(
        compile(r#"{"type":"enum","name":"E","symbols":["ok","not ok"]}"#),
        Err(SchemaError::InvalidName(_))
    ));
}

#[test]
fn test_malformed_schemas() {
    let cases = [
        r#"42"#,
        r#"{"name":"NoType"}"#,
        r#"{"type":"array"}"#,
        r#"{"type":"map"}"#,
        r#"{"type":"record","name":"R"}"#,
        r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"},{"name":"a","type":"int"}]}"#,
        r#"{"type":"enum","name":"E","symbols":[]}"#,
        r#"{"type":"enum","name":"E","symbols":["A","A"]}"#,
        r#"{"type":"fixed","name":"F","size":-1}"#,
        r#"{"type":"fixed","name":"F","namespace":7,"size":1}"#,
    ];
    for case in cases {
        assert!(matches!(compile(case), Err(SchemaError::InvalidFormat(_))), "{}", case);
    }
}

#[test]
fn test_invalid_defaults() {
    let cases = [
        (r#""int""#, r#""zero""#),
        (r#""int""#, "3000000000"),
        (r#"["null","int"]"#, "3"),
        (r#"{"type":"enum","name":"E","symbols":["A"]}"#, r#""B""#),
        (r#"{"type":"fixed","name":"F","size":2}"#, r#""abc""#),
        (r#""bytes""#, r#""Ā""#),
    ];
    for (field_type, default) in cases {
        let schema = format!(
            r#"{{"type":"record","name":"R","fields":[{{"name":"f","type":{},"default":{}}}]}}"#,
            field_type, default
        );
        match compile(&schema) {
            Err(SchemaError::InvalidDefault { field, .. }) => assert_eq!(field, "f"),
            other => panic!("{}: expected InvalidDefault, got {:?}", schema, other),
        }
    }
}

#[test]
fn test_nested_record_default() {
    let schema = r#"{"type":"record","name":"Outer","fields":[
        {"name":"inner","default":{"a":5},"type":{"type":"record","name":"Inner","fields":[
            {"name":"a","type":"int"},
            {"name":"b","type":"string","default":"x"}
        ]}}
    ]}"#;
    let empty = Value::Map(Default::default());
    assert_eq!(binary(schema, &empty), b"\x0a\x02x");
}

#[test]
fn test_codec_is_shareable() {
    let codec = compile(r#"{"type":"array","items":"long"}"#).unwrap();
    let handles: Vec<_> = (0..4i64)
        .map(|n| {
            let codec = codec.clone();
            std::thread::spawn(move || {
                let value = Value::Array(vec![Value::Long(n); n as usize]);
                let mut buf = Vec::new();
                codec.binary_encode(&mut buf, &value).unwrap();
                let (decoded, _) = codec.binary_decode(&buf).unwrap();
                assert_eq!(decoded, value);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
