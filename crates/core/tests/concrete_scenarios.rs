//! The six numbered concrete scenarios, plus the universal properties that
//! don't naturally belong inside a single module's unit tests.

use json_core::{parse, parse_with, ParseOptions, StringifyOptions};

#[test]
fn scenario_1_null_root() {
    let doc = parse(b"null").unwrap();
    assert!(doc.root().is_null());
    assert_eq!(doc.to_string_compact(), "null");
}

#[test]
fn scenario_2_array_of_three_ints_sums_to_six() {
    let doc = parse(b"[1, 2, 3]").unwrap();
    let root = doc.root();
    assert_eq!(root.len(), 3);
    let sum: i64 = root.iter_array().map(|v| v.as_i64()).sum();
    assert_eq!(sum, 6);
    assert_eq!(doc.to_string_compact(), "[1,2,3]");
}

#[test]
fn scenario_3_object_preserves_key_order_and_types() {
    let doc = parse(br#"{"name":"John","age":30}"#).unwrap();
    let root = doc.root();
    assert_eq!(root.len(), 2);
    assert!(root.get("name").unwrap().is_string());
    assert_eq!(root.get("name").unwrap().as_str(), "John");
    assert!(root.get("age").unwrap().is_int());
    assert_eq!(root.get("age").unwrap().as_i64(), 30);
    assert_eq!(doc.to_string_compact(), r#"{"name":"John","age":30}"#);
}

#[test]
fn scenario_4_escaped_quotes_roundtrip() {
    let doc = parse(br#""say \"hi\"""#).unwrap();
    let root = doc.root();
    assert_eq!(root.as_str().len(), 8);
    assert_eq!(root.as_str(), "say \"hi\"");
    assert_eq!(doc.to_string_compact(), r#""say \"hi\"""#);
}

#[test]
fn scenario_5_pretty_print_reparses_structurally_equal() {
    let doc = parse(br#"{"a":1,"b":[true,null,{"c":3.5}]}"#).unwrap();
    let options = StringifyOptions {
        pretty: true,
        indent: 2,
        newline: "\n".to_string(),
        ..StringifyOptions::default()
    };
    let pretty = doc.stringify_with(&options);
    let reparsed = parse(pretty.as_bytes()).unwrap();
    assert!(doc.root() == reparsed.root());
}

#[test]
fn scenario_6_unicode_escape_decodes_to_two_utf8_bytes() {
    let doc = parse(br#""é""#).unwrap();
    let bytes = doc.root().as_str().as_bytes();
    assert_eq!(bytes, &[0xC3, 0xA9]);
}

#[test]
fn universal_roundtrip_equality() {
    let input = br#"{"a":[1,2.5,"three",null,true,false],"b":{}}"#;
    let doc = parse(input).unwrap();
    let reparsed = parse(doc.to_string_compact().as_bytes()).unwrap();
    assert!(doc.root() == reparsed.root());
}

#[test]
fn universal_idempotent_stringify_parse_stringify() {
    let input = br#"{"a":[1,2.5,"three",null,true,false],"b":{}}"#;
    let once = parse(input).unwrap().to_string_compact();
    let twice = parse(once.as_bytes()).unwrap().to_string_compact();
    assert_eq!(once, twice);
}

#[test]
fn universal_depth_limit_allows_exactly_d_rejects_d_plus_one() {
    let opts = ParseOptions {
        max_depth: 3,
        ..ParseOptions::default()
    };
    assert!(parse_with(b"[[[1]]]", &opts).is_ok());
    assert!(parse_with(b"[[[[1]]]]", &opts).is_err());
}

#[test]
fn universal_trailing_content_rejected() {
    let err = parse(b"{} junk").unwrap_err();
    assert_eq!(err.code(), json_core::ErrorCode::Syntax);
}

#[test]
fn universal_control_character_in_string_rejected() {
    let err = parse(b"\"a\x00b\"").unwrap_err();
    assert_eq!(err.code(), json_core::ErrorCode::String);
}

#[test]
fn universal_leading_zero_rejected() {
    let err = parse(b"01").unwrap_err();
    assert_eq!(err.code(), json_core::ErrorCode::Number);
}

#[test]
fn universal_surrogate_pair_decodes_to_u1f600() {
    let doc = parse(br#""😀""#).unwrap();
    assert_eq!(doc.root().as_str(), "\u{1F600}");
}

#[test]
fn universal_short_string_boundary_at_seven_bytes() {
    let seven = parse(br#""1234567""#).unwrap();
    assert_eq!(seven.root().as_str(), "1234567");
    let eight = parse(br#""12345678""#).unwrap();
    assert_eq!(eight.root().as_str(), "12345678");
    // Both layouts must answer the accessor with the same bytes.
    assert_eq!(seven.root().as_str().len(), 7);
    assert_eq!(eight.root().as_str().len(), 8);
}

#[test]
fn universal_arena_stability_across_iteration() {
    let doc = parse(b"[10,20,30,40,50]").unwrap();
    let root = doc.root();
    let first_pass: Vec<i64> = root.iter_array().map(|v| v.as_i64()).collect();
    let second_pass: Vec<i64> = root.iter_array().map(|v| v.as_i64()).collect();
    assert_eq!(first_pass, second_pass);
    assert_eq!(first_pass, vec![10, 20, 30, 40, 50]);
}
