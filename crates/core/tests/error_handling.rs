//! Thread-local "last error" API parity, plus the parse flags from
//! spec.md's options table: `AllowComments` and `InSitu` are contract-only
//! (accepted, never honored); `AllowTrailing`, `AllowInfNan`, and
//! `max_depth` actually change parse behavior and are exercised here too.

use json_core::error::{clear_last_error, has_last_error, peek_last_error, take_last_error};
use json_core::{parse, parse_with, ErrorCode, ParseOptions, StringifyOptions};

#[test]
fn failed_parse_populates_thread_local_last_error() {
    clear_last_error();
    assert!(!has_last_error());
    let err = parse(b"{").unwrap_err();
    assert!(has_last_error());
    let info = peek_last_error().unwrap();
    assert_eq!(info.code, err.code());
    assert!(has_last_error());
    let taken = take_last_error().unwrap();
    assert_eq!(taken.code, err.code());
    assert!(!has_last_error());
}

#[test]
fn successful_parse_does_not_clear_a_stale_last_error() {
    clear_last_error();
    let _ = parse(b"not json").unwrap_err();
    assert!(has_last_error());
    let doc = parse(b"null").unwrap();
    assert!(doc.root().is_null());
    // The contract only documents that a failure populates the slot, not
    // that success clears it; callers that care call `take_last_error`.
    assert!(has_last_error());
    clear_last_error();
}

#[test]
fn allow_comments_is_accepted_but_not_honored() {
    let opts = ParseOptions {
        allow_comments: true,
        ..ParseOptions::default()
    };
    let err = parse_with(b"// hi\nnull", &opts).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Syntax);
}

#[test]
fn inf_nan_literals_rejected_by_default() {
    assert_eq!(parse(b"Infinity").unwrap_err().code(), ErrorCode::Syntax);
    assert_eq!(parse(b"-Infinity").unwrap_err().code(), ErrorCode::Syntax);
    assert_eq!(parse(b"NaN").unwrap_err().code(), ErrorCode::Syntax);
}

#[test]
fn allow_inf_nan_accepts_the_three_literals_as_floats() {
    let opts = ParseOptions {
        allow_inf_nan: true,
        ..ParseOptions::default()
    };
    let doc = parse_with(b"Infinity", &opts).unwrap();
    assert!(doc.root().is_float());
    assert_eq!(doc.root().as_f64(), f64::INFINITY);

    let doc = parse_with(b"-Infinity", &opts).unwrap();
    assert!(doc.root().is_float());
    assert_eq!(doc.root().as_f64(), f64::NEG_INFINITY);

    let doc = parse_with(b"NaN", &opts).unwrap();
    assert!(doc.root().is_float());
    assert!(doc.root().as_f64().is_nan());
}

#[test]
fn allow_inf_nan_works_nested_inside_a_container() {
    let opts = ParseOptions {
        allow_inf_nan: true,
        ..ParseOptions::default()
    };
    let doc = parse_with(b"[1, Infinity, -Infinity, NaN]", &opts).unwrap();
    let root = doc.root();
    assert_eq!(root.len(), 4);
    assert_eq!(root.get_index(1).unwrap().as_f64(), f64::INFINITY);
    assert_eq!(root.get_index(2).unwrap().as_f64(), f64::NEG_INFINITY);
    assert!(root.get_index(3).unwrap().as_f64().is_nan());
}

#[test]
fn in_situ_flag_is_accepted_as_a_no_op() {
    let opts = ParseOptions {
        in_situ: true,
        ..ParseOptions::default()
    };
    let doc = parse_with(br#"{"a":1}"#, &opts).unwrap();
    assert_eq!(doc.root().get("a").unwrap().as_i64(), 1);
}

#[test]
fn escape_slash_option_round_trips() {
    let doc = parse(br#""a/b""#).unwrap();
    let escaped = doc.stringify_with(&StringifyOptions {
        escape_slash: true,
        ..StringifyOptions::default()
    });
    assert_eq!(escaped, r#""a\/b""#);
    let unescaped = doc.stringify_with(&StringifyOptions::default());
    assert_eq!(unescaped, r#""a/b""#);
}

#[test]
fn malformed_utf8_in_a_string_is_rejected_with_utf8_error() {
    // A lone 0x80 continuation byte with no lead byte.
    assert_eq!(parse(b"\"a\x80b\"").unwrap_err().code(), ErrorCode::Utf8);
    // 0xC0 0x80, an overlong encoding of NUL.
    assert_eq!(parse(b"\"\xC0\x80\"").unwrap_err().code(), ErrorCode::Utf8);
}

#[test]
fn zero_depth_means_unlimited() {
    let opts = ParseOptions {
        max_depth: 0,
        ..ParseOptions::default()
    };
    let nested = format!("{}1{}", "[".repeat(200), "]".repeat(200));
    assert!(parse_with(nested.as_bytes(), &opts).is_ok());
}
