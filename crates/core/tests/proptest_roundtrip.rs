//! Property-based round-trip and kernel-equivalence tests, in the style of
//! `proptest`-based suites elsewhere in the retrieved pack.

use json_core::parse;
use proptest::prelude::*;

/// A small recursive JSON value generator biased toward short, shallow
/// documents so `proptest` can explore many shapes quickly.
fn json_value() -> impl Strategy<Value = serde_json_like::Json> {
    let leaf = prop_oneof![
        Just(serde_json_like::Json::Null),
        any::<bool>().prop_map(serde_json_like::Json::Bool),
        any::<i32>().prop_map(|i| serde_json_like::Json::Int(i as i64)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(serde_json_like::Json::Str),
    ];
    leaf.prop_recursive(3, 16, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json_like::Json::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                .prop_map(serde_json_like::Json::Object),
        ]
    })
}

/// A tiny local JSON AST, independent of `json_core`'s own arena-backed
/// model, used only to generate and render candidate documents for the
/// round-trip properties below.
mod serde_json_like {
    #[derive(Clone, Debug)]
    pub enum Json {
        Null,
        Bool(bool),
        Int(i64),
        Str(String),
        Array(Vec<Json>),
        Object(Vec<(String, Json)>),
    }

    impl Json {
        pub fn render(&self) -> String {
            match self {
                Json::Null => "null".to_string(),
                Json::Bool(b) => b.to_string(),
                Json::Int(i) => i.to_string(),
                Json::Str(s) => format!("{:?}", s),
                Json::Array(items) => {
                    let parts: Vec<String> = items.iter().map(Json::render).collect();
                    format!("[{}]", parts.join(","))
                }
                Json::Object(members) => {
                    let parts: Vec<String> = members
                        .iter()
                        .map(|(k, v)| format!("{:?}:{}", k, v.render()))
                        .collect();
                    format!("{{{}}}", parts.join(","))
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn arbitrary_json_round_trips_through_parse_and_stringify(value in json_value()) {
        let text = value.render();
        let doc = parse(text.as_bytes()).expect("generator only produces valid JSON");
        let reparsed = parse(doc.to_string_compact().as_bytes()).unwrap();
        prop_assert!(doc.root() == reparsed.root());
    }

    #[test]
    fn arbitrary_json_stringify_is_idempotent(value in json_value()) {
        let text = value.render();
        let once = parse(text.as_bytes()).unwrap().to_string_compact();
        let twice = parse(once.as_bytes()).unwrap().to_string_compact();
        prop_assert_eq!(once, twice);
    }

}
