//! json-core: a compact, arena-backed JSON document model with
//! SIMD-dispatched parsing kernels.
//!
//! Every parsed value lives in a 24-byte tagged [`node::Node`], addressed
//! by index rather than pointer so the backing arena can grow without
//! invalidating references (see `arena` module docs). Parsing and
//! stringification both drive CPU-feature-dispatched kernels selected once
//! per process (see `simd` module docs).
//!
//! # Modules
//!
//! - `arena`: index-addressed node/string/entry storage for one document
//! - `node`: the 24-byte tagged value representation
//! - `document`: the owning parsed document and `ParseOptions`
//! - `value`: the typed, infallible query API over a parsed document
//! - `serializer`: compact and pretty-print stringification
//! - `simd`: CPU feature detection and kernel dispatch
//! - `error`: parse error types and the thread-local "last error" slot

pub mod arena;
pub mod document;
pub mod error;
pub mod node;
mod parser;
pub mod serializer;
pub mod simd;
pub mod value;

pub use document::{parse, parse_with, Document, ParseOptions};
pub use error::{ErrorCode, JsonError, ParseErrorInfo};
pub use node::JsonType;
pub use serializer::{stringify, stringify_cstring, StringifyOptions};
pub use value::Value;

/// Forces CPU-feature detection and kernel dispatch to run now instead of
/// lazily on the first parse. Optional; every entry point already
/// initializes on first use.
pub fn init() {
    simd::init();
}

/// The crate version, as set in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_stringify_round_trip() {
        let doc = parse(br#"{"a":1,"b":[true,null]}"#).unwrap();
        assert_eq!(doc.to_string_compact(), r#"{"a":1,"b":[true,null]}"#);
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
