//! The owning in-memory document produced by a successful parse, plus the
//! options accepted by [`parse_with`].

use crate::arena::{Arena, NodeRef};
use crate::error::JsonError;
use crate::simd::CpuFeatures;
use crate::value::Value;

/// Flags and limits accepted by [`parse_with`]. One field per flag rather
/// than a packed bitset, since Rust has no FFI boundary to economize for
/// here (see DESIGN.md, "Parse options as a struct, not a bitset").
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Accept `//` and `/* */` comments in whitespace positions.
    ///
    /// Accepted for contract parity but never honored — see DESIGN.md,
    /// "ALLOW_COMMENTS parse flag".
    pub allow_comments: bool,
    /// Permit a trailing `,` before a closing `]` or `}`.
    pub allow_trailing: bool,
    /// Accept `Infinity`, `-Infinity`, and `NaN` as float literals in
    /// value position, in addition to ordinary JSON numbers.
    pub allow_inf_nan: bool,
    /// Accepted as a no-op. The arena-based safe-Rust design has no
    /// destructive in-place unescaping path to enable — see DESIGN.md,
    /// "IN_SITU parse flag".
    pub in_situ: bool,
    /// `0` = unlimited; otherwise the maximum nesting depth for arrays
    /// and objects.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            allow_comments: false,
            allow_trailing: false,
            allow_inf_nan: false,
            in_situ: false,
            max_depth: 0,
        }
    }
}

/// An owned, parsed JSON document: a bump-style node arena plus a root
/// reference. Read-only once returned by [`parse`]/[`parse_with`];
/// released as a unit when dropped — no per-node teardown.
pub struct Document {
    pub(crate) arena: Arena,
    pub(crate) root: NodeRef,
    cpu_features: &'static CpuFeatures,
}

impl Document {
    pub(crate) fn new(arena: Arena, root: NodeRef) -> Self {
        Document {
            arena,
            root,
            cpu_features: CpuFeatures::get(),
        }
    }

    /// The root value, wrapped for typed query access.
    pub fn root(&self) -> Value<'_> {
        Value::new(self, self.root)
    }

    /// Number of value nodes allocated for this document: the root plus
    /// every descendant. Object keys live in a separate entry arena and
    /// are not counted here.
    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    /// Total bytes currently held across the node, string, and entry
    /// arenas.
    pub fn memory_usage(&self) -> usize {
        self.arena.bytes_allocated()
    }

    /// CPU features that were active (detected and dispatched on) for
    /// this process when this document was parsed.
    pub fn cpu_features(&self) -> &'static CpuFeatures {
        self.cpu_features
    }

    /// Serializes the document in compact (no whitespace) form.
    pub fn to_string_compact(&self) -> String {
        crate::serializer::stringify(self.root(), &crate::serializer::StringifyOptions::default())
    }

    /// Serializes the document with two-space pretty-print indentation.
    pub fn to_string_pretty(&self) -> String {
        crate::serializer::stringify(self.root(), &crate::serializer::StringifyOptions::pretty())
    }

    /// Serializes the document under caller-supplied options.
    pub fn stringify_with(&self, options: &crate::serializer::StringifyOptions) -> String {
        crate::serializer::stringify(self.root(), options)
    }

    /// Serializes the document (compact form) into a NUL-terminated
    /// `CString`, for FFI-flavored callers.
    pub fn to_cstring(&self) -> std::ffi::CString {
        crate::serializer::stringify_cstring(self.root(), &crate::serializer::StringifyOptions::default())
    }
}

/// Parses `input` with default options (no trailing commas, no comments,
/// no depth limit). Zero-length input is a `Syntax` error.
pub fn parse(input: &[u8]) -> Result<Document, JsonError> {
    parse_with(input, &ParseOptions::default())
}

/// Parses `input` under the given [`ParseOptions`].
pub fn parse_with(input: &[u8], options: &ParseOptions) -> Result<Document, JsonError> {
    crate::parser::parse(input, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_have_no_limits() {
        let opts = ParseOptions::default();
        assert_eq!(opts.max_depth, 0);
        assert!(!opts.allow_trailing);
    }

    #[test]
    fn empty_input_is_syntax_error() {
        let err = parse(b"").unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::Syntax);
    }

    #[test]
    fn memory_usage_grows_with_content() {
        let small = parse(b"1").unwrap();
        let large = parse(format!("[{}]", "1,".repeat(10_000) + "1").as_bytes()).unwrap();
        assert!(large.memory_usage() > small.memory_usage());
    }
}
