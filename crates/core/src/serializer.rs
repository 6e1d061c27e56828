//! Compact and pretty-print serialization.
//!
//! Grounded on `son.rs`'s `SonConfig`/`format_value`/`format_string`/
//! `push_indent` structure (compact-vs-pretty split, a float formatted
//! with a forced decimal point), with the actual escaping table and
//! number-formatting rules taken from `original_source/src/stringify.c`.

use std::ffi::CString;

use crate::node::JsonType;
use crate::value::Value;

/// Options accepted by [`stringify`]. One struct field per option rather
/// than a packed bitset — see `ParseOptions` for the same call.
#[derive(Debug, Clone)]
pub struct StringifyOptions {
    /// Enables indentation; a no-op if `indent == 0`.
    pub pretty: bool,
    /// Spaces per nesting level. `0` minifies regardless of `pretty`.
    pub indent: u32,
    /// Newline string emitted between pretty-printed tokens.
    pub newline: String,
    /// Emit `/` as `\/`.
    pub escape_slash: bool,
    /// Emit any codepoint `>= 0x80` as `\uXXXX` (surrogate-paired above
    /// the BMP) instead of passing UTF-8 through verbatim.
    pub escape_unicode: bool,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        StringifyOptions {
            pretty: false,
            indent: 2,
            newline: "\n".to_string(),
            escape_slash: false,
            escape_unicode: false,
        }
    }
}

impl StringifyOptions {
    /// Two-space pretty-printed output with a `\n` newline.
    pub fn pretty() -> Self {
        StringifyOptions {
            pretty: true,
            ..Self::default()
        }
    }

    fn indents(&self) -> bool {
        self.pretty && self.indent > 0
    }
}

/// Serializes `value` into a newly allocated string under `options`.
/// Safe Rust's `String` tracks its own length, so unlike the C ancestor
/// this never needs an explicit NUL terminator to be queryable.
pub fn stringify(value: Value<'_>, options: &StringifyOptions) -> String {
    let mut out = String::new();
    write_value(&value, 0, &mut out, options);
    out
}

/// Serializes `value` into a NUL-terminated `CString`, for FFI-flavored
/// callers that want C-style interop at the boundary instead of a `String`.
///
/// `write_string` escapes every byte `< 0x20`, including NUL, as `\u00XX`
/// rather than emitting it raw, so the output never contains an interior
/// NUL and `CString::new` can't fail on it.
pub fn stringify_cstring(value: Value<'_>, options: &StringifyOptions) -> CString {
    CString::new(stringify(value, options))
        .expect("stringify: escaped output must not contain an interior NUL byte")
}

fn write_indent(out: &mut String, options: &StringifyOptions, depth: usize) {
    out.push_str(&options.newline);
    for _ in 0..(depth * options.indent as usize) {
        out.push(' ');
    }
}

fn write_value(value: &Value<'_>, depth: usize, out: &mut String, options: &StringifyOptions) {
    match value.json_type() {
        JsonType::Null => out.push_str("null"),
        JsonType::Bool => out.push_str(if value.as_bool() { "true" } else { "false" }),
        JsonType::Int => out.push_str(&value.as_i64().to_string()),
        JsonType::Float => write_float(out, value.as_f64()),
        JsonType::String => write_string(out, value.as_str(), options),
        JsonType::Array => write_array(value, depth, out, options),
        JsonType::Object => write_object(value, depth, out, options),
    }
}

/// `NaN`/`±Infinity` have no JSON encoding and serialize as `null`.
/// Finite values use Rust's `f64` `Display`, which already produces the
/// shortest decimal string that round-trips back to the same bit
/// pattern — a `.0` suffix is appended when the result would otherwise
/// read as an integer, matching `son.rs`'s float-disambiguation rule.
fn write_float(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push_str("null");
        return;
    }
    let s = v.to_string();
    out.push_str(&s);
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        out.push_str(".0");
    }
}

fn write_string(out: &mut String, s: &str, options: &StringifyOptions) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' if options.escape_slash => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if options.escape_unicode && (c as u32) >= 0x80 => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_array(value: &Value<'_>, depth: usize, out: &mut String, options: &StringifyOptions) {
    out.push('[');
    let mut first = true;
    for elem in value.iter_array() {
        if !first {
            out.push(',');
        }
        first = false;
        if options.indents() {
            write_indent(out, options, depth + 1);
        }
        write_value(&elem, depth + 1, out, options);
    }
    if !first && options.indents() {
        write_indent(out, options, depth);
    }
    out.push(']');
}

fn write_object(value: &Value<'_>, depth: usize, out: &mut String, options: &StringifyOptions) {
    out.push('{');
    let mut first = true;
    for (key, val) in value.iter_object() {
        if !first {
            out.push(',');
        }
        first = false;
        if options.indents() {
            write_indent(out, options, depth + 1);
        }
        write_string(out, key, options);
        out.push(':');
        if options.indents() {
            out.push(' ');
        }
        write_value(&val, depth + 1, out, options);
    }
    if !first && options.indents() {
        write_indent(out, options, depth);
    }
    out.push('}');
}
