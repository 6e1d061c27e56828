//! Recursive-descent parser.
//!
//! Grounded line-for-line in control flow on `original_source/src/parse.c`
//! (`parse_value`/`parse_null`/`parse_true`/`parse_false`/`parse_number`/
//! `parse_string`/`parse_array`/`parse_object`, the two-pass string
//! measure/materialize split, surrogate-pair decoding, leading-zero
//! rejection, and the trailing-content check), restructured into
//! `Result`-returning Rust.

use crate::arena::{Arena, Entry, EntryRef, NodeRef};
use crate::document::{Document, ParseOptions};
use crate::error::{set_last_error, ErrorCode, JsonError, ParseErrorInfo};
use crate::node::{Node, MAX_INLINE_INT, MIN_INLINE_INT, SHORT_STRING_MAX};
use crate::simd;

type PResult<T> = Result<T, JsonError>;

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    arena: Arena,
    options: &'a ParseOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn fail<T>(&self, code: ErrorCode, message: &str) -> PResult<T> {
        let info = ParseErrorInfo {
            code,
            byte_position: self.pos,
            line: self.line,
            column: self.col,
            message: message.to_string(),
        };
        set_last_error(info.clone());
        Err(JsonError::Parse(info))
    }

    /// Allocates a value node, surfacing `Memory` if the arena can't grow
    /// to fit it rather than aborting the process.
    fn alloc_value(&mut self, node: Node) -> PResult<NodeRef> {
        match self.arena.allocate_value(node) {
            Some(r) => Ok(r),
            None => self.fail(ErrorCode::Memory, "out of memory allocating value node"),
        }
    }

    fn alloc_entry(&mut self, entry: Entry) -> PResult<EntryRef> {
        match self.arena.allocate_entry(entry) {
            Some(r) => Ok(r),
            None => self.fail(ErrorCode::Memory, "out of memory allocating object entry"),
        }
    }

    fn alloc_string(&mut self, bytes: &[u8]) -> PResult<crate::arena::StringRef> {
        match self.arena.allocate_string(bytes) {
            Some(r) => Ok(r),
            None => self.fail(ErrorCode::Memory, "out of memory allocating string bytes"),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek_byte() {
            match b {
                b' ' | b'\t' | b'\r' => {
                    self.pos += 1;
                    self.col += 1;
                }
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.col = 1;
                }
                _ => break,
            }
        }
    }

    /// Skips whitespace and returns the next byte without consuming it.
    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.peek_byte()
    }

    /// Skips whitespace, then consumes `expected` if it's next.
    fn consume(&mut self, expected: u8) -> bool {
        self.skip_ws();
        if self.peek_byte() == Some(expected) {
            self.pos += 1;
            self.col += 1;
            true
        } else {
            false
        }
    }

    fn enter_depth(&mut self) -> PResult<()> {
        if self.options.max_depth > 0 && self.depth >= self.options.max_depth {
            return self.fail(ErrorCode::Depth, "maximum nesting depth exceeded");
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_depth(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self) -> PResult<NodeRef> {
        match self.peek() {
            Some(b'n') => self.parse_literal(b"null", Node::null()),
            Some(b't') => self.parse_literal(b"true", Node::bool(true)),
            Some(b'f') => self.parse_literal(b"false", Node::bool(false)),
            Some(b'"') => self.parse_string_value(),
            Some(b'[') => self.parse_array(),
            Some(b'{') => self.parse_object(),
            Some(b'I') if self.options.allow_inf_nan => {
                self.parse_literal(b"Infinity", Node::float(f64::INFINITY))
            }
            Some(b'N') if self.options.allow_inf_nan => {
                self.parse_literal(b"NaN", Node::float(f64::NAN))
            }
            Some(b'-') if self.options.allow_inf_nan && self.input[self.pos..].starts_with(b"-Infinity") => {
                self.parse_literal(b"-Infinity", Node::float(f64::NEG_INFINITY))
            }
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number(),
            Some(_) => self.fail(ErrorCode::Syntax, "unexpected character"),
            None => self.fail(ErrorCode::Syntax, "unexpected end of input"),
        }
    }

    fn parse_literal(&mut self, text: &'static [u8], node: Node) -> PResult<NodeRef> {
        if self.input[self.pos..].starts_with(text) {
            self.pos += text.len();
            self.col += text.len() as u32;
            self.alloc_value(node)
        } else {
            self.fail(
                ErrorCode::Syntax,
                &format!("expected '{}'", String::from_utf8_lossy(text)),
            )
        }
    }

    /// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    fn parse_number(&mut self) -> PResult<NodeRef> {
        let bytes = self.input;
        let start = self.pos;
        let mut i = start;

        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        let digits_start = i;
        if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
            return self.fail(ErrorCode::Number, "invalid number");
        }
        if bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'0'..=b'9')) {
            return self.fail(ErrorCode::Number, "leading zeros not allowed");
        }
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        let int_end = i;

        let mut is_float = false;
        if bytes.get(i) == Some(&b'.') {
            is_float = true;
            i += 1;
            if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
                return self.fail(ErrorCode::Number, "expected digit after decimal point");
            }
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
            is_float = true;
            i += 1;
            if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
                i += 1;
            }
            if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
                return self.fail(ErrorCode::Number, "expected digit in exponent");
            }
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }

        let text = std::str::from_utf8(&bytes[start..i]).expect("number text is ASCII");
        let node = if is_float {
            match text.parse::<f64>() {
                Ok(v) => Node::float(v),
                Err(_) => return self.fail(ErrorCode::Number, "number out of range"),
            }
        } else {
            let digit_count = int_end - digits_start;
            let as_i64 = if digit_count <= 18 {
                // No signed-64-bit overflow is possible at this width;
                // the dispatched kernel is trusted directly.
                let (value, consumed) = (simd::dispatch().parse_int)(&bytes[start..int_end]);
                debug_assert_eq!(consumed, int_end - start);
                Ok(value)
            } else {
                // 19+ digits may overflow i64; fall back to a checked
                // parse and, failing that, the host float parser.
                text.parse::<i64>()
            };
            match as_i64 {
                Ok(v) if (MIN_INLINE_INT..=MAX_INLINE_INT).contains(&v) => Node::int(v),
                Ok(v) => Node::float(v as f64),
                Err(_) => match text.parse::<f64>() {
                    Ok(v) => Node::float(v),
                    Err(_) => return self.fail(ErrorCode::Number, "number out of range"),
                },
            }
        };

        self.pos = i;
        self.col += (i - start) as u32;
        self.alloc_value(node)
    }

    /// Parses a `"..."` string at the current position into a `Node`,
    /// without allocating it into the value arena (used directly both
    /// for string values and for object keys).
    fn parse_string_node(&mut self) -> PResult<Node> {
        self.skip_ws();
        if self.peek_byte() != Some(b'"') {
            return self.fail(ErrorCode::Syntax, "expected '\"'");
        }
        self.pos += 1;
        self.col += 1;
        let content_start = self.pos;

        // Pass 1 (measure): walk to the closing quote, counting decoded
        // UTF-8 bytes and noting whether any escape appeared. Stop bytes
        // (`"`, `\`, and control bytes `< 0x20`) are all single-byte ASCII,
        // so they can never fall inside a multi-byte UTF-8 sequence; each
        // raw run `scan_string` hands back is therefore a complete,
        // independently checkable span, and validating it here rejects
        // malformed bytes (lone continuation bytes, overlong sequences,
        // truncated leads) before they ever reach the arena.
        let mut decoded_len = 0usize;
        let mut has_escapes = false;
        loop {
            let run_start = self.pos;
            let run = (simd::dispatch().scan_string)(&self.input[self.pos..]);
            let run_bytes = &self.input[run_start..run_start + run];
            if std::str::from_utf8(run_bytes).is_err() {
                return self.fail(ErrorCode::Utf8, "invalid UTF-8 in string");
            }
            decoded_len += run;
            self.pos += run;
            self.col += run as u32;

            match self.peek_byte() {
                None => return self.fail(ErrorCode::String, "unterminated string"),
                Some(b'"') => break,
                Some(b'\\') => {
                    has_escapes = true;
                    self.pos += 1;
                    self.col += 1;
                    decoded_len += self.measure_escape()?;
                }
                Some(c) if c < 0x20 => {
                    return self.fail(ErrorCode::String, "control character in string");
                }
                Some(_) => unreachable!("scan_string stopped short of a stop byte"),
            }
        }
        let content_end = self.pos;
        self.pos += 1; // closing quote
        self.col += 1;

        if !has_escapes && decoded_len <= SHORT_STRING_MAX {
            return Ok(Node::short_string(&self.input[content_start..content_end]));
        }

        let string_ref = if !has_escapes {
            self.alloc_string(&self.input[content_start..content_end])?
        } else {
            let mut buf = Vec::with_capacity(decoded_len);
            materialize_escapes(self.input, content_start, content_end, &mut buf);
            self.alloc_string(&buf)?
        };
        Ok(Node::long_string(decoded_len, string_ref))
    }

    fn parse_string_value(&mut self) -> PResult<NodeRef> {
        let node = self.parse_string_node()?;
        self.alloc_value(node)
    }

    /// Consumes one escape sequence (the parser's `pos` is positioned
    /// just past the `\`) and returns how many decoded UTF-8 bytes it
    /// will contribute.
    fn measure_escape(&mut self) -> PResult<usize> {
        match self.peek_byte() {
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                self.pos += 1;
                self.col += 1;
                Ok(1)
            }
            Some(b'u') => {
                self.pos += 1;
                self.col += 1;
                let hi = self.read_hex4()?;
                let scalar = if (0xD800..=0xDBFF).contains(&hi) {
                    if self.input.get(self.pos) != Some(&b'\\')
                        || self.input.get(self.pos + 1) != Some(&b'u')
                    {
                        return self.fail(
                            ErrorCode::String,
                            "expected low surrogate after high surrogate",
                        );
                    }
                    self.pos += 2;
                    self.col += 2;
                    let lo = self.read_hex4()?;
                    if !(0xDC00..=0xDFFF).contains(&lo) {
                        return self.fail(ErrorCode::String, "invalid low surrogate");
                    }
                    0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)
                } else if (0xDC00..=0xDFFF).contains(&hi) {
                    return self.fail(ErrorCode::String, "unexpected low surrogate");
                } else {
                    hi
                };
                match char::from_u32(scalar) {
                    Some(ch) => Ok(ch.len_utf8()),
                    None => self.fail(ErrorCode::String, "invalid unicode escape"),
                }
            }
            Some(_) => self.fail(ErrorCode::String, "invalid escape sequence"),
            None => self.fail(ErrorCode::String, "unterminated escape"),
        }
    }

    fn read_hex4(&mut self) -> PResult<u32> {
        if self.pos + 4 > self.input.len() {
            return self.fail(ErrorCode::String, "invalid unicode escape");
        }
        let mut cp = 0u32;
        for k in 0..4 {
            match (self.input[self.pos + k] as char).to_digit(16) {
                Some(d) => cp = (cp << 4) | d,
                None => return self.fail(ErrorCode::String, "invalid unicode escape"),
            }
        }
        self.pos += 4;
        self.col += 4;
        Ok(cp)
    }

    fn parse_array(&mut self) -> PResult<NodeRef> {
        self.skip_ws();
        self.pos += 1; // '['
        self.col += 1;
        self.enter_depth()?;

        let arr_ref = self.alloc_value(Node::array(NodeRef::NULL))?;

        if self.peek() == Some(b']') {
            self.pos += 1;
            self.col += 1;
            self.exit_depth();
            return Ok(arr_ref);
        }

        let mut first: Option<NodeRef> = None;
        let mut prev: Option<NodeRef> = None;
        loop {
            let elem = self.parse_value()?;
            if let Some(p) = prev {
                self.arena.node_mut(p).set_next_sibling(elem);
            } else {
                first = Some(elem);
            }
            prev = Some(elem);

            if self.peek() == Some(b']') {
                self.pos += 1;
                self.col += 1;
                break;
            }
            if !self.consume(b',') {
                return self.fail(ErrorCode::Syntax, "expected ',' or ']'");
            }
            if self.options.allow_trailing && self.peek() == Some(b']') {
                self.pos += 1;
                self.col += 1;
                break;
            }
        }

        if let Some(first) = first {
            self.arena.node_mut(arr_ref).set_array_first_child(first);
        }
        self.exit_depth();
        Ok(arr_ref)
    }

    fn parse_object(&mut self) -> PResult<NodeRef> {
        self.skip_ws();
        self.pos += 1; // '{'
        self.col += 1;
        self.enter_depth()?;

        let obj_ref = self.alloc_value(Node::object(EntryRef::NULL))?;

        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.col += 1;
            self.exit_depth();
            return Ok(obj_ref);
        }

        let mut first: Option<EntryRef> = None;
        let mut prev: Option<EntryRef> = None;
        loop {
            if self.peek() != Some(b'"') {
                return self.fail(ErrorCode::Syntax, "expected string key");
            }
            let key = self.parse_string_node()?;
            if !self.consume(b':') {
                return self.fail(ErrorCode::Syntax, "expected ':'");
            }
            let value = self.parse_value()?;

            let entry_ref = self.alloc_entry(Entry {
                key,
                value,
                next: EntryRef::NULL,
            })?;
            if let Some(p) = prev {
                self.arena.entry_mut(p).next = entry_ref;
            } else {
                first = Some(entry_ref);
            }
            prev = Some(entry_ref);

            if self.peek() == Some(b'}') {
                self.pos += 1;
                self.col += 1;
                break;
            }
            if !self.consume(b',') {
                return self.fail(ErrorCode::Syntax, "expected ',' or '}'");
            }
            if self.options.allow_trailing && self.peek() == Some(b'}') {
                self.pos += 1;
                self.col += 1;
                break;
            }
        }

        if let Some(first) = first {
            self.arena.node_mut(obj_ref).set_object_first_entry(first);
        }
        self.exit_depth();
        Ok(obj_ref)
    }
}

/// Re-parses an already-validated escaped run (`input[start..end]`) into
/// `out`. Pass 1 ([`Parser::measure_escape`]) already rejected every
/// malformed sequence, so this pass trusts the input's structure.
fn materialize_escapes(input: &[u8], start: usize, end: usize, out: &mut Vec<u8>) {
    let mut i = start;
    while i < end {
        let c = input[i];
        if c != b'\\' {
            out.push(c);
            i += 1;
            continue;
        }
        i += 1;
        match input[i] {
            b'"' => {
                out.push(b'"');
                i += 1;
            }
            b'\\' => {
                out.push(b'\\');
                i += 1;
            }
            b'/' => {
                out.push(b'/');
                i += 1;
            }
            b'b' => {
                out.push(0x08);
                i += 1;
            }
            b'f' => {
                out.push(0x0C);
                i += 1;
            }
            b'n' => {
                out.push(b'\n');
                i += 1;
            }
            b'r' => {
                out.push(b'\r');
                i += 1;
            }
            b't' => {
                out.push(b'\t');
                i += 1;
            }
            b'u' => {
                i += 1;
                let (hi, next_i) = hex4_at(input, i);
                i = next_i;
                let scalar = if (0xD800..=0xDBFF).contains(&hi) {
                    i += 2; // skip the second "\u"
                    let (lo, next_i) = hex4_at(input, i);
                    i = next_i;
                    0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)
                } else {
                    hi
                };
                let ch = char::from_u32(scalar).expect("validated during measure pass");
                let mut tmp = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
            }
            other => unreachable!("validated during measure pass: \\{}", other as char),
        }
    }
}

fn hex4_at(bytes: &[u8], pos: usize) -> (u32, usize) {
    let mut cp = 0u32;
    for k in 0..4 {
        let d = (bytes[pos + k] as char)
            .to_digit(16)
            .expect("validated during measure pass");
        cp = (cp << 4) | d;
    }
    (cp, pos + 4)
}

/// Entry point invoked by [`crate::document::parse_with`].
pub(crate) fn parse(input: &[u8], options: &ParseOptions) -> Result<Document, JsonError> {
    let estimated_nodes = (input.len() / 4 + 1).max(64 * 1024 / std::mem::size_of::<Node>());
    let estimated_strings = (input.len() / 4).max(16 * 1024);
    let arena = Arena::with_capacity(estimated_nodes, estimated_strings);

    let mut parser = Parser {
        input,
        pos: 0,
        line: 1,
        col: 1,
        arena,
        options,
        depth: 0,
    };

    let root = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos < parser.input.len() {
        return parser.fail(ErrorCode::Syntax, "trailing content after JSON");
    }

    Ok(Document::new(parser.arena, root))
}
