//! The typed, default-on-mismatch query API over a parsed [`Document`].
//!
//! Every accessor here is infallible by design: a type mismatch (asking
//! for the string contents of an `Int`, say) returns that type's zero
//! value rather than panicking or returning `Result`. This trades silent
//! type mismatches for the absence of null-check pyramids in consumer
//! code — see spec §7, "Query/accessor functions never fail."

use crate::arena::{EntryRef, NodeRef};
use crate::document::Document;
use crate::error::JsonError;
use crate::node::{JsonType, Node, Tag};

/// A read-only handle to one value inside a [`Document`]. Cheap to copy:
/// it is just a document reference plus a node index.
#[derive(Clone, Copy)]
pub struct Value<'doc> {
    doc: &'doc Document,
    node_ref: NodeRef,
}

impl<'doc> Value<'doc> {
    pub(crate) fn new(doc: &'doc Document, node_ref: NodeRef) -> Self {
        Value { doc, node_ref }
    }

    fn node(&self) -> &'doc Node {
        self.doc.arena.node(self.node_ref)
    }

    pub fn json_type(&self) -> JsonType {
        self.node().json_type()
    }

    pub fn is_null(&self) -> bool {
        self.json_type() == JsonType::Null
    }
    pub fn is_bool(&self) -> bool {
        self.json_type() == JsonType::Bool
    }
    pub fn is_true(&self) -> bool {
        self.node().tag() == Tag::True
    }
    pub fn is_false(&self) -> bool {
        self.node().tag() == Tag::False
    }
    pub fn is_int(&self) -> bool {
        self.json_type() == JsonType::Int
    }
    pub fn is_float(&self) -> bool {
        self.json_type() == JsonType::Float
    }
    pub fn is_number(&self) -> bool {
        matches!(self.json_type(), JsonType::Int | JsonType::Float)
    }
    pub fn is_string(&self) -> bool {
        self.json_type() == JsonType::String
    }
    pub fn is_array(&self) -> bool {
        self.json_type() == JsonType::Array
    }
    pub fn is_object(&self) -> bool {
        self.json_type() == JsonType::Object
    }
    pub fn is_container(&self) -> bool {
        self.is_array() || self.is_object()
    }

    /// `false` for anything but `True`.
    pub fn as_bool(&self) -> bool {
        self.node().tag() == Tag::True
    }

    /// `0` for anything but `Int`.
    pub fn as_i64(&self) -> i64 {
        self.node().as_int().unwrap_or(0)
    }

    /// `0.0` for anything but `Int` or `Float`; `Int` is widened exactly.
    pub fn as_f64(&self) -> f64 {
        match self.json_type() {
            JsonType::Int => self.node().as_int().unwrap_or(0) as f64,
            JsonType::Float => self.node().as_float().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// `""` for anything but `String`. String-node bytes are validated as
    /// UTF-8 at parse time (`parser::Parser::parse_string_node` rejects
    /// malformed input with `ErrorCode::Utf8` before it ever reaches the
    /// arena), so the `from_utf8` check below never actually fails for a
    /// `String`-typed node; it stays defensive rather than an `unwrap`
    /// because this accessor's contract (like every accessor in this
    /// module) is to never panic.
    pub fn as_str(&self) -> &'doc str {
        string_bytes_of(self.doc, self.node())
            .and_then(|b| std::str::from_utf8(b).ok())
            .unwrap_or("")
    }

    /// Number of members (object) or elements (array); `0` otherwise.
    pub fn len(&self) -> usize {
        match self.json_type() {
            JsonType::Array => self.iter_array().count(),
            JsonType::Object => self.iter_object().count(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up an object member by key via a linear scan (objects are
    /// expected to be small; no hash map is maintained). `None` if this
    /// isn't an object or the key is absent.
    pub fn get(&self, key: &str) -> Option<Value<'doc>> {
        if !self.is_object() {
            return None;
        }
        let mut cursor = self.node().object_first_entry()?;
        while !cursor.is_null() {
            let entry = self.doc.arena.entry(cursor);
            if string_bytes_of(self.doc, &entry.key) == Some(key.as_bytes()) {
                return Some(Value::new(self.doc, entry.value));
            }
            cursor = entry.next;
        }
        None
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Array element by index via a linear walk of the sibling chain.
    /// `None` if this isn't an array or the index is out of bounds.
    pub fn get_index(&self, index: usize) -> Option<Value<'doc>> {
        if !self.is_array() {
            return None;
        }
        self.iter_array().nth(index)
    }

    pub fn iter_array(&self) -> ArrayIter<'doc> {
        ArrayIter {
            doc: self.doc,
            next: if self.is_array() {
                self.node().array_first_child()
            } else {
                None
            },
        }
    }

    pub fn iter_object(&self) -> ObjectIter<'doc> {
        ObjectIter {
            doc: self.doc,
            next: if self.is_object() {
                self.node().object_first_entry()
            } else {
                None
            },
        }
    }

    /// Deep-copies this value into a brand new, independent `Document`
    /// by serializing and re-parsing it. Correct but `O(n)` in allocation
    /// and parse time — see spec §9, "`clone = stringify+parse`".
    pub fn to_owned_document(&self) -> Result<Document, JsonError> {
        let text = crate::serializer::stringify(*self, &crate::serializer::StringifyOptions::default());
        crate::document::parse_with(text.as_bytes(), &crate::document::ParseOptions::default())
    }
}

/// Structural equality: tags must match (`ShortString`/`LongString`
/// unified via [`JsonType`]), then contents are deep-compared. Arrays
/// compare pairwise in order; objects compare as sets of key/value pairs
/// — member order doesn't matter, only that every key in one has an
/// equal-valued match in the other.
impl<'a, 'b> PartialEq<Value<'b>> for Value<'a> {
    fn eq(&self, other: &Value<'b>) -> bool {
        if self.json_type() != other.json_type() {
            return false;
        }
        match self.json_type() {
            JsonType::Null => true,
            JsonType::Bool => self.as_bool() == other.as_bool(),
            JsonType::Int => self.as_i64() == other.as_i64(),
            JsonType::Float => self.as_f64() == other.as_f64(),
            JsonType::String => self.as_str() == other.as_str(),
            JsonType::Array => {
                let mut a = self.iter_array();
                let mut b = other.iter_array();
                loop {
                    match (a.next(), b.next()) {
                        (Some(x), Some(y)) => {
                            if x != y {
                                return false;
                            }
                        }
                        (None, None) => return true,
                        _ => return false,
                    }
                }
            }
            JsonType::Object => {
                if self.len() != other.len() {
                    return false;
                }
                self.iter_object()
                    .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
            }
        }
    }
}

fn string_bytes_of<'doc>(doc: &'doc Document, node: &Node) -> Option<&'doc [u8]> {
    match node.tag() {
        Tag::ShortString => node.short_string_bytes(),
        Tag::LongString => {
            let (_, at) = node.long_string_ref()?;
            Some(doc.arena.string_bytes(at))
        }
        _ => None,
    }
}

/// Iterator over an array's elements in input order.
pub struct ArrayIter<'doc> {
    doc: &'doc Document,
    next: Option<NodeRef>,
}

impl<'doc> Iterator for ArrayIter<'doc> {
    type Item = Value<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        if cur.is_null() {
            return None;
        }
        self.next = Some(self.doc.arena.node(cur).next_sibling());
        Some(Value::new(self.doc, cur))
    }
}

/// Iterator over an object's `(key, value)` members in input order.
pub struct ObjectIter<'doc> {
    doc: &'doc Document,
    next: Option<EntryRef>,
}

impl<'doc> Iterator for ObjectIter<'doc> {
    type Item = (&'doc str, Value<'doc>);

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        if cur.is_null() {
            return None;
        }
        let entry = self.doc.arena.entry(cur);
        self.next = Some(entry.next);
        let key = string_bytes_of(self.doc, &entry.key)
            .and_then(|b| std::str::from_utf8(b).ok())
            .unwrap_or("");
        Some((key, Value::new(self.doc, entry.value)))
    }
}

#[cfg(test)]
mod tests {
    use crate::document::parse;

    #[test]
    fn scalars_roundtrip_through_accessors() {
        let doc = parse(br#"[null, true, false, 42, 3.5, "hi"]"#).unwrap();
        let root = doc.root();
        assert!(root.is_array());
        assert_eq!(root.len(), 6);
        let items: Vec<_> = root.iter_array().collect();
        assert!(items[0].is_null());
        assert!(items[1].as_bool());
        assert!(!items[2].as_bool());
        assert_eq!(items[3].as_i64(), 42);
        assert_eq!(items[4].as_f64(), 3.5);
        assert_eq!(items[5].as_str(), "hi");
    }

    #[test]
    fn type_mismatch_accessors_return_defaults() {
        let doc = parse(b"null").unwrap();
        let v = doc.root();
        assert_eq!(v.as_i64(), 0);
        assert_eq!(v.as_f64(), 0.0);
        assert_eq!(v.as_str(), "");
        assert!(!v.as_bool());
        assert_eq!(v.len(), 0);
        assert!(v.get("x").is_none());
        assert!(v.get_index(0).is_none());
    }

    #[test]
    fn object_lookup_by_key() {
        let doc = parse(br#"{"name":"John","age":30}"#).unwrap();
        let root = doc.root();
        assert_eq!(root.len(), 2);
        assert_eq!(root.get("name").unwrap().as_str(), "John");
        assert_eq!(root.get("age").unwrap().as_i64(), 30);
        assert!(root.get("missing").is_none());
        assert!(root.has_key("name"));
    }

    #[test]
    fn structural_equality_ignores_object_key_order() {
        let a = parse(br#"{"a":1,"b":2}"#).unwrap();
        let b = parse(br#"{"b":2,"a":1}"#).unwrap();
        assert!(a.root() == b.root());
    }

    #[test]
    fn structural_equality_distinguishes_int_and_float() {
        let a = parse(b"1").unwrap();
        let b = parse(b"1.0").unwrap();
        assert!(a.root() != b.root());
    }

    #[test]
    fn structural_equality_arrays_are_order_sensitive() {
        let a = parse(b"[1,2]").unwrap();
        let b = parse(b"[2,1]").unwrap();
        assert!(a.root() != b.root());
    }

    #[test]
    fn clone_via_reserialize_is_structurally_equal() {
        let doc = parse(br#"{"a":[1,2,3],"b":null}"#).unwrap();
        let cloned = doc.root().to_owned_document().unwrap();
        assert!(doc.root() == cloned.root());
    }
}
