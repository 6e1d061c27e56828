//! The 24-byte tagged value node.
//!
//! Every parsed JSON value materializes as one `Node`: a 4-bit type tag plus
//! a 60-bit inline payload in the first word, and two further polymorphic
//! words whose meaning depends on the tag. This mirrors the bit-packing
//! idiom of a NaN-boxed value (tag in a fixed bit range, payload
//! masked/shifted out of the rest) but widened from a single 8-byte box to
//! three words, since a JSON array/object child pointer and a 64-bit float
//! cannot both fit in the 4 spare bits NaN-boxing usually exploits.

use crate::arena::{EntryRef, NodeRef, StringRef};

/// Values narrower than this many bytes, with no escape sequences, are
/// stored inline in the node itself rather than in the string arena.
pub const SHORT_STRING_MAX: usize = 7;

const TAG_MASK: u8 = 0x0F;
const SHORT_LEN_SHIFT: u8 = 4;
const SHORT_LEN_MASK: u8 = 0x07;

/// 60-bit signed integer range a `Node::Int` can hold without falling back
/// to `Float`.
pub const MAX_INLINE_INT: i64 = (1i64 << 59) - 1;
pub const MIN_INLINE_INT: i64 = -(1i64 << 59);
const PAYLOAD_BITS: u32 = 60;
const PAYLOAD_MASK: u64 = (1u64 << PAYLOAD_BITS) - 1;
const SIGN_BIT: u64 = 1u64 << (PAYLOAD_BITS - 1);

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Null = 0,
    False = 1,
    True = 2,
    Int = 3,
    Float = 4,
    ShortString = 5,
    LongString = 6,
    Array = 7,
    Object = 8,
}

impl Tag {
    fn from_raw(b: u8) -> Tag {
        match b {
            0 => Tag::Null,
            1 => Tag::False,
            2 => Tag::True,
            3 => Tag::Int,
            4 => Tag::Float,
            5 => Tag::ShortString,
            6 => Tag::LongString,
            7 => Tag::Array,
            8 => Tag::Object,
            other => panic!("corrupt node tag byte: {other}"),
        }
    }

    pub fn is_string(self) -> bool {
        matches!(self, Tag::ShortString | Tag::LongString)
    }
}

/// The public, collapsed-tag view callers reason about: `ShortString` and
/// `LongString` are a single `String` type to anyone outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl From<Tag> for JsonType {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Null => JsonType::Null,
            Tag::False | Tag::True => JsonType::Bool,
            Tag::Int => JsonType::Int,
            Tag::Float => JsonType::Float,
            Tag::ShortString | Tag::LongString => JsonType::String,
            Tag::Array => JsonType::Array,
            Tag::Object => JsonType::Object,
        }
    }
}

/// The fixed 24-byte value node: `word0` carries the tag and (for most
/// tags) an inline payload; `word1` and `word2` are polymorphic per tag.
///
/// `word0` is kept as a raw byte array rather than a `u64` so that the
/// short-string layout (tag nibble + 3-bit length in byte 0, up to 7
/// content bytes in bytes 1..8) can borrow directly out of it without an
/// endianness-dependent reinterpretation of the struct.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct Node {
    word0: [u8; 8],
    word1: u64,
    word2: u64,
}

const _: () = assert!(std::mem::size_of::<Node>() == 24, "Node must be 24 bytes");
const _: () = assert!(std::mem::align_of::<Node>() <= 8);

impl Node {
    fn with_tag(tag: Tag) -> Self {
        let mut word0 = [0u8; 8];
        word0[0] = tag as u8;
        Node {
            word0,
            word1: 0,
            word2: 0,
        }
    }

    pub fn null() -> Self {
        Node::with_tag(Tag::Null)
    }

    pub fn bool(value: bool) -> Self {
        Node::with_tag(if value { Tag::True } else { Tag::False })
    }

    fn payload(&self) -> u64 {
        u64::from_le_bytes(self.word0) >> 4
    }

    fn set_payload(&mut self, payload: u64) {
        let tag_byte = self.word0[0] & TAG_MASK;
        let packed = (payload << 4) | tag_byte as u64;
        self.word0 = packed.to_le_bytes();
    }

    pub fn tag(&self) -> Tag {
        Tag::from_raw(self.word0[0] & TAG_MASK)
    }

    pub fn json_type(&self) -> JsonType {
        self.tag().into()
    }

    /// Construct an `Int` node. Caller must have already confirmed `value`
    /// fits in `MIN_INLINE_INT..=MAX_INLINE_INT`; values outside that range
    /// are represented as `Float` instead (see `parser::parse_number`).
    pub fn int(value: i64) -> Self {
        let mut node = Node::with_tag(Tag::Int);
        node.set_payload((value as u64) & PAYLOAD_MASK);
        node
    }

    pub fn as_int(&self) -> Option<i64> {
        if self.tag() != Tag::Int {
            return None;
        }
        let raw = self.payload();
        let signed = if raw & SIGN_BIT != 0 {
            (raw | !PAYLOAD_MASK) as i64
        } else {
            raw as i64
        };
        Some(signed)
    }

    pub fn float(value: f64) -> Self {
        let mut node = Node::with_tag(Tag::Float);
        node.word2 = value.to_bits();
        node
    }

    pub fn as_float(&self) -> Option<f64> {
        (self.tag() == Tag::Float).then(|| f64::from_bits(self.word2))
    }

    /// `bytes.len()` must be `<= SHORT_STRING_MAX`.
    pub fn short_string(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= SHORT_STRING_MAX);
        let mut node = Node::with_tag(Tag::ShortString);
        node.word0[0] |= (bytes.len() as u8) << SHORT_LEN_SHIFT;
        node.word0[1..1 + bytes.len()].copy_from_slice(bytes);
        node
    }

    pub fn short_string_bytes(&self) -> Option<&[u8]> {
        if self.tag() != Tag::ShortString {
            return None;
        }
        let len = ((self.word0[0] >> SHORT_LEN_SHIFT) & SHORT_LEN_MASK) as usize;
        Some(&self.word0[1..1 + len])
    }

    pub fn long_string(len: usize, at: StringRef) -> Self {
        let mut node = Node::with_tag(Tag::LongString);
        node.set_payload(len as u64);
        node.word2 = at.offset as u64;
        node
    }

    pub fn long_string_ref(&self) -> Option<(usize, StringRef)> {
        if self.tag() != Tag::LongString {
            return None;
        }
        let len = self.payload() as usize;
        Some((
            len,
            StringRef {
                offset: self.word2 as u32,
                len: len as u32,
            },
        ))
    }

    pub fn array(first_child: NodeRef) -> Self {
        let mut node = Node::with_tag(Tag::Array);
        node.word2 = first_child.0 as u64;
        node
    }

    pub fn object(first_entry: EntryRef) -> Self {
        let mut node = Node::with_tag(Tag::Object);
        node.word2 = first_entry.0 as u64;
        node
    }

    pub fn array_first_child(&self) -> Option<NodeRef> {
        (self.tag() == Tag::Array).then(|| NodeRef(self.word2 as u32))
    }

    pub fn object_first_entry(&self) -> Option<EntryRef> {
        (self.tag() == Tag::Object).then(|| EntryRef(self.word2 as u32))
    }

    /// Patches an already-allocated `Array` node's first-child reference.
    /// Used by the parser, which allocates the container node before its
    /// first element exists.
    pub fn set_array_first_child(&mut self, first: NodeRef) {
        debug_assert_eq!(self.tag(), Tag::Array);
        self.word2 = first.0 as u64;
    }

    /// Patches an already-allocated `Object` node's first-entry reference.
    pub fn set_object_first_entry(&mut self, first: EntryRef) {
        debug_assert_eq!(self.tag(), Tag::Object);
        self.word2 = first.0 as u64;
    }

    pub fn next_sibling(&self) -> NodeRef {
        NodeRef(self.word1 as u32)
    }

    pub fn set_next_sibling(&mut self, next: NodeRef) {
        self.word1 = next.0 as u64;
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tag() {
            Tag::Null => write!(f, "Node::Null"),
            Tag::False => write!(f, "Node::Bool(false)"),
            Tag::True => write!(f, "Node::Bool(true)"),
            Tag::Int => write!(f, "Node::Int({})", self.as_int().unwrap()),
            Tag::Float => write!(f, "Node::Float({})", self.as_float().unwrap()),
            Tag::ShortString => write!(
                f,
                "Node::ShortString({:?})",
                String::from_utf8_lossy(self.short_string_bytes().unwrap())
            ),
            Tag::LongString => {
                let (len, at) = self.long_string_ref().unwrap();
                write!(f, "Node::LongString(len={len}, offset={})", at.offset)
            }
            Tag::Array => write!(f, "Node::Array(first={:?})", self.array_first_child()),
            Tag::Object => write!(f, "Node::Object(first={:?})", self.object_first_entry()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_is_24_bytes() {
        assert_eq!(std::mem::size_of::<Node>(), 24);
    }

    #[test]
    fn null_and_bool_roundtrip() {
        assert_eq!(Node::null().tag(), Tag::Null);
        assert_eq!(Node::bool(true).tag(), Tag::True);
        assert_eq!(Node::bool(false).tag(), Tag::False);
        assert_eq!(Node::bool(true).json_type(), JsonType::Bool);
    }

    #[test]
    fn int_roundtrip_positive_and_negative() {
        for v in [0i64, 1, -1, 42, -42, MAX_INLINE_INT, MIN_INLINE_INT] {
            let node = Node::int(v);
            assert_eq!(node.tag(), Tag::Int);
            assert_eq!(node.as_int(), Some(v));
        }
    }

    #[test]
    fn float_roundtrip() {
        for v in [0.0, 1.5, -1.5, f64::MIN_POSITIVE, 1e300, -1e-300] {
            let node = Node::float(v);
            assert_eq!(node.as_float(), Some(v));
        }
    }

    #[test]
    fn short_string_roundtrip() {
        let node = Node::short_string(b"hello");
        assert_eq!(node.tag(), Tag::ShortString);
        assert_eq!(node.short_string_bytes(), Some(&b"hello"[..]));
    }

    #[test]
    fn short_string_boundary_seven_bytes() {
        let node = Node::short_string(b"1234567");
        assert_eq!(node.short_string_bytes(), Some(&b"1234567"[..]));
    }

    #[test]
    fn short_string_empty() {
        let node = Node::short_string(b"");
        assert_eq!(node.short_string_bytes(), Some(&b""[..]));
    }

    #[test]
    fn long_string_stores_length_and_offset() {
        let node = Node::long_string(42, StringRef { offset: 100, len: 42 });
        let (len, at) = node.long_string_ref().unwrap();
        assert_eq!(len, 42);
        assert_eq!(at.offset, 100);
    }

    #[test]
    fn array_and_object_child_refs() {
        let arr = Node::array(NodeRef(7));
        assert_eq!(arr.array_first_child(), Some(NodeRef(7)));
        let obj = Node::object(EntryRef(3));
        assert_eq!(obj.object_first_entry(), Some(EntryRef(3)));
    }

    #[test]
    fn sibling_chain() {
        let mut node = Node::int(1);
        assert_eq!(node.next_sibling(), NodeRef(0));
        node.set_next_sibling(NodeRef(9));
        assert_eq!(node.next_sibling(), NodeRef(9));
    }

    #[test]
    fn wrong_tag_accessors_return_none() {
        let node = Node::int(5);
        assert_eq!(node.as_float(), None);
        assert_eq!(node.short_string_bytes(), None);
        assert_eq!(node.long_string_ref(), None);
        assert_eq!(node.array_first_child(), None);
        assert_eq!(node.object_first_entry(), None);
    }
}
