//! Index-addressed growable storage for a document's nodes, long-string
//! bytes, and object entries.
//!
//! A node reference is an index rather than a pointer: growing the backing
//! `Vec` relocates its elements, and an index survives that relocation
//! while a raw pointer would not. Index `0` in the node and entry arenas is
//! reserved as a permanent null sentinel, so sibling/child/entry fields can
//! use `0` to mean "no reference" without colliding with a real value at
//! index 0.
//!
//! Growth goes through `try_grow`, which doubles capacity via
//! `Vec::try_reserve` rather than the infallible `Vec::reserve`/`push`
//! path: an allocation failure surfaces as `None` from `allocate_value`/
//! `allocate_entry`/`allocate_string` instead of aborting the process, so
//! the parser can turn it into `ErrorCode::Memory`.

use crate::node::Node;

/// Initial capacity, in nodes, of a fresh document's node arena: 64 KiB
/// worth of 24-byte nodes, rounded down.
const INITIAL_NODE_CAPACITY: usize = 64 * 1024 / std::mem::size_of::<Node>();
/// Initial capacity, in bytes, of a fresh document's long-string region.
const INITIAL_STRING_CAPACITY: usize = 16 * 1024;

/// Reference to a `Node` in a `Document`'s node arena. Valid only for the
/// `Document` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub(crate) u32);

impl NodeRef {
    pub const NULL: NodeRef = NodeRef(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Reference to an `Entry` in a `Document`'s entry arena (object members).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryRef(pub(crate) u32);

impl EntryRef {
    pub const NULL: EntryRef = EntryRef(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A span of bytes in a `Document`'s string arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRef {
    pub(crate) offset: u32,
    pub(crate) len: u32,
}

/// An object member: `key` is a string-tagged `Node` (reusing the exact
/// encoding any string value uses), `value` points at the member's value,
/// and `next` chains to the next member in input order.
///
/// This is the dedicated key/value record chosen over overloading a key
/// node's child slot (see DESIGN.md, "Object key/value representation").
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub key: Node,
    pub value: NodeRef,
    pub next: EntryRef,
}

/// Grows `vec`'s capacity, doubling until it can hold `additional` more
/// elements, without ever panicking or aborting on allocation failure.
/// Mirrors the spec's "growth doubles the region until the request fits;
/// on out-of-memory, `allocate_*` returns a sentinel" contract using
/// `Vec::try_reserve` in place of a hand-rolled `realloc`/`aligned_alloc`
/// loop. Returns `false` if no amount of doubling can satisfy the request
/// (allocator failure, or `additional` itself overflowing `usize`).
fn try_grow<T>(vec: &mut Vec<T>, additional: usize) -> bool {
    if vec.capacity() - vec.len() >= additional {
        return true;
    }
    let mut target = vec.capacity().max(1);
    while target - vec.len() < additional {
        match target.checked_mul(2) {
            Some(doubled) => target = doubled,
            None => return false,
        }
    }
    vec.try_reserve(target - vec.capacity()).is_ok()
}

/// Owns the three growable regions a `Document` allocates from while
/// parsing: value nodes, long-string bytes, and object entries.
pub struct Arena {
    nodes: Vec<Node>,
    strings: Vec<u8>,
    entries: Vec<Entry>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Arena::with_capacity(INITIAL_NODE_CAPACITY, INITIAL_STRING_CAPACITY)
    }

    pub fn with_capacity(node_capacity: usize, string_capacity: usize) -> Self {
        let node_capacity = node_capacity.max(1);
        let mut nodes = Vec::with_capacity(node_capacity);
        // Index 0 is the null sentinel; never dereferenced as a real node.
        nodes.push(Node::null());
        let mut entries = Vec::with_capacity(4);
        entries.push(Entry {
            key: Node::null(),
            value: NodeRef::NULL,
            next: EntryRef::NULL,
        });
        Arena {
            nodes,
            strings: Vec::with_capacity(string_capacity),
            entries,
        }
    }

    /// Allocates a node, growing the node region first if needed. Returns
    /// `None` (the "no node" sentinel the spec's `allocate_value` contract
    /// calls for) if growth fails to find enough memory, rather than
    /// aborting the process.
    pub fn allocate_value(&mut self, node: Node) -> Option<NodeRef> {
        if !try_grow(&mut self.nodes, 1) {
            return None;
        }
        let idx = self.nodes.len() as u32;
        self.nodes.push(node);
        Some(NodeRef(idx))
    }

    pub fn allocate_entry(&mut self, entry: Entry) -> Option<EntryRef> {
        if !try_grow(&mut self.entries, 1) {
            return None;
        }
        let idx = self.entries.len() as u32;
        self.entries.push(entry);
        Some(EntryRef(idx))
    }

    /// Allocates `bytes.len()` bytes from the string region, growing it
    /// first if needed. Returns `None` on allocation failure.
    pub fn allocate_string(&mut self, bytes: &[u8]) -> Option<StringRef> {
        if !try_grow(&mut self.strings, bytes.len()) {
            return None;
        }
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(bytes);
        Some(StringRef {
            offset,
            len: bytes.len() as u32,
        })
    }

    pub fn node(&self, at: NodeRef) -> &Node {
        &self.nodes[at.0 as usize]
    }

    pub fn node_mut(&mut self, at: NodeRef) -> &mut Node {
        &mut self.nodes[at.0 as usize]
    }

    pub fn entry(&self, at: EntryRef) -> &Entry {
        &self.entries[at.0 as usize]
    }

    pub fn entry_mut(&mut self, at: EntryRef) -> &mut Entry {
        &mut self.entries[at.0 as usize]
    }

    pub fn string_bytes(&self, at: StringRef) -> &[u8] {
        let start = at.offset as usize;
        let end = start + at.len as usize;
        &self.strings[start..end]
    }

    /// Number of nodes allocated, excluding the reserved null sentinel.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Total bytes currently held across the node, string, and entry
    /// regions. Used for the document's `memory_usage()` accessor.
    pub fn bytes_allocated(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
            + self.strings.capacity()
            + self.entries.capacity() * std::mem::size_of::<Entry>()
    }
}
