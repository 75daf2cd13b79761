//! Records: the tagged union every vertex of the graph is stored as.
//!
//! A [`Record`] is either the root, an interior [`Node`] (one path segment) or a [`Leaf`]
//! (one key/value pair). Links between records are ids into the record arena:
//!
//! - owning edges: `Node::child`, `Node::leaves_head`, `Leaf::next`
//! - lookups only: `Node::parent`, `Leaf::back`
//!
//! Only owning edges are ever followed when records are released.

use std::fmt;

use crate::bounded::{Key, PathSegment};

/// Discriminant of a [`Record`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Root = 1,
    Node = 2,
    Leaf = 3,
}

/// Generation-checked address of a record slot.
///
/// An id goes stale as soon as the record it names is released; looking it up afterwards
/// finds nothing, even if the slot has been reused. A slot whose generation runs out is
/// retired for good, so generations never wrap.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    index: u32,
    generation: u32,
}

impl RecordId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Id of a Root or Node record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) RecordId);

/// Id of a Leaf record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LeafId(pub(crate) RecordId);

impl NodeId {
    #[inline]
    pub fn record(self) -> RecordId {
        self.0
    }
}

impl LeafId {
    #[inline]
    pub fn record(self) -> RecordId {
        self.0
    }
}

/// Where a leaf's back reference points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Back {
    /// The leaf is the head of this node's chain.
    Node(NodeId),
    /// The leaf follows this one in the chain.
    Leaf(LeafId),
}

impl Back {
    #[inline]
    pub fn record(self) -> RecordId {
        match self {
            Back::Node(id) => id.0,
            Back::Leaf(id) => id.0,
        }
    }
}

/// One path segment of the hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) child: Option<NodeId>,
    pub(crate) leaves_head: Option<LeafId>,
    pub(crate) path: PathSegment,
}

impl Node {
    /// A node with every link absent and an empty path.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// The owning node; `None` only for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    #[inline]
    pub fn leaves_head(&self) -> Option<LeafId> {
        self.leaves_head
    }

    #[inline]
    pub fn path_segment(&self) -> &[u8] {
        self.path.as_bytes()
    }

    #[inline]
    pub fn path_field(&self) -> &PathSegment {
        &self.path
    }
}

/// One key/value pair in a node's chain.
#[derive(Clone, PartialEq, Eq)]
pub struct Leaf {
    pub(crate) back: Option<Back>,
    pub(crate) next: Option<LeafId>,
    pub(crate) key: Key,
    pub(crate) value: Box<[u8]>,
}

impl Leaf {
    /// A leaf with no links, an empty key and an empty value.
    pub fn zeroed() -> Self {
        Self {
            back: None,
            next: None,
            key: Key::zeroed(),
            value: Box::default(),
        }
    }

    /// The owning node for a chain head, otherwise the previous leaf.
    ///
    /// Always present once the leaf is linked into a chain.
    #[inline]
    pub fn back(&self) -> Option<Back> {
        self.back
    }

    #[inline]
    pub fn next(&self) -> Option<LeafId> {
        self.next
    }

    #[inline]
    pub fn key(&self) -> &[u8] {
        self.key.as_bytes()
    }

    #[inline]
    pub fn key_field(&self) -> &Key {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Length of the value buffer.
    #[inline]
    pub fn size(&self) -> usize {
        self.value.len()
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("back", &self.back)
            .field("next", &self.next)
            .field("key", &self.key)
            .field("size", &self.size())
            .finish()
    }
}

/// A vertex of the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Root(Node),
    Node(Node),
    Leaf(Leaf),
}

impl Record {
    #[inline]
    pub fn tag(&self) -> Tag {
        match self {
            Record::Root(_) => Tag::Root,
            Record::Node(_) => Tag::Node,
            Record::Leaf(_) => Tag::Leaf,
        }
    }

    /// The node payload of a Root or Node record.
    #[inline]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Record::Root(node) | Record::Node(node) => Some(node),
            Record::Leaf(_) => None,
        }
    }

    #[inline]
    pub(crate) fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Record::Root(node) | Record::Node(node) => Some(node),
            Record::Leaf(_) => None,
        }
    }

    #[inline]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Record::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Record::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}
