use std::fmt;

use crate::arena::{zeroed, RecordArena, RECORD_BYTES};
use crate::config::Config;
use crate::error::{Error, Result, Violation};
use crate::record::{Back, Leaf, LeafId, Node, NodeId, Record, RecordId, Tag};
use crate::tracing_helpers::{error_log, trace_log};

/// Memory usage statistics for a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Live records, root included
    pub records: usize,
    /// Live Root and Node records
    pub nodes: usize,
    /// Live Leaf records
    pub leaves: usize,
    /// Bytes held by leaf value buffers
    pub value_bytes: usize,
    /// Bytes charged against the memory limit
    pub bytes_in_use: usize,
    /// Bytes reserved by the arena, used or not
    pub capacity_bytes: usize,
}

/// An in-memory, path-addressed key-value store.
///
/// The tree is a line of path [`Node`]s hanging from a root, each node owning at most one
/// child node and one chain of key/value [`Leaf`] records. Every record lives in an arena
/// and is addressed by a [`NodeId`] or [`LeafId`]; ids of released records go stale.
///
/// Mutation takes `&mut self` and there is no internal locking, so a tree must not be
/// shared between threads for writing.
pub struct PathTree {
    pub(crate) arena: RecordArena,
    pub(crate) root: NodeId,
}

impl PathTree {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut arena = RecordArena::new(config.initial_capacity, config.memory_limit);
        let root = NodeId(arena.insert(Record::Root(Node::zeroed())));
        Self { arena, root }
    }

    /// The root node. It has no parent and an empty path segment.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live records, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.live()
    }

    /// True when nothing but the root is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.live() <= 1
    }

    #[inline]
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.arena.get(id)
    }

    #[inline]
    pub fn tag(&self, id: RecordId) -> Option<Tag> {
        self.arena.get(id).map(Record::tag)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)?.as_node()
    }

    #[inline]
    pub fn leaf(&self, id: LeafId) -> Option<&Leaf> {
        self.arena.get(id.0)?.as_leaf()
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0)?.as_node_mut()
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: LeafId) -> Option<&mut Leaf> {
        self.arena.get_mut(id.0)?.as_leaf_mut()
    }

    /// Creates a node for `segment` and makes it the child of `parent`.
    ///
    /// A node holds a single child link. Any previous child of `parent` is replaced, and
    /// its whole subtree is released; ids into it go stale.
    ///
    /// Segments longer than [`PATH_CAPACITY`](crate::PATH_CAPACITY) bytes are truncated.
    pub fn create_node(&mut self, parent: NodeId, segment: &[u8]) -> Result<NodeId> {
        if self.node(parent).is_none() {
            return Err(Error::InvalidParent(parent.0));
        }
        self.arena.reserve_slot()?;

        let mut node = Node::zeroed();
        node.parent = Some(parent);
        node.leaves_head = None;
        if node.path.copy_from(segment) {
            trace_log!(len = segment.len(), "path segment truncated");
        }

        let id = NodeId(self.arena.insert(Record::Node(node)));
        let replaced = self
            .node_mut(parent)
            .and_then(|parent| parent.child.replace(id));
        trace_log!(node = ?id, parent = ?parent, "created node");

        if let Some(old) = replaced {
            self.release_replaced(parent, old);
        }
        Ok(id)
    }

    /// Appends a key/value leaf to the end of `owner`'s chain and returns it.
    ///
    /// Keys are not checked for uniqueness. Keys longer than
    /// [`KEY_CAPACITY`](crate::KEY_CAPACITY) bytes are truncated. On any error the chain
    /// is left exactly as it was.
    pub fn create_leaf(&mut self, owner: NodeId, key: &[u8], value: &[u8]) -> Result<LeafId> {
        if self.node(owner).is_none() {
            return Err(Error::InvalidOwner(owner.0));
        }
        let tail = self.find_tail(owner)?;

        self.arena.reserve_slot()?;
        self.arena.check_limit(RECORD_BYTES + value.len())?;
        let mut buffer = zeroed(value.len())?;
        buffer.copy_from_slice(value);

        let mut leaf = Leaf::zeroed();
        leaf.next = None;
        leaf.back = Some(match tail {
            Some(prev) => Back::Leaf(prev),
            None => Back::Node(owner),
        });
        if leaf.key.copy_from(key) {
            trace_log!(len = key.len(), "leaf key truncated");
        }
        leaf.value = buffer;

        let id = LeafId(self.arena.insert(Record::Leaf(leaf)));
        match tail {
            Some(prev) => {
                if let Some(prev) = self.leaf_mut(prev) {
                    prev.next = Some(id);
                }
            }
            None => {
                if let Some(owner) = self.node_mut(owner) {
                    owner.leaves_head = Some(id);
                }
            }
        }
        trace_log!(leaf = ?id, owner = ?owner, size = value.len(), "created leaf");

        Ok(id)
    }

    /// The last leaf of `node`'s chain, or `None` when the chain is empty.
    pub fn find_tail(&self, node: NodeId) -> Result<Option<LeafId>> {
        let mut tail = None;
        for leaf in self.leaves(node)? {
            let (id, _) = leaf?;
            tail = Some(id);
        }
        Ok(tail)
    }

    /// The first leaf of `node`'s chain whose stored key equals `key`.
    ///
    /// `key` is compared in the truncated form it would be stored in.
    pub fn find_leaf(&self, node: NodeId, key: &[u8]) -> Result<Option<LeafId>> {
        for leaf in self.leaves(node)? {
            let (id, leaf) = leaf?;
            if leaf.key.matches(key) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    pub fn chain_len(&self, node: NodeId) -> Result<usize> {
        self.leaves(node)?
            .try_fold(0, |len, leaf| leaf.map(|_| len + 1))
    }

    /// Walks `node`'s chain from head to tail.
    pub fn leaves(&self, node: NodeId) -> Result<Leaves<'_>> {
        let owner = self.node(node).ok_or(Error::InvalidOwner(node.0))?;
        Ok(Leaves {
            tree: self,
            expected_back: Back::Node(node),
            next: owner.leaves_head,
        })
    }

    /// Path segments from just below the root down to `node`.
    ///
    /// Follows parent lookups only. The root yields an empty path.
    pub fn path_of(&self, node: NodeId) -> Result<Vec<&[u8]>> {
        let mut current = self.node(node).ok_or(Error::InvalidOwner(node.0))?;
        let mut current_id = node;
        let mut segments = Vec::new();

        while let Some(parent_id) = current.parent {
            // A path can never be longer than the number of live records.
            if segments.len() >= self.arena.live() {
                return Err(self.violation(Violation::ParentCycle { node: node.0 }));
            }
            let parent = match self.node(parent_id) {
                Some(parent) if parent.child == Some(current_id) => parent,
                _ => {
                    return Err(self.violation(Violation::BrokenParentLink {
                        parent: parent_id.0,
                        child: current_id.0,
                    }))
                }
            };
            segments.push(current.path_segment());
            current = parent;
            current_id = parent_id;
        }

        segments.reverse();
        Ok(segments)
    }

    pub fn memory_usage(&self) -> MemoryStats {
        let leaves = self
            .arena
            .iter()
            .filter(|(_, record)| record.tag() == Tag::Leaf)
            .count();
        MemoryStats {
            records: self.arena.live(),
            nodes: self.arena.live() - leaves,
            leaves,
            value_bytes: self.arena.value_bytes(),
            bytes_in_use: self.arena.bytes_in_use(),
            capacity_bytes: self.arena.capacity_bytes(),
        }
    }

    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
    }

    pub(crate) fn violation(&self, violation: Violation) -> Error {
        error_log!(%violation, "structural invariant broken");
        Error::StructuralViolation(violation)
    }
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PathTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTree")
            .field("root", &self.root)
            .field("records", &self.arena.live())
            .finish()
    }
}

/// Iterator over a node's leaf chain, head to tail.
///
/// Every step checks the link it follows. A broken link is yielded once as
/// [`Error::StructuralViolation`] and the iterator ends.
pub struct Leaves<'a> {
    tree: &'a PathTree,
    expected_back: Back,
    next: Option<LeafId>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = Result<(LeafId, &'a Leaf)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;

        let Some(leaf) = self.tree.leaf(id) else {
            return Some(Err(self.tree.violation(Violation::DanglingLink {
                from: self.expected_back.record(),
                to: id.0,
            })));
        };
        // A back reference that names exactly the previous step also rules out cycles.
        if leaf.back != Some(self.expected_back) {
            return Some(Err(self.tree.violation(Violation::BrokenBackLink {
                leaf: id.0,
                expected: self.expected_back.record(),
            })));
        }

        self.expected_back = Back::Leaf(id);
        self.next = leaf.next;
        Some(Ok((id, leaf)))
    }
}
