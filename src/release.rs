//! Releasing records.
//!
//! Construction never frees anything on its own except a child it replaces. Everything
//! else is torn down here, by walking owning edges only: a node's child, its chain head,
//! and each leaf's successor. Parent and back references are never followed.

use crate::error::{Error, Result};
use crate::record::{LeafId, Node, NodeId, Record};
use crate::tracing_helpers::{debug_log, error_log};
use crate::tree::PathTree;

impl PathTree {
    /// Releases `node`'s child subtree, if any, and clears the link.
    ///
    /// Returns the number of records freed.
    pub fn release_child(&mut self, node: NodeId) -> Result<usize> {
        let child = self
            .node_mut(node)
            .ok_or(Error::InvalidParent(node.0))?
            .child
            .take();

        let freed = child.map_or(0, |child| self.free_subtree(child));
        debug_log!(node = ?node, freed, "released child subtree");
        Ok(freed)
    }

    /// Unlinks `node` from its parent and releases it with all its descendants and leaves.
    ///
    /// The root cannot be released; use [`PathTree::clear`] instead.
    pub fn release_subtree(&mut self, node: NodeId) -> Result<usize> {
        let parent = match self.arena.get(node.0) {
            Some(Record::Node(record)) => record.parent,
            _ => return Err(Error::InvalidParent(node.0)),
        };

        if let Some(parent) = parent.and_then(|parent| self.node_mut(parent)) {
            if parent.child == Some(node) {
                parent.child = None;
            }
        }

        let freed = self.free_subtree(node);
        debug_log!(node = ?node, freed, "released subtree");
        Ok(freed)
    }

    /// Drops every record and starts over with a fresh root.
    ///
    /// All ids handed out before, the old root's included, go stale.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn clear(&mut self) {
        let freed = self.arena.live();
        self.arena.reset();
        self.root = NodeId(self.arena.insert(Record::Root(Node::zeroed())));
        debug_log!(freed, "cleared tree");
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub(crate) fn release_replaced(&mut self, parent: NodeId, old: NodeId) {
        let freed = self.free_subtree(old);
        debug_log!(parent = ?parent, old = ?old, freed, "replaced child subtree");
    }

    /// Frees `top`, every node below it, and every leaf those nodes own.
    ///
    /// Stops at the first link that does not name a record of the expected kind.
    fn free_subtree(&mut self, top: NodeId) -> usize {
        let mut freed = 0;
        let mut next_node = Some(top);

        while let Some(id) = next_node.take() {
            if !matches!(self.arena.get(id.0), Some(Record::Node(_))) {
                error_log!(node = ?id, "owning link does not name a node");
                break;
            }
            let Some(Record::Node(node)) = self.arena.remove(id.0) else {
                break;
            };
            freed += 1;
            freed += self.free_chain(node.leaves_head);
            next_node = node.child;
        }

        freed
    }

    fn free_chain(&mut self, head: Option<LeafId>) -> usize {
        let mut freed = 0;
        let mut next_leaf = head;

        while let Some(id) = next_leaf.take() {
            if self.leaf(id).is_none() {
                error_log!(leaf = ?id, "owning link does not name a leaf");
                break;
            }
            match self.arena.remove(id.0) {
                Some(Record::Leaf(leaf)) => next_leaf = leaf.next,
                _ => break,
            }
            freed += 1;
        }

        freed
    }
}
