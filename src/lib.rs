//! # pathkv
//!
//! An in-memory, path-addressed key-value store.
//!
//! The store is a hierarchy of path-segment nodes hanging from a root. Each node owns at
//! most one child node (the next segment) and one chain of key/value leaves. Records live
//! in an arena and are addressed by generation-checked ids, so a stale id never resolves
//! to a record that replaced it.
//!
//! ## Example
//!
//! ```rust
//! use pathkv::PathTree;
//!
//! let mut tree = PathTree::new();
//! let users = tree.create_node(tree.root(), b"users").unwrap();
//! tree.create_leaf(users, b"alice", b"42").unwrap();
//! let bob = tree.create_leaf(users, b"bob", b"43").unwrap();
//!
//! assert_eq!(tree.find_tail(users).unwrap(), Some(bob));
//! let alice = tree.find_leaf(users, b"alice").unwrap().unwrap();
//! assert_eq!(tree.leaf(alice).unwrap().value(), b"42");
//! ```
//!
//! ## Ownership
//!
//! `child`, `leaves_head` and `next` links own what they point at. `parent` and `back`
//! links are lookups only. Records are freed by [`PathTree::release_child`],
//! [`PathTree::release_subtree`], [`PathTree::clear`], or when `create_node` replaces a
//! child.
//!
//! The tree is single-threaded: every mutation takes `&mut self` and nothing is locked.

#![deny(unsafe_code)]
#![warn(clippy::all)]

mod tracing_helpers;

pub mod arena;
pub mod bounded;
pub mod config;
pub mod error;
pub mod record;
mod release;
pub mod tree;

pub use arena::{zeroed, RECORD_BYTES};
pub use bounded::{Bounded, Key, PathSegment, KEY_CAPACITY, PATH_CAPACITY};
pub use config::Config;
pub use error::{Error, Result, Violation};
pub use record::{Back, Leaf, LeafId, Node, NodeId, Record, RecordId, Tag};
pub use tree::{Leaves, MemoryStats, PathTree};

#[cfg(test)]
mod proptests;
