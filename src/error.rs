use thiserror::Error as ThisError;

use crate::record::RecordId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A broken structural invariant found while walking the graph.
///
/// These never come from bad caller input; they mean a prior bug corrupted the links.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Violation {
    #[error("link from {from:?} points at {to:?}, which is not a live leaf")]
    DanglingLink { from: RecordId, to: RecordId },

    #[error("leaf {leaf:?} has a back reference that does not name its predecessor {expected:?}")]
    BrokenBackLink { leaf: RecordId, expected: RecordId },

    #[error("child {child:?} does not point back to parent {parent:?}")]
    BrokenParentLink { parent: RecordId, child: RecordId },

    #[error("parent links above {node:?} never reach the root")]
    ParentCycle { node: RecordId },
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("out of memory: could not allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("invalid parent: {0:?} is not a live node")]
    InvalidParent(RecordId),

    #[error("invalid owner: {0:?} is not a live node")]
    InvalidOwner(RecordId),

    #[error("structural violation: {0}")]
    StructuralViolation(#[from] Violation),
}

impl Error {
    /// Whether the store should be considered corrupted.
    ///
    /// Only [`Error::OutOfMemory`] is transient; contract violations are the caller's bug
    /// but leave the store intact.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::StructuralViolation(_))
    }
}
