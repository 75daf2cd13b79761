//! Fixed-capacity byte fields for path segments and keys.

use std::fmt;

/// Storage size of a node's path segment field, terminator included.
pub const PATH_FIELD_SIZE: usize = 256;

/// Storage size of a leaf's key field, terminator included.
pub const KEY_FIELD_SIZE: usize = 128;

/// Maximum number of content bytes a path segment keeps.
pub const PATH_CAPACITY: usize = PATH_FIELD_SIZE - 1;

/// Maximum number of content bytes a key keeps.
pub const KEY_CAPACITY: usize = KEY_FIELD_SIZE - 1;

/// A byte field of `N` bytes holding at most `N - 1` content bytes.
///
/// Content is followed by at least one zero byte, and the length is stored explicitly,
/// so interior zero bytes survive a copy.
#[derive(Clone, PartialEq, Eq)]
pub struct Bounded<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> Bounded<N> {
    pub const CAPACITY: usize = N - 1;

    /// An empty, all-zero field.
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Overwrites the field with `input`, keeping at most [`Self::CAPACITY`] bytes.
    ///
    /// Returns `true` when `input` was truncated.
    pub fn copy_from(&mut self, input: &[u8]) -> bool {
        let len = input.len().min(Self::CAPACITY);
        self.bytes[..len].copy_from_slice(&input[..len]);
        self.bytes[len..].fill(0);
        self.len = len;
        len < input.len()
    }

    pub fn from_bytes(input: &[u8]) -> Self {
        let mut field = Self::zeroed();
        field.copy_from(input);
        field
    }

    /// The content bytes, without the terminator.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The whole field, content plus zero padding.
    #[inline]
    pub fn raw(&self) -> &[u8; N] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `other` would be stored as exactly this content.
    pub fn matches(&self, other: &[u8]) -> bool {
        let len = other.len().min(Self::CAPACITY);
        self.as_bytes() == &other[..len]
    }
}

impl<const N: usize> Default for Bounded<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> fmt::Debug for Bounded<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

pub type PathSegment = Bounded<PATH_FIELD_SIZE>;
pub type Key = Bounded<KEY_FIELD_SIZE>;
