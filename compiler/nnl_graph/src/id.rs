//! Graph node identifiers.

use std::fmt;

/// Stable identifier of a node in a [`GraphStore`](crate::GraphStore).
///
/// Ids are never reused: a deleted node leaves a hole in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct GraphId(u32);

impl GraphId {
    /// Sentinel value indicating "no node".
    pub const INVALID: GraphId = GraphId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        GraphId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#INVALID")
        }
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::INVALID
    }
}
