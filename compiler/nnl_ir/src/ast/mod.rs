//! Flat AST for NNL.
//!
//! Nodes live in an [`AstArena`] and refer to each other through [`NodeId`]
//! indices and [`NodeRange`]s into a flat list table. The parent of every
//! node is recorded as a back-reference by [`AstArena::finish`], which is
//! what scope lookup walks during lowering.
//!
//! The arena is produced by the parser (not part of this workspace) or by
//! hand through [`AstBuilder`].

mod arena;
mod build;
mod kind;
mod operators;

pub use arena::{Ancestors, AstArena};
pub use build::AstBuilder;
pub use kind::AstKind;
pub use operators::{
    BinaryOp, BindingKind, CodeListMode, ConditionalStyle, DeclScope, QueryStyle, SplitReaction,
    UnaryOp,
};

use std::fmt;

use crate::Span;

/// Index into an [`AstArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for "no node" (no initializer, no condition, no parent).
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
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

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Contiguous range of node ids in the arena's list table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRange {
    pub start: u32,
    pub len: u16,
}

impl NodeRange {
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u16) -> Self {
        Self { start, len }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for NodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NodeRange({}..{})",
            self.start,
            self.start + u32::from(self.len)
        )
    }
}

/// Contiguous range in the arena's type table (function return values).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRange {
    pub start: u32,
    pub len: u16,
}

impl TypeRange {
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

/// A node reconstructed from the arena's parallel arrays.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct AstNode {
    pub kind: AstKind,
    pub span: Span,
    pub parent: NodeId,
}
