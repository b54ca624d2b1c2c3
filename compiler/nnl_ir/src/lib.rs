//! NNL IR - front-end data structures for the NNL compiler.
//!
//! This crate contains the data the lowering compiler reads:
//! - Source positions and spans for diagnostics
//! - Names for interned identifiers
//! - The `TypeDecl` lattice used by type inference
//! - The flat AST (`AstArena`, `NodeId`, `AstKind`)
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No Box<Node>, use NodeId(u32) indices
//! - **Back-references are indices**: a node's parent is a `NodeId`, never owned
//!
//! Types that contain floats store them as u64 bits for Hash compatibility.

pub mod ast;
mod interner;
mod name;
mod span;
mod type_decl;

pub use ast::{
    AstArena, AstBuilder, AstKind, AstNode, BinaryOp, BindingKind, CodeListMode,
    ConditionalStyle, DeclScope, NodeId, NodeRange, QueryStyle, SplitReaction, TypeRange, UnaryOp,
};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::{Pos, Span};
pub use type_decl::TypeDecl;
