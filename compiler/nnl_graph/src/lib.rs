//! Graph store for compiled NNL code.
//!
//! The lowering compiler renders NNL source into a persistent graph: every
//! literal, variable, statement and code block is a node, wired to its
//! operands through typed links and ordered cluster children. The execution
//! engine walks this graph directly.
//!
//! This crate provides the store contract the compiler relies on:
//!
//! - create nodes of a given kind, create and query typed links
//! - find the clusters that contain a set of nodes under a given meaning
//! - find all nodes linking into a node with a given relation
//! - delete unreferenced nodes
//! - two-phase allocation: [`GraphStore::reserve`] a slot, then finalize or
//!   discard it once its content is known
//!
//! # Concurrency
//!
//! The store is shared between compilation units and the runtime. All state
//! sits behind one `RwLock`; every operation takes `&self` and locks
//! internally, so no caller can assume exclusive access between two calls.

mod error;
mod id;
mod instruction;
mod kind;
mod store;

pub use error::GraphError;
pub use id::GraphId;
pub use instruction::Instruction;
pub use kind::{BoolOperator, LoopStyle, NodeKind, Relation, StaticKey, WellKnown};
pub use store::{GraphNode, GraphStore, SharedGraph};
