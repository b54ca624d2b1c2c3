//! NNL Lower - lowering of the NNL AST into the execution graph.
//!
//! Every construct of a module becomes a structure of graph nodes: literals
//! and symbols map to shared value nodes, expressions to statement and
//! result-statement nodes, blocks to ordered `Code` clusters, functions to
//! named clusters. Before creating anything the compiler searches the graph
//! for an identical node and reuses it, so recompiling an unchanged module
//! against the same [`Module`] record creates nothing new.
//!
//! # Pipeline
//!
//! ```text
//! AstArena --(resolve + type_of)--> ModuleCompiler::render --> GraphStore
//!                                          |
//!                                          +--> DiagnosticQueue
//! ```
//!
//! A [`ModuleCompiler`] is request-scoped: it borrows the AST, the shared
//! [`GraphStore`] and the persistent [`Module`] record for one pass.
//! [`compile_module`] is the one-call entry point.

mod config;
mod context;
mod intern;
mod lower;
mod module;
mod render;
mod resolve;
mod types;

#[cfg(test)]
mod test_helpers;

pub use config::LowerConfig;
pub use context::ModuleCompiler;
pub use module::{DeclKey, Module, Role};
pub use resolve::{BindingResolver, StaticBindings};
pub use types::{arithmetic_instruction, arithmetic_type, minus_instruction};

use std::sync::Once;

use nnl_diagnostic::{Diagnostic, ErrorCode};
use nnl_graph::{GraphId, GraphStore};
use nnl_ir::{AstArena, NodeId, StringInterner};

/// Outcome of lowering one module.
#[derive(Clone, Debug)]
pub struct LowerResult {
    /// Graph node the module root rendered to.
    pub root: GraphId,
    /// Errors and warnings, sorted by position.
    pub diagnostics: Vec<Diagnostic>,
    /// Nodes this pass added to the graph.
    pub created: usize,
}

impl LowerResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Lower the module rooted at `root` into `graph`.
///
/// The module record is updated in place: its registry maps every
/// declaration to its graph node, so a later call with the same record
/// reuses them.
pub fn compile_module(
    ast: &AstArena,
    root: NodeId,
    module: &mut Module,
    graph: &GraphStore,
    interner: &StringInterner,
    config: &LowerConfig,
    bindings: &dyn BindingResolver,
) -> LowerResult {
    let _span = tracing::debug_span!("compile_module", module = interner.lookup(module.name()))
        .entered();
    let mut compiler = ModuleCompiler::new(ast, graph, interner, module, config, bindings);
    let root = compiler.compile_root(root);
    compiler.finish(root)
}

impl ModuleCompiler<'_> {
    /// Render the module root and record it in the module.
    pub fn compile_root(&mut self, root: NodeId) -> GraphId {
        let result = self.render(root);
        self.module.register_externally_referenced(result);
        self.module.set_root(result);
        result
    }

    /// End the pass: report jumps that were never closed, drop declarations
    /// the source no longer has and hand out the collected diagnostics.
    pub fn finish(mut self, root: GraphId) -> LowerResult {
        let open = std::mem::take(&mut self.jumps);
        for jump in open {
            self.error(
                ErrorCode::E9002,
                NodeId::INVALID,
                "short-circuit jump was never given a destination",
            );
            if let Err(err) = self.graph.discard(jump.placeholder) {
                self.graph_error(err);
            }
        }
        let declared = std::mem::take(&mut self.declared);
        for stale in self.module.retain_declarations(|key| declared.contains(key)) {
            tracing::trace!(?stale, "declaration removed");
            if let Err(err) = self.graph.release(stale) {
                self.graph_error(err);
            }
        }
        tracing::debug!(
            created = self.created,
            errors = self.diagnostics.error_count(),
            "lowering done"
        );
        LowerResult {
            root,
            diagnostics: self.diagnostics.flush(),
            created: self.created,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and only the first call has an
/// effect. Safe to call from every test and every embedding program.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    });
}
