//! Fixtures for lowering unit tests.
//!
//! A [`Fixture`] owns everything a pass borrows; a test builds an AST with
//! [`Fixture::builder`], then compiles it whole or drives a
//! [`ModuleCompiler`] directly.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use nnl_graph::{GraphId, GraphStore, Instruction, NodeKind, Relation};
use nnl_ir::{AstArena, AstBuilder, Name, NodeId, StringInterner};

use crate::{compile_module, LowerConfig, LowerResult, Module, ModuleCompiler, StaticBindings};

pub(crate) struct Fixture {
    pub(crate) interner: StringInterner,
    pub(crate) graph: GraphStore,
    pub(crate) module: Module,
    pub(crate) config: LowerConfig,
    pub(crate) bindings: StaticBindings,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        crate::init_tracing();
        let interner = StringInterner::new();
        let module = Module::new(interner.intern("test"));
        Fixture {
            interner,
            graph: GraphStore::new(),
            module,
            config: LowerConfig::default(),
            bindings: StaticBindings::new(),
        }
    }

    pub(crate) fn builder(&self) -> AstBuilder<'_> {
        AstBuilder::new(&self.interner, "test.nnl")
    }

    pub(crate) fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub(crate) fn compile(&mut self, ast: &AstArena, root: NodeId) -> LowerResult {
        compile_module(
            ast,
            root,
            &mut self.module,
            &self.graph,
            &self.interner,
            &self.config,
            &self.bindings,
        )
    }

    pub(crate) fn compiler<'a>(&'a mut self, ast: &'a AstArena) -> ModuleCompiler<'a> {
        ModuleCompiler::new(
            ast,
            &self.graph,
            &self.interner,
            &mut self.module,
            &self.config,
            &self.bindings,
        )
    }
}

/// Instruction a statement or result statement executes.
pub(crate) fn instruction_of(graph: &GraphStore, statement: GraphId) -> Option<Instruction> {
    match graph.kind(graph.link_target(statement, Relation::Instruction)?)? {
        NodeKind::Instruction(instruction) => Some(instruction),
        _ => None,
    }
}

/// Arguments of a statement or result statement.
pub(crate) fn args_of(graph: &GraphStore, statement: GraphId) -> Vec<GraphId> {
    graph
        .link_target(statement, Relation::Arguments)
        .map(|args| graph.children(args))
        .unwrap_or_default()
}

/// Statements of the `Code` cluster a node links to through `Statements`.
pub(crate) fn body_of(graph: &GraphStore, node: GraphId) -> Vec<GraphId> {
    graph
        .link_target(node, Relation::Statements)
        .map(|code| graph.children(code))
        .unwrap_or_default()
}
