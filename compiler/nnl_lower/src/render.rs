//! The rendering driver.
//!
//! Every AST node renders at most once per pass. Its state goes
//! `Unrendered -> InProgress -> Done`; while in progress, references to the
//! node resolve to a placeholder so self-referential structures (a function
//! calling itself) terminate. Functions and classes install a reserved graph
//! slot as that placeholder; other nodes cannot be reached recursively and
//! use the `Empty` sentinel.

use nnl_graph::GraphId;
use nnl_ir::NodeId;

use crate::context::{ExtraItems, RenderState, TargetKind};
use crate::ModuleCompiler;

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Grow the stack before recursing into deeply nested expressions.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

impl ModuleCompiler<'_> {
    /// Render `id` and return the graph node representing its value.
    ///
    /// Statements produced on the way are appended to the current rendering
    /// target. Rendering a node again returns the memoized result without
    /// emitting anything.
    pub fn render(&mut self, id: NodeId) -> GraphId {
        if !id.is_valid() {
            return self.empty();
        }
        match self.states[id.index()] {
            RenderState::Done(done) | RenderState::InProgress(done) => return done,
            RenderState::Unrendered => {}
        }
        self.states[id.index()] = RenderState::InProgress(self.empty());

        let saved = std::mem::replace(&mut self.current, id);
        let result = ensure_sufficient_stack(|| self.dispatch(id));
        self.current = saved;

        self.states[id.index()] = RenderState::Done(result);
        result
    }

    /// Render `id` as a statement of the current target: its extra items
    /// first, then its value if the engine can execute it.
    ///
    /// A statement rendered before replays its recorded extra items, so one
    /// body can be spliced into several places.
    pub(crate) fn render_statement(&mut self, id: NodeId) -> GraphId {
        if !id.is_valid() {
            return self.empty();
        }
        let value = if let RenderState::Unrendered = self.states[id.index()] {
            self.push_target(TargetKind::Statements);
            let value = self.render(id);
            let items = self.pop_target();
            self.extras[id.index()] = ExtraItems::from_vec(items);
            value
        } else {
            self.render(id)
        };
        let extras = self.extras[id.index()].clone();
        self.emit_all(&extras);
        if self.is_executable(value) {
            self.emit(value);
        }
        value
    }

    /// Render a sequence of statements into a fresh target and return it.
    pub(crate) fn lower_statements(&mut self, items: &[NodeId]) -> Vec<GraphId> {
        self.push_target(TargetKind::Statements);
        for &item in items {
            self.render_statement(item);
        }
        self.pop_target()
    }
}
