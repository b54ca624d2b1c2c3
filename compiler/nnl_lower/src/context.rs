//! Per-compilation state: the module compiler context.
//!
//! [`ModuleCompiler`] owns everything a lowering pass mutates: the stack of
//! rendering targets, the jump-point and branch stacks, the render flags,
//! and the per-node memo tables. It is request-scoped; a new one is built
//! for every compilation unit.

use bitflags::bitflags;
use nnl_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use nnl_graph::{GraphError, GraphId, GraphStore, Instruction, WellKnown};
use nnl_ir::{AstArena, Name, NodeId, Span, StringInterner, TypeDecl};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::resolve::{BindingResolver, Resolved};
use crate::{DeclKey, LowerConfig, Module};

/// Graph nodes a node needs emitted before its own result.
pub(crate) type ExtraItems = SmallVec<[GraphId; 4]>;

bitflags! {
    /// What the node being rendered is part of.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub(crate) struct RenderFlags: u8 {
        /// Directly inside the condition of a conditional part or loop.
        const CONDITION_BRANCH = 1 << 0;
        /// Inside a call's argument list.
        const ARGUMENTS = 1 << 1;
        /// Function calls may be emitted.
        const CALLS_ALLOWED = 1 << 2;
    }
}

/// What a rendering target accumulates.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum TargetKind {
    /// Statements of a code block, or code emitted ahead of one statement.
    Statements,
    /// Code emitted while evaluating a short-circuit boolean chain.
    BoolAccumulator,
}

/// One entry of the rendering-to stack.
#[derive(Clone, Debug)]
pub(crate) struct RenderTarget {
    pub(crate) kind: TargetKind,
    pub(crate) items: Vec<GraphId>,
}

/// A conditional jump whose destination is not known yet.
///
/// The jump statement's slot in the accumulator holds `placeholder` until
/// the jump is closed.
#[derive(Copy, Clone, Debug)]
pub(crate) struct JumpPoint {
    pub(crate) placeholder: GraphId,
    /// Index of the slot in the accumulator.
    pub(crate) index: usize,
    pub(crate) instruction: Instruction,
    /// Value tested by a conditional jump; invalid for an unconditional one.
    pub(crate) condition: GraphId,
    /// Value the whole chain is known to have once the jump is taken.
    pub(crate) constant: bool,
}

/// Bookkeeping for one conditional part whose condition is being rendered.
#[derive(Copy, Clone, Debug)]
pub(crate) struct BranchInfo {
    pub(crate) part: usize,
    /// Set when a short-circuit boolean stored its result in the module's
    /// bool-result variable.
    pub(crate) bool_result: Option<GraphId>,
}

/// Render progress of one AST node.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum RenderState {
    Unrendered,
    /// Children are being rendered; references resolve to this placeholder.
    InProgress(GraphId),
    Done(GraphId),
}

/// State of one lowering pass over one module.
pub struct ModuleCompiler<'a> {
    pub(crate) ast: &'a AstArena,
    pub(crate) graph: &'a GraphStore,
    pub(crate) interner: &'a StringInterner,
    pub(crate) module: &'a mut Module,
    pub(crate) config: &'a LowerConfig,
    pub(crate) bindings: &'a dyn BindingResolver,
    pub(crate) diagnostics: DiagnosticQueue,

    // Per AST node, indexed by `NodeId`
    pub(crate) states: Vec<RenderState>,
    pub(crate) types: Vec<Option<TypeDecl>>,
    pub(crate) extras: Vec<ExtraItems>,

    pub(crate) variables: FxHashMap<NodeId, GraphId>,
    pub(crate) resolutions: FxHashMap<NodeId, Option<Resolved>>,
    /// Next declaration index per (owner, name), see [`crate::DeclKey`].
    pub(crate) decl_counters: FxHashMap<(Name, Name), u32>,
    /// Declarations registered by this pass.
    pub(crate) declared: FxHashSet<DeclKey>,

    pub(crate) targets: Vec<RenderTarget>,
    pub(crate) jumps: Vec<JumpPoint>,
    pub(crate) branches: Vec<BranchInfo>,
    pub(crate) flags: RenderFlags,
    /// Node being rendered, for internal error positions.
    pub(crate) current: NodeId,
    /// Nodes this pass added to the graph.
    pub(crate) created: usize,
}

impl<'a> ModuleCompiler<'a> {
    pub fn new(
        ast: &'a AstArena,
        graph: &'a GraphStore,
        interner: &'a StringInterner,
        module: &'a mut Module,
        config: &'a LowerConfig,
        bindings: &'a dyn BindingResolver,
    ) -> Self {
        let len = ast.len();
        module.begin_pass();
        ModuleCompiler {
            ast,
            graph,
            interner,
            module,
            config,
            bindings,
            diagnostics: DiagnosticQueue::with_config(config.diagnostic_config()),
            states: vec![RenderState::Unrendered; len],
            types: vec![None; len],
            extras: vec![ExtraItems::new(); len],
            variables: FxHashMap::default(),
            resolutions: FxHashMap::default(),
            decl_counters: FxHashMap::default(),
            declared: FxHashSet::default(),
            targets: vec![RenderTarget {
                kind: TargetKind::Statements,
                items: Vec::new(),
            }],
            jumps: Vec::new(),
            branches: Vec::new(),
            flags: RenderFlags::CALLS_ALLOWED,
            current: NodeId::INVALID,
            created: 0,
        }
    }

    /// Number of graph nodes created so far.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Extra items recorded for `id` by its last render.
    pub fn extra_items(&self, id: NodeId) -> &[GraphId] {
        self.extras.get(id.index()).map_or(&[], |e| e.as_slice())
    }

    // Rendering targets

    pub(crate) fn push_target(&mut self, kind: TargetKind) {
        self.targets.push(RenderTarget {
            kind,
            items: Vec::new(),
        });
    }

    /// Pop the top target and return what it accumulated.
    pub(crate) fn pop_target(&mut self) -> Vec<GraphId> {
        // The bottom target belongs to the pass itself and is never popped.
        if self.targets.len() > 1 {
            self.targets.pop().map(|t| t.items).unwrap_or_default()
        } else {
            self.targets
                .last_mut()
                .map(|t| std::mem::take(&mut t.items))
                .unwrap_or_default()
        }
    }

    pub(crate) fn top_kind(&self) -> TargetKind {
        self.targets.last().map_or(TargetKind::Statements, |t| t.kind)
    }

    /// Append to the current target.
    pub(crate) fn emit(&mut self, item: GraphId) {
        if let Some(target) = self.targets.last_mut() {
            target.items.push(item);
        }
    }

    pub(crate) fn emit_all(&mut self, items: &[GraphId]) {
        if let Some(target) = self.targets.last_mut() {
            target.items.extend_from_slice(items);
        }
    }

    /// Number of items in the current target.
    pub(crate) fn target_len(&self) -> usize {
        self.targets.last().map_or(0, |t| t.items.len())
    }

    /// Replace an item of the current target.
    pub(crate) fn set_target_item(&mut self, index: usize, item: GraphId) {
        if let Some(slot) = self
            .targets
            .last_mut()
            .and_then(|t| t.items.get_mut(index))
        {
            *slot = item;
        }
    }

    /// Run `f` with the given flags inserted and removed, restoring them after.
    pub(crate) fn with_flags<R>(
        &mut self,
        insert: RenderFlags,
        remove: RenderFlags,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.flags;
        self.flags.insert(insert);
        self.flags.remove(remove);
        let result = f(self);
        self.flags = saved;
        result
    }

    // Well-known nodes

    pub(crate) fn empty(&self) -> GraphId {
        self.graph.well_known(WellKnown::Empty)
    }

    pub(crate) fn return_value(&self) -> GraphId {
        self.graph.well_known(WellKnown::ReturnValue)
    }

    pub(crate) fn is_executable(&self, id: GraphId) -> bool {
        self.graph.kind(id).is_some_and(nnl_graph::NodeKind::is_executable)
    }

    // Diagnostics

    pub(crate) fn span_of(&self, node: NodeId) -> Span {
        if node.is_valid() {
            self.ast.span(node)
        } else if self.current.is_valid() {
            self.ast.span(self.current)
        } else {
            Span::DUMMY
        }
    }

    /// Report an error at `node` and return the sentinel that replaces it.
    #[cold]
    pub(crate) fn error(
        &mut self,
        code: ErrorCode,
        node: NodeId,
        message: impl Into<String>,
    ) -> GraphId {
        let span = self.span_of(node);
        let message = message.into();
        tracing::debug!(%code, %message, at = %span.start, "lowering error");
        let diag = Diagnostic::error(code)
            .in_file(self.ast.file())
            .with_message(message)
            .with_label(span, code.description());
        self.diagnostics.add(diag);
        self.empty()
    }

    /// Report misuse of the graph store at the node being rendered.
    #[cold]
    pub(crate) fn graph_error(&mut self, err: GraphError) -> GraphId {
        self.error(
            ErrorCode::E9001,
            self.current,
            format!("graph store rejected an operation: {err}"),
        )
    }

    pub(crate) fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }
}
