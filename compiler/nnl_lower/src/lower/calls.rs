//! Function calls.
//!
//! Arguments are pushed on the runtime's value stack last to first, so the
//! callee pops them back in declaration order. A call's result travels in
//! the well-known `ReturnValue` slot. Inline functions skip the stack: their
//! parameters are assigned directly and their body is spliced in place.

use nnl_diagnostic::ErrorCode;
use nnl_graph::{GraphId, Instruction};
use nnl_ir::{AstKind, NodeId, UnaryOp};

use crate::context::RenderFlags;
use crate::resolve::Resolved;
use crate::ModuleCompiler;

/// What a call expression calls.
enum Callee {
    /// A function declared in this module.
    Declared { decl: NodeId, node: GraphId },
    /// A node from the static table or a binding; its signature is unknown.
    External(GraphId),
}

impl ModuleCompiler<'_> {
    pub(crate) fn lower_call(
        &mut self,
        id: NodeId,
        callee: NodeId,
        args: &[NodeId],
        blocked: bool,
    ) -> GraphId {
        if !self.flags.contains(RenderFlags::CALLS_ALLOWED) {
            return self.error(
                ErrorCode::E3005,
                id,
                "function calls are not allowed in a case condition",
            );
        }
        let Some(target) = self.callee(id, callee) else {
            return self.empty();
        };

        let node = match target {
            Callee::Declared { decl, node } => {
                let AstKind::Function {
                    name,
                    params,
                    inline,
                    ..
                } = *self.ast.kind(decl)
                else {
                    return self.error(ErrorCode::E9001, id, "callee is not a function");
                };
                let params = self.parameters(params);
                if params.len() != args.len() {
                    return self.error(
                        ErrorCode::E2003,
                        id,
                        format!(
                            "`{}` expects {} argument{}, found {}",
                            self.name_str(name),
                            params.len(),
                            if params.len() == 1 { "" } else { "s" },
                            args.len()
                        ),
                    );
                }
                if inline {
                    return self.lower_inline_call(decl, &params, args);
                }
                node
            }
            Callee::External(node) => node,
        };

        self.with_flags(RenderFlags::ARGUMENTS, RenderFlags::CONDITION_BRANCH, |this| {
            for &arg in args.iter().rev() {
                let value = if this.type_of(arg).has_value() {
                    this.render(arg)
                } else {
                    this.no_value(arg, "argument")
                };
                let push = this.intern_statement(Instruction::PushValue, &[value]);
                this.emit(push);
            }
        });

        let instruction = if blocked {
            Instruction::BlockedCall
        } else {
            Instruction::Call
        };
        let call = self.intern_statement(instruction, &[node]);
        self.emit(call);
        self.return_value()
    }

    fn callee(&mut self, id: NodeId, callee: NodeId) -> Option<Callee> {
        if !callee.is_valid() {
            self.error(ErrorCode::E1003, id, "call without a callee");
            return None;
        }
        match *self.ast.kind(callee) {
            AstKind::Ref(name) => match self.resolve_ref(callee, name) {
                Some(Resolved::Decl(decl)) => {
                    if let AstKind::Function { .. } = self.ast.kind(decl) {
                        let node = self.render(decl);
                        Some(Callee::Declared { decl, node })
                    } else {
                        self.error(
                            ErrorCode::E1003,
                            callee,
                            format!("`{}` is not a function", self.name_str(name)),
                        );
                        None
                    }
                }
                Some(Resolved::Static(node)) => {
                    self.module.register_used(node);
                    Some(Callee::External(node))
                }
                None => {
                    self.error(
                        ErrorCode::E1001,
                        callee,
                        format!("unknown function `{}`", self.name_str(name)),
                    );
                    None
                }
            },
            AstKind::Path { .. }
            | AstKind::Unary {
                op: UnaryOp::BindingRead(_),
                ..
            } => {
                let node = self.render(callee);
                (node != self.empty()).then_some(Callee::External(node))
            }
            other => {
                self.error(
                    ErrorCode::E1003,
                    callee,
                    format!("a {} can't be called", other.describe()),
                );
                None
            }
        }
    }

    /// Parameter declarations of a function's parameter list.
    pub(crate) fn parameters(&self, params: NodeId) -> Vec<NodeId> {
        if !params.is_valid() {
            return Vec::new();
        }
        match *self.ast.kind(params) {
            AstKind::CodeList { items, .. } => self.ast.get_list(items).to_vec(),
            _ => vec![params],
        }
    }

    /// Splice an inline function's body into the current target.
    ///
    /// A `return` inside the body exits the caller's frame.
    fn lower_inline_call(&mut self, decl: NodeId, params: &[NodeId], args: &[NodeId]) -> GraphId {
        tracing::trace!(?decl, "inline call");
        for (&param, &arg) in params.iter().zip(args) {
            let var = self.declare_variable(param);
            if !self.type_of(arg).has_value() {
                self.no_value(arg, "argument");
                continue;
            }
            let value = self.render(arg);
            let assign = self.intern_assignment(var, value);
            self.emit(assign);
        }
        let AstKind::Function { body, returns, .. } = *self.ast.kind(decl) else {
            return self.empty();
        };
        let statements = self.body_items(body);
        self.with_flags(
            RenderFlags::CALLS_ALLOWED,
            RenderFlags::CONDITION_BRANCH | RenderFlags::ARGUMENTS,
            |this| {
                for statement in statements {
                    this.render_statement(statement);
                }
            },
        );
        if returns.is_empty() {
            self.empty()
        } else {
            self.return_value()
        }
    }

    /// Statements of a body: the items of a code list, or the node itself.
    pub(crate) fn body_items(&self, body: NodeId) -> Vec<NodeId> {
        if !body.is_valid() {
            return Vec::new();
        }
        match *self.ast.kind(body) {
            AstKind::CodeList { items, .. } => self.ast.get_list(items).to_vec(),
            _ => vec![body],
        }
    }
}
