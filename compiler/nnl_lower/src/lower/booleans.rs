//! Short-circuit lowering of `&&` and `||`.
//!
//! Without calls in either operand a connective is a plain interned
//! `BoolExpression`. With calls, the chain is unrolled into jumps: each
//! connective tests its left value and, when that value already decides the
//! whole chain, jumps to a statement that returns the constant outcome.
//!
//! For `a() && b() || c()` the accumulated code is
//!
//! ```text
//! 0  a()
//! 1  JumpIfFalse(a, +3)       -> 4: the `&&` failed, try the `||` operand
//! 2  b()
//! 3  JumpIfTrue(b, +4)        -> 7: the `||` is true
//! 4  c()
//! 5  ReturnValue(c)
//! 6  Jump(+2)                 -> 8: end
//! 7  ReturnValue(True)
//! ```
//!
//! The outermost connective of a chain owns an accumulation target on the
//! rendering stack; nested connectives of the same chain find it there.
//! Anything that pushes its own target in between (a call argument, a
//! function body) starts a new chain.

use nnl_diagnostic::ErrorCode;
use nnl_graph::{GraphId, Instruction, NodeKind, StaticKey, WellKnown};
use nnl_ir::{AstKind, BinaryOp, DeclScope, NodeId, TypeDecl};

use crate::context::{ExtraItems, JumpPoint, RenderFlags, TargetKind};
use crate::module::Role;
use crate::ModuleCompiler;

impl ModuleCompiler<'_> {
    pub(crate) fn lower_logical(
        &mut self,
        id: NodeId,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> GraphId {
        if !self.has_call(left) && !self.has_call(right) {
            return self.lower_comparison(op, left, right);
        }

        // Value of the whole chain once this connective short-circuits.
        let constant = op == BinaryOp::Or;
        let root = !self.continues_chain(id);
        if root {
            tracing::debug!(?id, "short-circuit chain");
            self.push_target(TargetKind::BoolAccumulator);
        }
        let mark = self.jumps.len();

        let l = self.render(left);
        let instruction = if constant {
            Instruction::JumpIfTrue
        } else {
            Instruction::JumpIfFalse
        };
        self.open_jump(instruction, l, constant);

        // Jumps out of the left operand that did not decide the chain resume
        // at the right operand.
        let resume = self.target_len();
        let ours = self.jumps.len() - 1;
        let undecided = self.take_jumps(mark, ours, |jump| jump.constant != constant);
        for jump in undecided {
            self.close_jump(jump, resume);
        }

        let r = self.render(right);
        if root {
            self.finish_chain(id, mark, r)
        } else {
            r
        }
    }

    /// Whether `id` is an inner connective of a chain being accumulated.
    fn continues_chain(&self, id: NodeId) -> bool {
        self.top_kind() == TargetKind::BoolAccumulator
            && matches!(
                self.ast.kind(self.ast.parent(id)),
                AstKind::Binary {
                    op: BinaryOp::And | BinaryOp::Or,
                    ..
                }
            )
    }

    /// Emit the chain's result statements, close its remaining jumps and
    /// hand the accumulated code to the enclosing target.
    fn finish_chain(&mut self, id: NodeId, mark: usize, value: GraphId) -> GraphId {
        let slot = if self.flags.contains(RenderFlags::CONDITION_BRANCH) && !self.branches.is_empty()
        {
            Some(self.bool_result_variable())
        } else {
            None
        };

        let open = self.take_jumps(mark, self.jumps.len(), |_| true);
        let constants: Vec<bool> = [false, true]
            .into_iter()
            .filter(|k| open.iter().any(|j| j.constant == *k))
            .collect();

        let result = self.chain_result(slot, value);
        self.emit(result);
        // Skip over the constant results.
        let end = self.target_len() + constants.len() + 1;
        let jump_index = self.target_len();
        let offset = self.jump_offset(jump_index, end);
        let target = self.literal(StaticKey::JumpTarget(offset));
        let jump = self.intern_statement(Instruction::Jump, &[target]);
        self.emit(jump);

        for constant in constants {
            let destination = self.target_len();
            let sentinel = self.sentinel(if constant {
                WellKnown::True
            } else {
                WellKnown::False
            });
            let result = self.chain_result(slot, sentinel);
            self.emit(result);
            for jump in open.iter().filter(|j| j.constant == constant) {
                self.close_jump(*jump, destination);
            }
        }

        let items = self.pop_target();
        self.extras[id.index()] = ExtraItems::from_slice(&items);
        self.emit_all(&items);

        match slot {
            Some(var) => {
                if let Some(branch) = self.branches.last_mut() {
                    branch.bool_result = Some(var);
                }
                var
            }
            None => self.return_value(),
        }
    }

    /// `ReturnValue(v)`, or `BoolResult = v` inside a condition.
    fn chain_result(&mut self, slot: Option<GraphId>, value: GraphId) -> GraphId {
        match slot {
            Some(var) => self.intern_assignment(var, value),
            None => self.intern_statement(Instruction::ReturnValue, &[value]),
        }
    }

    /// Reserve the current target's next slot for a jump whose destination
    /// is not known yet.
    fn open_jump(&mut self, instruction: Instruction, condition: GraphId, constant: bool) {
        let placeholder = self.graph.reserve();
        let index = self.target_len();
        self.emit(placeholder);
        self.jumps.push(JumpPoint {
            placeholder,
            index,
            instruction,
            condition,
            constant,
        });
    }

    /// Remove and return the jumps in `mark..end` matching `pred`.
    fn take_jumps(
        &mut self,
        mark: usize,
        end: usize,
        pred: impl Fn(&JumpPoint) -> bool,
    ) -> Vec<JumpPoint> {
        let mut taken = Vec::new();
        let mut index = mark;
        let mut end = end.min(self.jumps.len());
        while index < end {
            if pred(&self.jumps[index]) {
                taken.push(self.jumps.remove(index));
                end -= 1;
            } else {
                index += 1;
            }
        }
        taken
    }

    /// Replace a jump's placeholder with the finished jump statement.
    fn close_jump(&mut self, jump: JumpPoint, destination: usize) {
        let offset = self.jump_offset(jump.index, destination);
        let target = self.literal(StaticKey::JumpTarget(offset));
        let statement = if jump.condition.is_valid() {
            self.intern_statement(jump.instruction, &[jump.condition, target])
        } else {
            self.intern_statement(jump.instruction, &[target])
        };
        tracing::trace!(from = jump.index, to = destination, "jump closed");
        self.set_target_item(jump.index, statement);
        if let Err(err) = self.graph.discard(jump.placeholder) {
            self.graph_error(err);
        }
    }

    fn jump_offset(&mut self, from: usize, to: usize) -> i32 {
        let offset = i64::try_from(to).unwrap_or(i64::MAX) - i64::try_from(from).unwrap_or(0);
        i32::try_from(offset).unwrap_or_else(|_| {
            self.error(
                ErrorCode::E9001,
                self.current,
                "jump distance out of range",
            );
            0
        })
    }

    /// The module's variable receiving short-circuit results inside
    /// conditions.
    pub(crate) fn bool_result_variable(&mut self) -> GraphId {
        let name = self.config.bool_result_name.clone();
        self.role_variable(Role::BoolResult, &name, TypeDecl::Bool)
    }

    /// The module's variable holding a restructured conditional's branch.
    pub(crate) fn case_selector_variable(&mut self) -> GraphId {
        let name = self.config.case_selector_name.clone();
        self.role_variable(Role::CaseSelector, &name, TypeDecl::Int)
    }

    fn role_variable(&mut self, role: Role, name: &str, ty: TypeDecl) -> GraphId {
        if let Some(existing) = self.module.role(role).filter(|id| self.graph.exists(*id)) {
            self.module.register_used(existing);
            return existing;
        }
        let kind = NodeKind::Variable {
            scope: DeclScope::Var,
            ty,
        };
        let id = match self.graph.create_linked(kind, &[]) {
            Ok(id) => id,
            Err(err) => return self.graph_error(err),
        };
        let name = self.interner.intern(name);
        if let Err(err) = self.graph.set_name(id, Some(name)) {
            return self.graph_error(err);
        }
        tracing::debug!(?role, ?id, "module variable created");
        self.note_created(id);
        self.module.set_role(role, id);
        id
    }
}
