//! Unary and binary operators, assignments.

use nnl_diagnostic::ErrorCode;
use nnl_graph::{BoolOperator, GraphId, Instruction, NodeKind, Relation, StaticKey, WellKnown};
use nnl_ir::{AstKind, BinaryOp, NodeId, TypeDecl, UnaryOp};

use crate::context::RenderFlags;
use crate::render::ensure_sufficient_stack;
use crate::resolve::Resolved;
use crate::types::{arithmetic_instruction, arithmetic_type, minus_instruction};
use crate::ModuleCompiler;

/// Graph operator for a comparison, containment or logical operator.
fn bool_operator(op: BinaryOp) -> Option<BoolOperator> {
    Some(match op {
        BinaryOp::Eq => BoolOperator::Equal,
        BinaryOp::NotEq => BoolOperator::Different,
        BinaryOp::Lt => BoolOperator::Smaller,
        BinaryOp::LtEq => BoolOperator::SmallerOrEqual,
        BinaryOp::Gt => BoolOperator::Bigger,
        BinaryOp::GtEq => BoolOperator::BiggerOrEqual,
        BinaryOp::Contains => BoolOperator::Contains,
        BinaryOp::NotContains => BoolOperator::NotContains,
        BinaryOp::And => BoolOperator::And,
        BinaryOp::Or => BoolOperator::Or,
        _ => return None,
    })
}

impl ModuleCompiler<'_> {
    pub(crate) fn lower_unary(&mut self, id: NodeId, op: UnaryOp, operand: NodeId) -> GraphId {
        match op {
            UnaryOp::Negate => {
                let ty = self.type_of(operand);
                if !ty.has_value() {
                    return self.no_value(operand, "operand of `-`");
                }
                let value = self.render(operand);
                self.intern_result_statement(minus_instruction(ty), &[value])
            }
            UnaryOp::Not => {
                if !self.type_of(operand).has_value() {
                    return self.no_value(operand, "operand of `!`");
                }
                let value = self.render(operand);
                self.intern_result_statement(Instruction::Not, &[value])
            }
            UnaryOp::ByRef => {
                if !self.flags.contains(RenderFlags::ARGUMENTS) {
                    return self.error(
                        ErrorCode::E3006,
                        id,
                        "`ref` is only allowed on function call arguments",
                    );
                }
                let value = self.assign_target(operand);
                if value == self.empty() {
                    return value;
                }
                self.intern_linked(NodeKind::ByRef, &[(Relation::Value, value)])
            }
            UnaryOp::BindingRead(kind) => self.lower_binding_read(id, kind, operand),
            UnaryOp::Increment => self.lower_step(operand, BinaryOp::Add),
            UnaryOp::Decrement => self.lower_step(operand, BinaryOp::Sub),
        }
    }

    /// `x++` / `x--`: `x = x ± 1`.
    fn lower_step(&mut self, operand: NodeId, op: BinaryOp) -> GraphId {
        let target = self.assign_target(operand);
        if target == self.empty() {
            return target;
        }
        let ty = arithmetic_type(op, self.type_of(operand), TypeDecl::Int);
        let Some(instruction) = arithmetic_instruction(op, ty) else {
            return self.error(ErrorCode::E9001, operand, "no instruction for step operator");
        };
        let one = self.literal(StaticKey::Int(1));
        let value = self.intern_result_statement(instruction, &[target, one]);
        self.intern_assignment(target, value)
    }

    pub(crate) fn lower_binary(
        &mut self,
        id: NodeId,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> GraphId {
        match op {
            BinaryOp::Assign => self.lower_assignment(left, right),
            _ if op.is_assignment() => self.lower_compound_assignment(op, left, right),
            _ if op.is_arithmetic() => self.lower_arithmetic(id, op, left, right),
            _ if op.is_logical() => self.lower_logical(id, op, left, right),
            _ => self.lower_comparison(op, left, right),
        }
    }

    /// Graph node a value can be stored into: a declared variable or a
    /// binding. Anything else is reported.
    pub(crate) fn assign_target(&mut self, node: NodeId) -> GraphId {
        if !node.is_valid() {
            return self.error(ErrorCode::E3001, node, "assignment without a left part");
        }
        match *self.ast.kind(node) {
            AstKind::Ref(name) => {
                let assignable = match self.resolve_ref(node, name) {
                    Some(Resolved::Decl(decl)) => {
                        matches!(self.ast.kind(decl), AstKind::VarDecl { .. })
                    }
                    Some(Resolved::Static(found)) => {
                        matches!(self.graph.kind(found), Some(NodeKind::Variable { .. }))
                    }
                    // Reported as unknown by `render`.
                    None => true,
                };
                if assignable {
                    self.render(node)
                } else {
                    self.error(
                        ErrorCode::E3002,
                        node,
                        format!("`{}` can't be assigned to", self.name_str(name)),
                    )
                }
            }
            AstKind::VarDecl { .. } => self.declare_variable(node),
            AstKind::Path { .. }
            | AstKind::Unary {
                op: UnaryOp::BindingRead(_),
                ..
            } => self.render(node),
            other => self.error(
                ErrorCode::E3002,
                node,
                format!("a {} can't be assigned to", other.describe()),
            ),
        }
    }

    fn lower_assignment(&mut self, left: NodeId, right: NodeId) -> GraphId {
        let target = self.assign_target(left);
        if !self.type_of(right).has_value() {
            return self.no_value(right, "right side of the assignment");
        }
        let value = self.render(right);
        if target == self.empty() {
            return target;
        }
        self.intern_assignment(target, value)
    }

    /// `x op= e` becomes `x = x op e`.
    fn lower_compound_assignment(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> GraphId {
        let instruction = match op.compound_operator() {
            Some(base) => {
                let ty = arithmetic_type(base, self.type_of(left), self.type_of(right));
                arithmetic_instruction(base, ty)
            }
            None if op == BinaryOp::AndAssign => Some(Instruction::Intersect),
            None if op == BinaryOp::OrAssign => Some(Instruction::Union),
            None => None,
        };
        let Some(instruction) = instruction else {
            return self.error(ErrorCode::E9001, left, "unsupported compound assignment");
        };
        let target = self.assign_target(left);
        if !self.type_of(right).has_value() {
            return self.no_value(right, "right side of the assignment");
        }
        let value = self.render(right);
        if target == self.empty() {
            return target;
        }
        let combined = self.intern_result_statement(instruction, &[target, value]);
        self.intern_assignment(target, combined)
    }

    fn lower_arithmetic(&mut self, id: NodeId, op: BinaryOp, left: NodeId, right: NodeId) -> GraphId {
        let l = self.type_of(left);
        let r = self.type_of(right);
        if !l.has_value() {
            return self.no_value(left, "left operand");
        }
        if !r.has_value() {
            return self.no_value(right, "right operand");
        }
        let Some(instruction) = arithmetic_instruction(op, arithmetic_type(op, l, r)) else {
            return self.error(ErrorCode::E9001, id, "no instruction for arithmetic operator");
        };
        let (l, r) = self.render_operands(left, right);
        self.intern_result_statement(instruction, &[l, r])
    }

    pub(crate) fn lower_comparison(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> GraphId {
        let Some(operator) = bool_operator(op) else {
            return self.error(ErrorCode::E9001, left, "not a boolean operator");
        };
        let (l, r) = self.render_operands(left, right);
        let operator = self.sentinel(WellKnown::Operator(operator));
        self.intern_linked(
            NodeKind::BoolExpression,
            &[
                (Relation::LeftPart, l),
                (Relation::Operator, operator),
                (Relation::RightPart, r),
            ],
        )
    }

    /// Render both operands of a binary operator.
    ///
    /// When both contain calls, the second call's result would overwrite the
    /// first in the shared return slot: the right operand is evaluated first,
    /// saved on the value stack and popped back as the right operand.
    pub(crate) fn render_operands(&mut self, left: NodeId, right: NodeId) -> (GraphId, GraphId) {
        if self.has_call(left) && self.has_call(right) {
            let r = self.render(right);
            let push = self.intern_statement(Instruction::PushValue, &[r]);
            self.emit(push);
            let l = self.render(left);
            let r = self.pop_value();
            (l, r)
        } else {
            let l = self.render(left);
            let r = self.render(right);
            (l, r)
        }
    }

    /// Whether evaluating `node` runs a function call.
    pub(crate) fn has_call(&self, node: NodeId) -> bool {
        if !node.is_valid() {
            return false;
        }
        match self.ast.kind(node) {
            AstKind::Call { .. } => true,
            // Bodies are not evaluated where they are declared.
            AstKind::Function { .. } | AstKind::Class { .. } => false,
            _ => ensure_sufficient_stack(|| {
                self.ast.children(node).into_iter().any(|c| self.has_call(c))
            }),
        }
    }

    /// Report an expression used as a value that doesn't produce one.
    pub(crate) fn no_value(&mut self, node: NodeId, what: &str) -> GraphId {
        self.error(
            ErrorCode::E2002,
            node,
            format!("{what} doesn't return a value"),
        )
    }
}
