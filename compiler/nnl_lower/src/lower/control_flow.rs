//! Conditionals and loops.
//!
//! Every conditional construct becomes a `ConditionalStatement` tagged with
//! a loop style. Its `Condition` cluster holds one `ConditionalExpression`
//! per part, each linking an optional condition value and a `Code` body.
//!
//! A condition can only be tested directly when evaluating it emits no
//! code. When some part's condition needs code ahead of it (a call, a
//! short-circuit chain), the statement is restructured: the conditions are
//! evaluated up front into a nested if/else that stores the index of the
//! first part that holds in the module's case selector, and the statement
//! becomes a case statement over that selector.

use nnl_diagnostic::ErrorCode;
use nnl_graph::{GraphId, LoopStyle, NodeKind, Relation, StaticKey, WellKnown};
use nnl_ir::{AstKind, ConditionalStyle, NodeId, QueryStyle};

use crate::context::{BranchInfo, ExtraItems, RenderFlags, TargetKind};
use crate::ModuleCompiler;

/// A part's rendered condition with the code that has to run before it.
struct PartCondition {
    value: Option<GraphId>,
    extras: Vec<GraphId>,
}

/// Case value of the default part when a restructured statement has none.
const NO_DEFAULT: i64 = -1;

fn loop_style(style: ConditionalStyle) -> LoopStyle {
    match style {
        ConditionalStyle::If => LoopStyle::Normal,
        ConditionalStyle::While => LoopStyle::Looped,
        ConditionalStyle::Do => LoopStyle::Until,
        ConditionalStyle::Switch => LoopStyle::Case,
        ConditionalStyle::LoopedSwitch => LoopStyle::CaseLooped,
    }
}

impl ModuleCompiler<'_> {
    pub(crate) fn lower_conditional(
        &mut self,
        id: NodeId,
        style: ConditionalStyle,
        case_value: NodeId,
        parts: &[NodeId],
    ) -> GraphId {
        let mut links = Vec::new();
        if style.is_switch() {
            if !case_value.is_valid() {
                return self.error(ErrorCode::E3003, id, "switch without a case value");
            }
            let selector = self.render(case_value);
            links.push((Relation::CaseItem, selector));
        }

        let mut conditions = Vec::with_capacity(parts.len());
        let mut bodies = Vec::with_capacity(parts.len());
        for (index, &part) in parts.iter().enumerate() {
            let AstKind::ConditionalPart { condition, body } = *self.ast.kind(part) else {
                self.error(ErrorCode::E9001, part, "expected a conditional part");
                continue;
            };
            if !condition.is_valid() && index + 1 != parts.len() {
                let code = if style.is_switch() {
                    ErrorCode::E3004
                } else {
                    ErrorCode::E3003
                };
                self.error(code, part, "only the last part may omit its condition");
                continue;
            }
            conditions.push(self.part_condition(part, index, condition, style));
            bodies.push(body);
        }

        let bodies: Vec<Vec<GraphId>> = bodies
            .into_iter()
            .map(|body| self.loop_body(body))
            .collect();

        if !style.is_switch() && conditions.iter().any(|c| !c.extras.is_empty()) {
            return self.restructure(style, &conditions, &bodies);
        }

        let expressions: Vec<GraphId> = conditions
            .iter()
            .zip(&bodies)
            .map(|(condition, body)| self.conditional_expression(condition.value, body))
            .collect();
        self.conditional_statement(loop_style(style), &expressions, &links)
    }

    /// Render a part's condition into its own target.
    fn part_condition(
        &mut self,
        part: NodeId,
        index: usize,
        condition: NodeId,
        style: ConditionalStyle,
    ) -> PartCondition {
        if !condition.is_valid() {
            return PartCondition {
                value: None,
                extras: Vec::new(),
            };
        }
        // Case values are compared, not evaluated, so they may not call.
        let remove = if style.is_switch() {
            RenderFlags::ARGUMENTS | RenderFlags::CALLS_ALLOWED
        } else {
            RenderFlags::ARGUMENTS
        };
        let (value, extras) = self.render_condition(index, condition, remove);
        self.extras[part.index()] = ExtraItems::from_slice(&extras);
        PartCondition {
            value: Some(value),
            extras,
        }
    }

    /// Render `condition` as the condition of branch `index`, returning its
    /// value and the code it needs first.
    fn render_condition(
        &mut self,
        index: usize,
        condition: NodeId,
        remove: RenderFlags,
    ) -> (GraphId, Vec<GraphId>) {
        self.push_target(TargetKind::Statements);
        self.branches.push(BranchInfo {
            part: index,
            bool_result: None,
        });
        let value = self.with_flags(RenderFlags::CONDITION_BRANCH, remove, |this| {
            if this.type_of(condition).has_value() {
                this.render(condition)
            } else {
                this.no_value(condition, "condition")
            }
        });
        if let Some(branch) = self.branches.pop() {
            if let Some(var) = branch.bool_result {
                tracing::trace!(part = branch.part, ?var, "condition stored in bool result");
            }
        }
        let extras = self.pop_target();
        (value, extras)
    }

    /// Statements of a branch or loop body.
    fn loop_body(&mut self, body: NodeId) -> Vec<GraphId> {
        self.with_flags(
            RenderFlags::CALLS_ALLOWED,
            RenderFlags::CONDITION_BRANCH | RenderFlags::ARGUMENTS,
            |this| this.lower_body(body),
        )
    }

    fn conditional_expression(&mut self, condition: Option<GraphId>, body: &[GraphId]) -> GraphId {
        let code = self.intern_cluster(body, Relation::Code, None);
        let mut links = Vec::with_capacity(2);
        if let Some(condition) = condition {
            links.push((Relation::Condition, condition));
        }
        links.push((Relation::Statements, code));
        self.intern_linked(NodeKind::ConditionalExpression, &links)
    }

    fn conditional_statement(
        &mut self,
        style: LoopStyle,
        expressions: &[GraphId],
        extra: &[(Relation, GraphId)],
    ) -> GraphId {
        let conditions = self.intern_cluster(expressions, Relation::Condition, None);
        let style = self.sentinel(WellKnown::Style(style));
        let mut links = Vec::with_capacity(2 + extra.len());
        links.push((Relation::Condition, conditions));
        links.push((Relation::LoopStyle, style));
        links.extend_from_slice(extra);
        self.intern_linked(NodeKind::ConditionalStatement, &links)
    }

    /// Rewrite a conditional whose conditions need code into a case
    /// statement over the module's case selector.
    ///
    /// The selector code tests the conditions in order:
    ///
    /// ```text
    /// extras_0
    /// if (c_0) sel = 0
    /// else { extras_1; if (c_1) sel = 1 else { ... sel = <default> } }
    /// ```
    ///
    /// Looping styles run the selector code again at the end of each body.
    fn restructure(
        &mut self,
        style: ConditionalStyle,
        conditions: &[PartCondition],
        bodies: &[Vec<GraphId>],
    ) -> GraphId {
        tracing::debug!(?style, parts = conditions.len(), "restructuring conditional into a case");
        let selector = self.case_selector_variable();
        let default = conditions
            .iter()
            .position(|c| c.value.is_none())
            .map_or(NO_DEFAULT, |i| i64::try_from(i).unwrap_or(NO_DEFAULT));

        let fallback = self.literal(StaticKey::Int(default));
        let mut code = vec![self.intern_assignment(selector, fallback)];
        for (index, condition) in conditions.iter().enumerate().rev() {
            let Some(value) = condition.value else {
                continue;
            };
            let case = self.case_literal(index);
            let chosen = self.intern_assignment(selector, case);
            let then = self.conditional_expression(Some(value), &[chosen]);
            let otherwise = self.conditional_expression(None, &code);
            let test = self.conditional_statement(LoopStyle::Normal, &[then, otherwise], &[]);
            let mut next = condition.extras.clone();
            next.push(test);
            code = next;
        }

        let looped = matches!(style, ConditionalStyle::While | ConditionalStyle::Do);
        let case_style = if looped {
            LoopStyle::CaseLooped
        } else {
            LoopStyle::Case
        };
        // `do` runs its first part once before testing anything.
        let prelude = if style == ConditionalStyle::Do {
            let first = self.case_literal(0);
            vec![self.intern_assignment(selector, first)]
        } else {
            code.clone()
        };

        let mut expressions = Vec::with_capacity(conditions.len());
        for (index, (condition, body)) in conditions.iter().zip(bodies).enumerate() {
            let mut body = body.clone();
            if looped {
                body.extend_from_slice(&code);
            }
            let key = condition.value.map(|_| self.case_literal(index));
            expressions.push(self.conditional_expression(key, &body));
        }

        self.emit_all(&prelude);
        self.conditional_statement(case_style, &expressions, &[(Relation::CaseItem, selector)])
    }

    fn case_literal(&mut self, index: usize) -> GraphId {
        self.literal(StaticKey::Int(i64::try_from(index).unwrap_or(i64::MAX)))
    }

    pub(crate) fn lower_for(
        &mut self,
        id: NodeId,
        init: NodeId,
        condition: NodeId,
        increment: NodeId,
        body: NodeId,
    ) -> GraphId {
        if !condition.is_valid() {
            return self.error(ErrorCode::E3007, id, "for loop without a condition");
        }
        if init.is_valid() {
            let value = self.render(init);
            if self.is_executable(value) {
                self.emit(value);
            }
        }

        let (value, pre_condition) = self.render_condition(0, condition, RenderFlags::ARGUMENTS);
        let mut statements = self.loop_body(body);
        if increment.is_valid() {
            self.push_target(TargetKind::Statements);
            let step = self.render(increment);
            statements.extend(self.pop_target());
            if self.is_executable(step) {
                statements.push(step);
            }
        }

        let expression = self.conditional_expression(Some(value), &statements);
        let mut links = Vec::new();
        if !pre_condition.is_empty() {
            let code = self.intern_cluster(&pre_condition, Relation::Code, None);
            links.push((Relation::Statements, code));
        }
        self.conditional_statement(LoopStyle::For, &[expression], &links)
    }

    pub(crate) fn lower_foreach(
        &mut self,
        id: NodeId,
        variable: NodeId,
        source: NodeId,
        body: NodeId,
    ) -> GraphId {
        if !variable.is_valid() || !source.is_valid() {
            return self.error(
                ErrorCode::E3007,
                id,
                "foreach needs a loop variable and a source",
            );
        }
        let item = self.assign_target(variable);
        let source = self.render(source);
        let statements = self.loop_body(body);
        let expression = self.conditional_expression(Some(source), &statements);
        self.conditional_statement(
            LoopStyle::ForEach,
            &[expression],
            &[(Relation::LoopItem, item)],
        )
    }

    pub(crate) fn lower_select(
        &mut self,
        id: NodeId,
        variables: &[NodeId],
        source: NodeId,
        style: QueryStyle,
        body: NodeId,
    ) -> GraphId {
        if variables.is_empty() || !source.is_valid() {
            return self.error(
                ErrorCode::E3007,
                id,
                "select needs loop variables and a source",
            );
        }
        let mut refs = Vec::with_capacity(variables.len());
        for &variable in variables {
            let var = self.assign_target(variable);
            refs.push(self.intern_linked(NodeKind::ByRef, &[(Relation::Value, var)]));
        }
        let item = self.intern_cluster(&refs, Relation::Union, None);
        let source = self.render(source);
        let statements = self.loop_body(body);
        let expression = self.conditional_expression(Some(source), &statements);
        self.conditional_statement(
            LoopStyle::QueryLoop(style),
            &[expression],
            &[(Relation::LoopItem, item)],
        )
    }
}
