//! Code lists, lists, unions, links, `return` and `lock`.

use nnl_graph::{GraphId, Instruction, NodeKind, Relation};
use nnl_ir::{CodeListMode, NodeId};

use crate::ModuleCompiler;

impl ModuleCompiler<'_> {
    pub(crate) fn lower_code_list(&mut self, mode: CodeListMode, items: &[NodeId]) -> GraphId {
        match mode {
            CodeListMode::Statements => {
                let statements = self.lower_statements(items);
                self.intern_cluster(&statements, Relation::Code, None)
            }
            CodeListMode::Params => {
                let params: Vec<GraphId> =
                    items.iter().map(|&p| self.declare_variable(p)).collect();
                self.intern_cluster(&params, Relation::Parameters, None)
            }
        }
    }

    /// Values of `items`, in order.
    fn render_all(&mut self, items: &[NodeId]) -> Vec<GraphId> {
        items.iter().map(|&item| self.render(item)).collect()
    }

    pub(crate) fn lower_list(&mut self, items: &[NodeId]) -> GraphId {
        let values = self.render_all(items);
        self.intern_cluster(&values, Relation::List, None)
    }

    pub(crate) fn lower_union(&mut self, items: &[NodeId]) -> GraphId {
        let values = self.render_all(items);
        self.intern_result_statement(Instruction::Union, &values)
    }

    /// `link from -> meaning -> to;`
    pub(crate) fn lower_link(&mut self, from: NodeId, meaning: NodeId, to: NodeId) -> GraphId {
        let from = self.render(from);
        let meaning = self.render(meaning);
        let to = self.render(to);
        self.intern_statement(Instruction::AddLink, &[from, to, meaning])
    }

    /// Each value goes to the caller through its own `ReturnValue`
    /// statement; the node itself is the bare `Return`.
    pub(crate) fn lower_return(&mut self, values: &[NodeId]) -> GraphId {
        for &value in values {
            let result = if self.type_of(value).has_value() {
                self.render(value)
            } else {
                self.no_value(value, "returned expression")
            };
            let statement = self.intern_statement(Instruction::ReturnValue, &[result]);
            self.emit(statement);
        }
        self.intern_statement(Instruction::Return, &[])
    }

    pub(crate) fn lower_lock(
        &mut self,
        targets: &[NodeId],
        link_targets: &[NodeId],
        body: NodeId,
    ) -> GraphId {
        let targets = self.render_all(targets);
        let targets = self.intern_cluster(&targets, Relation::LockTargets, None);
        let link_targets = self.render_all(link_targets);
        let link_targets = self.intern_cluster(&link_targets, Relation::LinkTargets, None);
        let body = self.lower_body(body);
        let body = self.intern_cluster(&body, Relation::Code, None);
        self.intern_linked(
            NodeKind::Lock,
            &[
                (Relation::LockTargets, targets),
                (Relation::LinkTargets, link_targets),
                (Relation::Statements, body),
            ],
        )
    }

    /// Render a body (a code list or a single statement) into a statement
    /// list.
    pub(crate) fn lower_body(&mut self, body: NodeId) -> Vec<GraphId> {
        let items = self.body_items(body);
        self.lower_statements(&items)
    }
}
