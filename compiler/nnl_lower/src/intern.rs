//! Find-or-create over the existing graph.
//!
//! Before allocating a cluster or a linked node, search the graph for one
//! with the same structure and return it instead. Equivalence is by
//! identity of the operands, never by deep value: two clusters match only
//! if they list the same nodes in the same order.
//!
//! When several candidates match, the oldest wins. Matches are
//! interchangeable, so which one is returned does not affect execution.

use nnl_graph::{GraphId, Instruction, NodeKind, Relation};
use nnl_ir::Name;

use crate::ModuleCompiler;

impl ModuleCompiler<'_> {
    /// Existing cluster with exactly `members` under `meaning` and `name`, or
    /// a new one.
    pub(crate) fn intern_cluster(
        &mut self,
        members: &[GraphId],
        meaning: Relation,
        name: Option<Name>,
    ) -> GraphId {
        if let Some(existing) = self.find_cluster(members, meaning, name) {
            tracing::trace!(?existing, ?meaning, "cluster reused");
            self.module.register_used(existing);
            return existing;
        }
        match self.graph.create_cluster(meaning, members, name) {
            Ok(id) => {
                tracing::trace!(?id, ?meaning, len = members.len(), "cluster created");
                self.note_created(id);
                id
            }
            Err(err) => self.graph_error(err),
        }
    }

    /// Exact match for an ordered member list.
    ///
    /// Function and class clusters are claimed by their declarations and
    /// never match here; see `lower::decl`.
    pub(crate) fn find_cluster(
        &self,
        members: &[GraphId],
        meaning: Relation,
        name: Option<Name>,
    ) -> Option<GraphId> {
        self.graph
            .common_clusters(members, meaning)
            .into_iter()
            .find(|c| {
                self.graph.claims(*c) == 0
                    && self.graph.children(*c) == members
                    && self.graph.name(*c) == name
            })
    }

    /// Existing node of `kind` with exactly `links`, or a new one.
    ///
    /// Candidates are the nodes linking to the first link's target through
    /// the first link's relation.
    pub(crate) fn intern_linked(&mut self, kind: NodeKind, links: &[(Relation, GraphId)]) -> GraphId {
        if let Some(&(relation, target)) = links.first() {
            let found = self
                .graph
                .incoming(target, relation)
                .into_iter()
                .find(|c| {
                    self.graph.kind(*c) == Some(kind) && self.graph.links(*c).as_slice() == links
                });
            if let Some(existing) = found {
                tracing::trace!(?existing, ?kind, "node reused");
                self.module.register_used(existing);
                return existing;
            }
        }
        match self.graph.create_linked(kind, links) {
            Ok(id) => {
                tracing::trace!(?id, ?kind, "node created");
                self.note_created(id);
                id
            }
            Err(err) => self.graph_error(err),
        }
    }

    /// `Statement(instruction, Arguments[args])`.
    pub(crate) fn intern_statement(&mut self, instruction: Instruction, args: &[GraphId]) -> GraphId {
        self.intern_instruction(NodeKind::Statement, instruction, args)
    }

    /// `ResultStatement(instruction, Arguments[args])`.
    pub(crate) fn intern_result_statement(
        &mut self,
        instruction: Instruction,
        args: &[GraphId],
    ) -> GraphId {
        self.intern_instruction(NodeKind::ResultStatement, instruction, args)
    }

    fn intern_instruction(&mut self, kind: NodeKind, instruction: Instruction, args: &[GraphId]) -> GraphId {
        let instr = self.graph.instruction(instruction);
        let args = self.intern_cluster(args, Relation::Arguments, None);
        self.intern_linked(
            kind,
            &[(Relation::Instruction, instr), (Relation::Arguments, args)],
        )
    }

    /// `Assignment(left = right)`.
    pub(crate) fn intern_assignment(&mut self, left: GraphId, right: GraphId) -> GraphId {
        self.intern_linked(
            NodeKind::Assignment,
            &[(Relation::LeftPart, left), (Relation::RightPart, right)],
        )
    }

    /// Value on top of the runtime's value stack.
    pub(crate) fn pop_value(&mut self) -> GraphId {
        self.intern_result_statement(Instruction::PopValue, &[])
    }

    pub(crate) fn note_created(&mut self, id: GraphId) {
        self.created += 1;
        self.module.register_used(id);
    }
}
