//! Node dispatch, leaves and references.

use nnl_diagnostic::ErrorCode;
use nnl_graph::{GraphId, StaticKey, WellKnown};
use nnl_ir::{AstKind, BindingKind, Name, NodeId};

use crate::resolve::Resolved;
use crate::ModuleCompiler;

impl ModuleCompiler<'_> {
    /// Lower one node. Called by [`ModuleCompiler::render`] only.
    pub(crate) fn dispatch(&mut self, id: NodeId) -> GraphId {
        let kind = *self.ast.kind(id);
        tracing::trace!(?id, node = kind.describe(), "rendering");

        match kind {
            AstKind::Int(v) => self.literal(StaticKey::Int(v)),
            AstKind::Double(bits) => self.literal(StaticKey::Double(bits)),
            AstKind::Str(text) => self.literal(StaticKey::Text(text)),
            AstKind::Symbol(name) => self.lower_symbol(name),
            AstKind::Ref(name) => self.lower_ref(id, name),
            AstKind::Using { .. } | AstKind::Error => self.empty(),

            AstKind::VarDecl { .. } => self.lower_var_decl(id),
            AstKind::Unary { op, operand } => self.lower_unary(id, op, operand),
            AstKind::Binary { op, left, right } => self.lower_binary(id, op, left, right),
            AstKind::Path { .. } => self.lower_binding_read(id, BindingKind::Variable, id),
            AstKind::Call {
                callee,
                args,
                blocked,
            } => {
                let args = self.ast.get_list(args).to_vec();
                self.lower_call(id, callee, &args, blocked)
            }

            AstKind::Conditional {
                style,
                case_value,
                parts,
            } => {
                let parts = self.ast.get_list(parts).to_vec();
                self.lower_conditional(id, style, case_value, &parts)
            }
            AstKind::ConditionalPart { .. } => self.error(
                ErrorCode::E9001,
                id,
                "conditional part rendered outside of its conditional statement",
            ),
            AstKind::For {
                init,
                condition,
                increment,
                body,
            } => self.lower_for(id, init, condition, increment, body),
            AstKind::ForEach {
                variable,
                source,
                body,
            } => self.lower_foreach(id, variable, source, body),
            AstKind::Select {
                variables,
                source,
                style,
                body,
            } => {
                let variables = self.ast.get_list(variables).to_vec();
                self.lower_select(id, &variables, source, style, body)
            }
            AstKind::Lock {
                targets,
                link_targets,
                body,
            } => {
                let targets = self.ast.get_list(targets).to_vec();
                let link_targets = self.ast.get_list(link_targets).to_vec();
                self.lower_lock(&targets, &link_targets, body)
            }
            AstKind::Return { values } => {
                let values = self.ast.get_list(values).to_vec();
                self.lower_return(&values)
            }

            AstKind::Function {
                name, params, body, ..
            } => self.lower_function(id, name, params, body),
            AstKind::Class {
                name,
                meaning,
                items,
            } => {
                let items = self.ast.get_list(items).to_vec();
                self.lower_class(id, name, meaning, &items)
            }
            AstKind::CodeList { mode, items } => {
                let items = self.ast.get_list(items).to_vec();
                self.lower_code_list(mode, &items)
            }
            AstKind::List { items } => {
                let items = self.ast.get_list(items).to_vec();
                self.lower_list(&items)
            }
            AstKind::Union { items } => {
                let items = self.ast.get_list(items).to_vec();
                self.lower_union(&items)
            }
            AstKind::Link { from, meaning, to } => self.lower_link(from, meaning, to),
        }
    }

    /// Shared value node for `key`, created on first use.
    pub(crate) fn literal(&mut self, key: StaticKey) -> GraphId {
        if let Some(existing) = self.graph.find_static(key) {
            self.module.register_used(existing);
            return existing;
        }
        let id = self.graph.static_node(key);
        self.note_created(id);
        id
    }

    pub(crate) fn sentinel(&mut self, which: WellKnown) -> GraphId {
        self.literal(StaticKey::WellKnown(which))
    }

    /// A neuron is published in the static name table the first time any
    /// module mentions it.
    fn lower_symbol(&mut self, name: Name) -> GraphId {
        let id = self.literal(StaticKey::Symbol(name));
        if self.graph.find_static_name(name).is_none() {
            self.graph.register_static_name(name, id);
        }
        id
    }

    fn lower_ref(&mut self, id: NodeId, name: Name) -> GraphId {
        match self.resolve_ref(id, name) {
            Some(Resolved::Decl(decl)) => match *self.ast.kind(decl) {
                AstKind::VarDecl { .. } => self.declare_variable(decl),
                AstKind::Function { .. } | AstKind::Class { .. } => self.render(decl),
                other => self.error(
                    ErrorCode::E9001,
                    id,
                    format!("`{}` resolved to a {}", self.name_str(name), other.describe()),
                ),
            },
            Some(Resolved::Static(node)) => {
                self.module.register_used(node);
                node
            }
            None => self.error(
                ErrorCode::E1001,
                id,
                format!("unknown identifier `{}`", self.name_str(name)),
            ),
        }
    }

    /// Read through a binding path; `path` is a `Path` or a single `Ref`.
    pub(crate) fn lower_binding_read(
        &mut self,
        id: NodeId,
        kind: BindingKind,
        path: NodeId,
    ) -> GraphId {
        let segments = self.binding_segments(path);
        let shown = || {
            segments
                .iter()
                .map(|s| self.name_str(*s))
                .collect::<Vec<_>>()
                .join(".")
        };
        if segments.is_empty() {
            return self.error(ErrorCode::E1002, id, "empty binding path");
        }
        match self.bindings.resolve(kind, &segments, self.graph) {
            Some(node) => {
                tracing::trace!(path = %shown(), ?node, "binding resolved");
                self.module.register_used(node);
                node
            }
            None => {
                let message = format!("unknown binding `{}{}`", kind.as_symbol(), shown());
                self.error(ErrorCode::E1002, id, message)
            }
        }
    }
}
