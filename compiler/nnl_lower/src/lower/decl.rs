//! Variables, functions and classes.
//!
//! Declarations are keyed by [`DeclKey`] in the module record. A recompiled
//! declaration finds its previous graph node there and keeps it, so nodes in
//! other modules that reference it stay valid.
//!
//! Identical functions and classes share one cluster, and every declaration
//! naming it holds a claim on it in the store. A changed declaration rewrites
//! its cluster in place only while it holds the sole claim; a shared cluster
//! is left to its other owners and the declaration moves to a new one.

use nnl_diagnostic::ErrorCode;
use nnl_graph::{GraphError, GraphId, NodeKind, Relation, WellKnown};
use nnl_ir::{AstKind, DeclScope, Name, NodeId};

use crate::context::{ExtraItems, RenderFlags, RenderState, TargetKind};
use crate::module::DeclKey;
use crate::ModuleCompiler;

impl ModuleCompiler<'_> {
    /// Registry key of the declaration `decl` named `name`.
    ///
    /// Memoized per node through the callers' own tables; each call with a
    /// new node takes the next index for its (owner, name) pair.
    fn decl_key(&mut self, decl: NodeId, name: Name) -> DeclKey {
        let owner = self
            .ast
            .ancestors(decl)
            .find_map(|scope| match *self.ast.kind(scope) {
                AstKind::Function { name, .. } | AstKind::Class { name, .. } => Some(name),
                _ => None,
            })
            .unwrap_or(Name::EMPTY);
        let counter = self.decl_counters.entry((owner, name)).or_insert(0);
        let index = *counter;
        *counter += 1;
        DeclKey { owner, name, index }
    }

    /// Whether `decl` sits directly in the module, outside any function or
    /// class.
    fn is_module_level(&self, decl: NodeId) -> bool {
        !self.ast.ancestors(decl).any(|scope| {
            matches!(
                self.ast.kind(scope),
                AstKind::Function { .. } | AstKind::Class { .. }
            )
        })
    }

    /// Graph variable of a `VarDecl`, declared on first use.
    pub(crate) fn declare_variable(&mut self, decl: NodeId) -> GraphId {
        if let Some(&var) = self.variables.get(&decl) {
            return var;
        }
        let AstKind::VarDecl {
            name,
            ty,
            scope,
            split,
            ..
        } = *self.ast.kind(decl)
        else {
            return self.error(
                ErrorCode::E9001,
                decl,
                format!("expected a variable declaration, found a {}", self.ast.kind(decl).describe()),
            );
        };
        let key = self.decl_key(decl, name);
        let kind = NodeKind::Variable { scope, ty };

        let previous = self
            .module
            .lookup(&key)
            .filter(|id| self.graph.kind(*id) == Some(kind));
        let var = if let Some(existing) = previous {
            self.module.register_used(existing);
            if let Err(err) = self.register_declaration(key, existing) {
                return self.graph_error(err);
            }
            existing
        } else {
            let mut links = Vec::new();
            if let Some(reaction) = split {
                let reaction = self.sentinel(WellKnown::Split(reaction));
                links.push((Relation::SplitReaction, reaction));
            }
            let var = match self.graph.create_linked(kind, &links) {
                Ok(var) => var,
                Err(err) => return self.graph_error(err),
            };
            if let Err(err) = self.graph.set_name(var, Some(name)) {
                return self.graph_error(err);
            }
            tracing::trace!(name = self.name_str(name), ?var, "variable declared");
            self.note_created(var);
            if let Err(err) = self.register_declaration(key, var) {
                return self.graph_error(err);
            }
            var
        };
        if scope != DeclScope::Local {
            self.module.register_externally_referenced(var);
        }
        self.variables.insert(decl, var);
        var
    }

    /// A declaration statement: declares the variable and assigns its
    /// initializer to it and to every sub-declaration.
    pub(crate) fn lower_var_decl(&mut self, id: NodeId) -> GraphId {
        let var = self.declare_variable(id);
        let AstKind::VarDecl { init, subs, .. } = *self.ast.kind(id) else {
            return var;
        };
        let subs: Vec<GraphId> = self
            .ast
            .get_list(subs)
            .to_vec()
            .into_iter()
            .map(|sub| self.declare_variable(sub))
            .collect();
        if !init.is_valid() {
            return var;
        }
        if !self.type_of(init).has_value() {
            self.no_value(init, "initializer");
            return var;
        }
        let value = self.render(init);
        let left = if subs.is_empty() {
            var
        } else {
            let mut all = Vec::with_capacity(subs.len() + 1);
            all.push(var);
            all.extend(subs);
            self.intern_cluster(&all, Relation::List, None)
        };
        let assign = self.intern_assignment(left, value);
        self.emit(assign);
        var
    }

    /// Point `key` at `node`, moving its claim from the node it named before.
    fn register_declaration(&mut self, key: DeclKey, node: GraphId) -> Result<(), GraphError> {
        self.declared.insert(key);
        if self.module.lookup(&key) == Some(node) {
            return Ok(());
        }
        self.graph.claim(node)?;
        if let Some(previous) = self.module.register(key, node) {
            self.graph.release(previous)?;
        }
        Ok(())
    }

    /// Existing declaration cluster equal to the one about to be finalized.
    fn find_identical_declaration(
        &self,
        children: &[GraphId],
        meaning: Relation,
        name: Option<Name>,
        links: &[(Relation, GraphId)],
        skip: GraphId,
    ) -> Option<GraphId> {
        self.graph
            .common_clusters(children, meaning)
            .into_iter()
            .find(|&found| {
                found != skip
                    && self.graph.claims(found) > 0
                    && self.graph.children(found) == children
                    && self.graph.name(found) == name
                    && links
                        .iter()
                        .all(|&(rel, to)| self.graph.link_target(found, rel) == Some(to))
            })
    }

    /// Previous graph node of a function or class, or a fresh placeholder.
    ///
    /// The previous node is only reused while this declaration is its sole
    /// owner. Returns the node and whether it is a placeholder that still
    /// needs finalizing.
    fn begin_aggregate(&mut self, id: NodeId, key: &DeclKey, meaning: Relation) -> (GraphId, bool) {
        let previous = self.module.lookup(key).filter(|node| {
            self.graph.kind(*node) == Some(NodeKind::Cluster(meaning))
                && self.graph.claims(*node) == 1
        });
        let (node, reserved) = match previous {
            Some(node) => (node, false),
            None => (self.graph.reserve(), true),
        };
        self.states[id.index()] = RenderState::InProgress(node);
        (node, reserved)
    }

    /// Finish a function or class cluster begun by [`Self::begin_aggregate`].
    ///
    /// A placeholder nothing refers to yet gives way to an identical
    /// existing declaration cluster. A reused node, owned by this
    /// declaration alone, gets its content replaced.
    fn end_aggregate(
        &mut self,
        node: GraphId,
        reserved: bool,
        meaning: Relation,
        children: &[GraphId],
        name: Option<Name>,
        links: &[(Relation, GraphId)],
    ) -> GraphId {
        if reserved {
            let identical = self.find_identical_declaration(children, meaning, name, links, node);
            if let Some(existing) = identical {
                if !self.graph.is_referenced(node) {
                    if let Err(err) = self.graph.discard(node) {
                        return self.graph_error(err);
                    }
                    self.module.register_used(existing);
                    return existing;
                }
            }
            if let Err(err) = self.graph.finalize_cluster(node, meaning, children, name) {
                return self.graph_error(err);
            }
            self.note_created(node);
        } else {
            if self.graph.children(node) != children {
                tracing::debug!(?node, "declaration changed, replacing its content");
                if let Err(err) = self.graph.set_children(node, children) {
                    return self.graph_error(err);
                }
            }
            self.module.register_used(node);
        }
        for &(rel, to) in links {
            if self.graph.link_target(node, rel) != Some(to) {
                if let Err(err) = self.graph.add_link(node, rel, to) {
                    return self.graph_error(err);
                }
            }
        }
        node
    }

    pub(crate) fn lower_function(
        &mut self,
        id: NodeId,
        name: Name,
        params: NodeId,
        body: NodeId,
    ) -> GraphId {
        let key = self.decl_key(id, name);
        let (node, reserved) = self.begin_aggregate(id, &key, Relation::Code);
        tracing::debug!(name = self.name_str(name), ?node, reused = !reserved, "function");

        let params: Vec<GraphId> = self
            .parameters(params)
            .into_iter()
            .map(|param| self.declare_variable(param))
            .collect();
        let parameters = self.intern_cluster(&params, Relation::Parameters, None);

        let statements = self.body_items(body);
        let children = self.with_flags(
            RenderFlags::CALLS_ALLOWED,
            RenderFlags::CONDITION_BRANCH | RenderFlags::ARGUMENTS,
            |this| {
                this.push_target(TargetKind::Statements);
                if !params.is_empty() {
                    let pop = this.pop_value();
                    for &param in &params {
                        let assign = this.intern_assignment(param, pop);
                        this.emit(assign);
                    }
                }
                for statement in statements {
                    this.render_statement(statement);
                }
                this.pop_target()
            },
        );

        let cluster_name = self.cluster_name(name);
        let result = self.end_aggregate(
            node,
            reserved,
            Relation::Code,
            &children,
            cluster_name,
            &[(Relation::Parameters, parameters)],
        );
        if result != self.empty() {
            if let Err(err) = self.register_declaration(key, result) {
                return self.graph_error(err);
            }
        }
        if self.is_module_level(id) {
            self.module.register_externally_referenced(result);
        }
        result
    }

    pub(crate) fn lower_class(
        &mut self,
        id: NodeId,
        name: Name,
        meaning: Name,
        items: &[NodeId],
    ) -> GraphId {
        let relation = if meaning.is_empty() {
            Relation::Class
        } else {
            Relation::Custom(meaning)
        };
        let key = self.decl_key(id, name);
        let (node, reserved) = self.begin_aggregate(id, &key, relation);
        tracing::debug!(name = self.name_str(name), ?node, reused = !reserved, "class");

        // Initializers of member variables run where the class is declared.
        self.push_target(TargetKind::Statements);
        let mut members = Vec::with_capacity(items.len());
        for &item in items {
            if let AstKind::Using { .. } = self.ast.kind(item) {
                continue;
            }
            let member = self.render(item);
            if member != self.empty() {
                members.push(member);
            }
        }
        let initializers = self.pop_target();
        self.extras[id.index()] = ExtraItems::from_slice(&initializers);
        self.emit_all(&initializers);

        let cluster_name = self.cluster_name(name);
        let result = self.end_aggregate(node, reserved, relation, &members, cluster_name, &[]);
        if result != self.empty() {
            if let Err(err) = self.register_declaration(key, result) {
                return self.graph_error(err);
            }
        }
        self.module.register_externally_referenced(result);
        result
    }

    fn cluster_name(&self, name: Name) -> Option<Name> {
        (self.config.name_clusters && !name.is_empty()).then_some(name)
    }
}
