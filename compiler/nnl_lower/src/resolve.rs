//! Name and binding resolution.
//!
//! An identifier is looked up in three places, in order:
//!
//! 1. declarations in the enclosing scopes, walking the AST parent chain
//! 2. `using` aliases visible from the reference
//! 3. the graph store's static name table
//!
//! Binding paths (`$a.b`, `^a.b`, `#a.b`, `~a.b`) are resolved by an external
//! [`BindingResolver`]; `using` aliases apply to their first segment.

use nnl_graph::{GraphId, GraphStore};
use nnl_ir::{AstKind, BindingKind, Name, NodeId, TypeDecl};
use rustc_hash::FxHashMap;

use crate::ModuleCompiler;

/// Alias chains longer than this are treated as unresolved.
const MAX_ALIAS_DEPTH: usize = 8;

/// What a name resolved to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Resolved {
    Decl(NodeId),
    Static(GraphId),
}

/// Resolves binding paths to graph nodes.
///
/// The target module or variable of a binding is decided outside the
/// compiler (by the runtime's binding tables); lowering only needs the node
/// and, for type inference, its type.
pub trait BindingResolver {
    fn resolve(&self, kind: BindingKind, path: &[Name], graph: &GraphStore) -> Option<GraphId>;

    /// Type of the value a binding yields once fully resolved.
    fn type_of(&self, kind: BindingKind, path: &[Name]) -> TypeDecl {
        let _ = (kind, path);
        TypeDecl::Var
    }
}

/// A fixed table of bindings.
///
/// Single-segment paths not in the table fall back to the graph's static
/// name table.
#[derive(Clone, Debug, Default)]
pub struct StaticBindings {
    entries: FxHashMap<(BindingKind, Vec<Name>), (GraphId, TypeDecl)>,
}

impl StaticBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: BindingKind, path: &[Name], node: GraphId, ty: TypeDecl) {
        self.entries.insert((kind, path.to_vec()), (node, ty));
    }
}

impl BindingResolver for StaticBindings {
    fn resolve(&self, kind: BindingKind, path: &[Name], graph: &GraphStore) -> Option<GraphId> {
        if let Some((node, _)) = self.entries.get(&(kind, path.to_vec())) {
            return Some(*node);
        }
        match path {
            [single] => graph.find_static_name(*single),
            _ => None,
        }
    }

    fn type_of(&self, kind: BindingKind, path: &[Name]) -> TypeDecl {
        self.entries
            .get(&(kind, path.to_vec()))
            .map_or(TypeDecl::Var, |(_, ty)| *ty)
    }
}

impl ModuleCompiler<'_> {
    /// Resolve the name a `Ref` node carries. Memoized per node.
    pub(crate) fn resolve_ref(&mut self, node: NodeId, name: Name) -> Option<Resolved> {
        if let Some(cached) = self.resolutions.get(&node) {
            return *cached;
        }
        let resolved = self.resolve_name(node, name);
        tracing::trace!(name = self.name_str(name), ?resolved, "resolved reference");
        self.resolutions.insert(node, resolved);
        resolved
    }

    /// Resolve `name` as seen from `from`, without memoization.
    pub(crate) fn resolve_name(&self, from: NodeId, name: Name) -> Option<Resolved> {
        self.resolve_with_depth(from, name, 0)
    }

    fn resolve_with_depth(&self, from: NodeId, name: Name, depth: usize) -> Option<Resolved> {
        if let Some(decl) = self.find_declaration(from, name) {
            return Some(Resolved::Decl(decl));
        }
        if depth < MAX_ALIAS_DEPTH {
            if let Some((using, target)) = self.find_using(from, name) {
                if let Some(found) = self.resolve_with_depth(using, target, depth + 1) {
                    return Some(found);
                }
            }
        }
        self.graph.find_static_name(name).map(Resolved::Static)
    }

    /// Nearest declaration of `name` in the scopes enclosing `from`.
    fn find_declaration(&self, from: NodeId, name: Name) -> Option<NodeId> {
        let mut child = from;
        for scope in self.ast.ancestors(from) {
            let found = match *self.ast.kind(scope) {
                AstKind::CodeList { items, .. } | AstKind::Class { items, .. } => {
                    self.find_in_scope(self.ast.get_list(items), child, name)
                }
                AstKind::Function { params, .. } if params.is_valid() => {
                    match *self.ast.kind(params) {
                        AstKind::CodeList { items, .. } => {
                            self.find_in_items(self.ast.get_list(items), name)
                        }
                        _ => None,
                    }
                }
                AstKind::For { init, .. } if init.is_valid() => self.declared_in(init, name),
                AstKind::ForEach { variable, .. } => self.declared_in(variable, name),
                AstKind::Select { variables, .. } => {
                    self.find_in_items(self.ast.get_list(variables), name)
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
            child = scope;
        }
        None
    }

    /// Declaration of `name` in a block as seen from its item `at`: the last
    /// one up to and including `at`, else the first one after it.
    fn find_in_scope(&self, items: &[NodeId], at: NodeId, name: Name) -> Option<NodeId> {
        let split = items
            .iter()
            .position(|&item| item == at)
            .map_or(items.len(), |index| index + 1);
        let (before, after) = items.split_at(split);
        before
            .iter()
            .rev()
            .find_map(|&item| self.declared_in(item, name))
            .or_else(|| self.find_in_items(after, name))
    }

    fn find_in_items(&self, items: &[NodeId], name: Name) -> Option<NodeId> {
        items.iter().find_map(|&item| self.declared_in(item, name))
    }

    /// `item` itself or one of its sub-declarations, if it declares `name`.
    fn declared_in(&self, item: NodeId, name: Name) -> Option<NodeId> {
        match *self.ast.kind(item) {
            AstKind::Using { .. } => None,
            AstKind::VarDecl {
                name: declared,
                subs,
                ..
            } => {
                if declared == name {
                    Some(item)
                } else {
                    self.find_in_items(self.ast.get_list(subs), name)
                }
            }
            kind => (kind.declared_name() == Some(name)).then_some(item),
        }
    }

    /// Nearest `using` whose alias is `name`, with its target.
    pub(crate) fn find_using(&self, from: NodeId, name: Name) -> Option<(NodeId, Name)> {
        for scope in self.ast.ancestors(from) {
            let items = match *self.ast.kind(scope) {
                AstKind::CodeList { items, .. } | AstKind::Class { items, .. } => items,
                _ => continue,
            };
            for &item in self.ast.get_list(items) {
                if let AstKind::Using { alias, target } = *self.ast.kind(item) {
                    if alias == name {
                        return Some((item, target));
                    }
                }
            }
        }
        None
    }

    /// Segment names of a binding path, with a leading `using` alias applied.
    pub(crate) fn binding_segments(&self, path: NodeId) -> Vec<Name> {
        let mut names: Vec<Name> = match *self.ast.kind(path) {
            AstKind::Path { segments } => self
                .ast
                .get_list(segments)
                .iter()
                .filter_map(|&seg| match *self.ast.kind(seg) {
                    AstKind::Ref(name) => Some(name),
                    _ => None,
                })
                .collect(),
            AstKind::Ref(name) => vec![name],
            _ => Vec::new(),
        };
        if let Some(first) = names.first_mut() {
            if let Some((_, target)) = self.find_using(path, *first) {
                *first = target;
            }
        }
        names
    }
}
