//! The module record kept across compilations.
//!
//! A [`Module`] outlives a single lowering pass. Recompiling the same source
//! against the same record and store finds every declaration's graph node
//! here instead of creating a fresh one.
//!
//! The declaration registry persists; graph membership (used and externally
//! referenced nodes) describes the last pass only.

use nnl_graph::GraphId;
use nnl_ir::Name;
use rustc_hash::{FxHashMap, FxHashSet};

/// Identity of a declaration across compilations.
///
/// `owner` is the enclosing function or class (`Name::EMPTY` at module
/// level); `index` tells apart declarations of the same name in one owner,
/// in source order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclKey {
    pub owner: Name,
    pub name: Name,
    pub index: u32,
}

/// Module-wide singleton variables created by the compiler itself.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Role {
    /// Branch index chosen by a restructured conditional.
    CaseSelector,
    /// Result of a short-circuit boolean evaluated inside a condition.
    BoolResult,
}

/// Declarations and graph membership of one compiled module.
#[derive(Clone, Debug, Default)]
pub struct Module {
    name: Name,
    registry: FxHashMap<DeclKey, GraphId>,
    roles: FxHashMap<Role, GraphId>,
    used: FxHashSet<GraphId>,
    externally_referenced: FxHashSet<GraphId>,
    root: Option<GraphId>,
}

impl Module {
    pub fn new(name: Name) -> Self {
        Module {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> Name {
        self.name
    }

    /// Graph node of a previously compiled declaration.
    pub fn lookup(&self, key: &DeclKey) -> Option<GraphId> {
        self.registry.get(key).copied()
    }

    /// Map `key` to `id`, returning the node it named before.
    pub fn register(&mut self, key: DeclKey, id: GraphId) -> Option<GraphId> {
        self.registry.insert(key, id)
    }

    /// Remove every declaration `keep` rejects, returning their nodes.
    pub(crate) fn retain_declarations(
        &mut self,
        mut keep: impl FnMut(&DeclKey) -> bool,
    ) -> Vec<GraphId> {
        let mut dropped = Vec::new();
        self.registry.retain(|key, id| {
            let kept = keep(key);
            if !kept {
                dropped.push(*id);
            }
            kept
        });
        dropped
    }

    /// Forget the membership recorded by the previous pass.
    pub(crate) fn begin_pass(&mut self) {
        self.used.clear();
        self.externally_referenced.clear();
    }

    pub fn role(&self, role: Role) -> Option<GraphId> {
        self.roles.get(&role).copied()
    }

    pub fn set_role(&mut self, role: Role, id: GraphId) {
        self.roles.insert(role, id);
    }

    /// Record that the module's code uses `id`.
    pub fn register_used(&mut self, id: GraphId) {
        self.used.insert(id);
    }

    /// Record that `id` must stay alive for other modules.
    pub fn register_externally_referenced(&mut self, id: GraphId) {
        self.externally_referenced.insert(id);
    }

    pub fn is_used(&self, id: GraphId) -> bool {
        self.used.contains(&id)
    }

    pub fn is_externally_referenced(&self, id: GraphId) -> bool {
        self.externally_referenced.contains(&id)
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    pub fn externally_referenced(&self) -> impl Iterator<Item = GraphId> + '_ {
        self.externally_referenced.iter().copied()
    }

    /// Graph node the module's root rendered to in the last compilation.
    pub fn root(&self) -> Option<GraphId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: GraphId) {
        self.root = Some(root);
    }
}
