//! The in-memory graph store.
//!
//! Nodes live in one arena addressed by [`GraphId`]. Three relation indices
//! keep the searches the compiler performs cheap:
//!
//! - `incoming`: for every node, the `(relation, source)` pairs linking to it
//! - `parents`: for every node, the clusters that list it as a child
//! - `statics`: the value index, one node per literal / instruction / sentinel
//!
//! Empty clusters have no child to be found through, so they are indexed by
//! meaning instead.
//!
//! Every node also counts its claims: how many declarations, across all
//! modules, currently name it as their graph node.

use std::sync::Arc;

use nnl_ir::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{GraphError, GraphId, Instruction, NodeKind, Relation, StaticKey, WellKnown};

/// Handle shared by compilation units and the runtime.
pub type SharedGraph = Arc<GraphStore>;

/// Outgoing links of a node, in creation order.
pub type Links = SmallVec<[(Relation, GraphId); 4]>;

/// A node as stored in the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
    pub kind: NodeKind,
    /// Debug name (function and class clusters, module variables).
    pub name: Option<Name>,
    /// `false` while the node is a reserved placeholder.
    pub finalized: bool,
    /// Ordered children; only clusters have any.
    pub children: Vec<GraphId>,
    pub links: Links,
}

impl GraphNode {
    fn new(kind: NodeKind) -> Self {
        GraphNode {
            kind,
            name: None,
            finalized: true,
            children: Vec::new(),
            links: SmallVec::new(),
        }
    }

    /// First target linked through `relation`.
    pub fn link(&self, relation: Relation) -> Option<GraphId> {
        self.links
            .iter()
            .find(|(rel, _)| *rel == relation)
            .map(|(_, target)| *target)
    }
}

#[derive(Default)]
struct GraphInner {
    nodes: Vec<Option<GraphNode>>,
    incoming: Vec<SmallVec<[(Relation, GraphId); 2]>>,
    parents: Vec<SmallVec<[GraphId; 2]>>,
    claims: Vec<u32>,
    statics: FxHashMap<StaticKey, GraphId>,
    named: FxHashMap<Name, GraphId>,
    empty_clusters: FxHashMap<Relation, SmallVec<[GraphId; 2]>>,
    live: usize,
}

impl GraphInner {
    fn push(&mut self, node: GraphNode) -> GraphId {
        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|i| *i != u32::MAX)
            .unwrap_or_else(|| panic!("graph store exceeded {} nodes", u32::MAX - 1));
        self.nodes.push(Some(node));
        self.incoming.push(SmallVec::new());
        self.parents.push(SmallVec::new());
        self.claims.push(0);
        self.live += 1;
        GraphId::new(index)
    }

    fn node(&self, id: GraphId) -> Result<&GraphNode, GraphError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(GraphError::Missing(id))
    }

    fn node_mut(&mut self, id: GraphId) -> Result<&mut GraphNode, GraphError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::Missing(id))
    }

    fn check_exists(&self, id: GraphId) -> Result<(), GraphError> {
        self.node(id).map(|_| ())
    }

    fn is_referenced(&self, id: GraphId) -> bool {
        let index = id.index();
        self.incoming.get(index).is_some_and(|v| !v.is_empty())
            || self.parents.get(index).is_some_and(|v| !v.is_empty())
    }

    fn add_link(&mut self, from: GraphId, relation: Relation, to: GraphId) -> Result<(), GraphError> {
        self.check_exists(to)?;
        self.node_mut(from)?.links.push((relation, to));
        self.incoming[to.index()].push((relation, from));
        Ok(())
    }

    fn attach_children(&mut self, cluster: GraphId, children: &[GraphId]) -> Result<(), GraphError> {
        let NodeKind::Cluster(meaning) = self.node(cluster)?.kind else {
            return Err(GraphError::NotACluster(cluster));
        };
        for &child in children {
            self.check_exists(child)?;
        }
        for &child in children {
            let parents = &mut self.parents[child.index()];
            if !parents.contains(&cluster) {
                parents.push(cluster);
            }
        }
        if children.is_empty() {
            self.empty_clusters.entry(meaning).or_default().push(cluster);
        }
        self.node_mut(cluster)?.children = children.to_vec();
        Ok(())
    }

    fn detach_children(&mut self, cluster: GraphId) -> Result<(), GraphError> {
        let node = self.node_mut(cluster)?;
        let old = std::mem::take(&mut node.children);
        let kind = node.kind;
        if let NodeKind::Cluster(meaning) = kind {
            if old.is_empty() {
                if let Some(list) = self.empty_clusters.get_mut(&meaning) {
                    list.retain(|id| *id != cluster);
                }
            }
        }
        for child in old {
            if let Some(parents) = self.parents.get_mut(child.index()) {
                parents.retain(|id| *id != cluster);
            }
        }
        Ok(())
    }

    fn remove(&mut self, id: GraphId) -> Result<GraphNode, GraphError> {
        self.check_exists(id)?;
        if self.is_referenced(id) || self.claims[id.index()] > 0 {
            return Err(GraphError::StillReferenced(id));
        }
        self.detach_children(id)?;
        let node = self.nodes[id.index()].take().ok_or(GraphError::Missing(id))?;
        for (relation, target) in &node.links {
            if let Some(incoming) = self.incoming.get_mut(target.index()) {
                if let Some(pos) = incoming
                    .iter()
                    .position(|(rel, src)| rel == relation && *src == id)
                {
                    incoming.remove(pos);
                }
            }
        }
        if let Some(key) = node.kind.static_key() {
            self.statics.remove(&key);
        }
        self.named.retain(|_, v| *v != id);
        self.live -= 1;
        Ok(node)
    }
}

/// Shared, thread-safe graph store.
///
/// Every method locks internally. Sequences of calls are not atomic: a
/// find-then-create may race with another unit doing the same, in which case
/// both nodes are valid and interchangeable.
#[derive(Default)]
pub struct GraphStore {
    inner: RwLock<GraphInner>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store behind an `Arc` for sharing.
    pub fn shared() -> SharedGraph {
        Arc::new(Self::new())
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.inner.read().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Creation

    /// Create a finalized node without links.
    ///
    /// Kinds with a value-index key are routed through [`Self::static_node`]
    /// so they stay unique.
    pub fn create(&self, kind: NodeKind) -> GraphId {
        if let Some(key) = kind.static_key() {
            return self.static_node(key);
        }
        self.inner.write().push(GraphNode::new(kind))
    }

    /// Create a finalized node with outgoing links.
    pub fn create_linked(
        &self,
        kind: NodeKind,
        links: &[(Relation, GraphId)],
    ) -> Result<GraphId, GraphError> {
        let mut inner = self.inner.write();
        for (_, target) in links {
            inner.check_exists(*target)?;
        }
        let id = inner.push(GraphNode::new(kind));
        for &(relation, target) in links {
            inner.add_link(id, relation, target)?;
        }
        Ok(id)
    }

    /// Create a finalized cluster with ordered children.
    pub fn create_cluster(
        &self,
        meaning: Relation,
        children: &[GraphId],
        name: Option<Name>,
    ) -> Result<GraphId, GraphError> {
        let mut inner = self.inner.write();
        for &child in children {
            inner.check_exists(child)?;
        }
        let mut node = GraphNode::new(NodeKind::Cluster(meaning));
        node.name = name;
        let id = inner.push(node);
        inner.attach_children(id, children)?;
        Ok(id)
    }

    /// Reserve a placeholder slot. It can be referenced right away but stays
    /// unfinalized until [`Self::finalize_cluster`] or [`Self::finalize`].
    pub fn reserve(&self) -> GraphId {
        let mut node = GraphNode::new(NodeKind::Temporary);
        node.finalized = false;
        self.inner.write().push(node)
    }

    /// Turn a reserved slot into a finalized cluster.
    pub fn finalize_cluster(
        &self,
        id: GraphId,
        meaning: Relation,
        children: &[GraphId],
        name: Option<Name>,
    ) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        let node = inner.node_mut(id)?;
        if node.finalized {
            return Err(GraphError::AlreadyFinalized(id));
        }
        node.kind = NodeKind::Cluster(meaning);
        node.name = name;
        node.finalized = true;
        inner.attach_children(id, children)
    }

    /// Turn a reserved slot into a finalized, non-cluster node.
    pub fn finalize(
        &self,
        id: GraphId,
        kind: NodeKind,
        links: &[(Relation, GraphId)],
    ) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        let node = inner.node_mut(id)?;
        if node.finalized {
            return Err(GraphError::AlreadyFinalized(id));
        }
        node.kind = kind;
        node.finalized = true;
        for &(relation, target) in links {
            inner.add_link(id, relation, target)?;
        }
        Ok(())
    }

    /// Drop a placeholder that turned out not to be needed.
    pub fn discard(&self, id: GraphId) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        if inner.node(id)?.finalized {
            return Err(GraphError::AlreadyFinalized(id));
        }
        inner.remove(id).map(|_| ())
    }

    /// Delete an unreferenced node, returning its last content.
    pub fn delete(&self, id: GraphId) -> Result<GraphNode, GraphError> {
        self.inner.write().remove(id)
    }

    // Mutation

    pub fn add_link(&self, from: GraphId, relation: Relation, to: GraphId) -> Result<(), GraphError> {
        self.inner.write().add_link(from, relation, to)
    }

    /// Replace the ordered children of a cluster.
    pub fn set_children(&self, cluster: GraphId, children: &[GraphId]) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        if !inner.node(cluster)?.kind.is_cluster() {
            return Err(GraphError::NotACluster(cluster));
        }
        inner.detach_children(cluster)?;
        inner.attach_children(cluster, children)
    }

    pub fn set_name(&self, id: GraphId, name: Option<Name>) -> Result<(), GraphError> {
        self.inner.write().node_mut(id)?.name = name;
        Ok(())
    }

    // Declaration claims

    /// Record one more declaration owning `id`.
    pub fn claim(&self, id: GraphId) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        inner.check_exists(id)?;
        inner.claims[id.index()] += 1;
        Ok(())
    }

    /// Drop one declaration's claim on `id`.
    pub fn release(&self, id: GraphId) -> Result<(), GraphError> {
        let mut inner = self.inner.write();
        inner.check_exists(id)?;
        let claims = &mut inner.claims[id.index()];
        *claims = claims.saturating_sub(1);
        Ok(())
    }

    /// Number of declarations owning `id`.
    ///
    /// A declaration node with a single claim belongs to one declaration
    /// and may be rewritten in place; one with more is shared.
    pub fn claims(&self, id: GraphId) -> u32 {
        self.inner.read().claims.get(id.index()).copied().unwrap_or(0)
    }

    // Queries

    pub fn get(&self, id: GraphId) -> Option<GraphNode> {
        self.inner.read().node(id).ok().cloned()
    }

    pub fn exists(&self, id: GraphId) -> bool {
        self.inner.read().node(id).is_ok()
    }

    pub fn kind(&self, id: GraphId) -> Option<NodeKind> {
        self.inner.read().node(id).ok().map(|n| n.kind)
    }

    pub fn name(&self, id: GraphId) -> Option<Name> {
        self.inner.read().node(id).ok().and_then(|n| n.name)
    }

    pub fn is_finalized(&self, id: GraphId) -> bool {
        self.inner.read().node(id).is_ok_and(|n| n.finalized)
    }

    pub fn children(&self, id: GraphId) -> Vec<GraphId> {
        self.inner
            .read()
            .node(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn links(&self, id: GraphId) -> Links {
        self.inner
            .read()
            .node(id)
            .map(|n| n.links.clone())
            .unwrap_or_default()
    }

    /// First target `id` links to through `relation`.
    pub fn link_target(&self, id: GraphId, relation: Relation) -> Option<GraphId> {
        self.inner.read().node(id).ok().and_then(|n| n.link(relation))
    }

    /// Nodes linking to `target` through `relation`, oldest first.
    pub fn incoming(&self, target: GraphId, relation: Relation) -> Vec<GraphId> {
        self.inner
            .read()
            .incoming
            .get(target.index())
            .map(|list| {
                list.iter()
                    .filter(|(rel, _)| *rel == relation)
                    .map(|(_, src)| *src)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether any link or cluster still refers to `id`.
    pub fn is_referenced(&self, id: GraphId) -> bool {
        self.inner.read().is_referenced(id)
    }

    /// Finalized clusters with the given meaning that contain every member.
    ///
    /// For an empty member list this returns the empty clusters of that
    /// meaning. Candidates come back in creation order.
    pub fn common_clusters(&self, members: &[GraphId], meaning: Relation) -> Vec<GraphId> {
        let inner = self.inner.read();
        let is_candidate = |id: &GraphId| {
            inner
                .node(*id)
                .is_ok_and(|n| n.finalized && n.kind == NodeKind::Cluster(meaning))
        };
        let Some((first, rest)) = members.split_first() else {
            return inner
                .empty_clusters
                .get(&meaning)
                .map(|list| list.iter().copied().filter(is_candidate).collect())
                .unwrap_or_default();
        };
        let Some(first_parents) = inner.parents.get(first.index()) else {
            return Vec::new();
        };
        let mut result: Vec<GraphId> = first_parents.iter().copied().filter(is_candidate).collect();
        for member in rest {
            if result.is_empty() {
                break;
            }
            let parents = inner.parents.get(member.index());
            result.retain(|c| parents.is_some_and(|p| p.contains(c)));
        }
        result.sort_unstable();
        result
    }

    // Value index and static table

    /// Find or create the unique node for `key`.
    pub fn static_node(&self, key: StaticKey) -> GraphId {
        if let Some(id) = self.inner.read().statics.get(&key) {
            return *id;
        }
        let mut inner = self.inner.write();
        if let Some(id) = inner.statics.get(&key) {
            return *id;
        }
        let id = inner.push(GraphNode::new(NodeKind::from(key)));
        inner.statics.insert(key, id);
        id
    }

    pub fn find_static(&self, key: StaticKey) -> Option<GraphId> {
        self.inner.read().statics.get(&key).copied()
    }

    pub fn int(&self, value: i64) -> GraphId {
        self.static_node(StaticKey::Int(value))
    }

    pub fn double(&self, value: f64) -> GraphId {
        self.static_node(StaticKey::Double(value.to_bits()))
    }

    pub fn text(&self, value: Name) -> GraphId {
        self.static_node(StaticKey::Text(value))
    }

    pub fn symbol(&self, name: Name) -> GraphId {
        self.static_node(StaticKey::Symbol(name))
    }

    pub fn instruction(&self, instruction: Instruction) -> GraphId {
        self.static_node(StaticKey::Instruction(instruction))
    }

    pub fn well_known(&self, sentinel: WellKnown) -> GraphId {
        self.static_node(StaticKey::WellKnown(sentinel))
    }

    pub fn jump_target(&self, offset: i32) -> GraphId {
        self.static_node(StaticKey::JumpTarget(offset))
    }

    /// Publish a node under a global name (the static table).
    pub fn register_static_name(&self, name: Name, id: GraphId) {
        self.inner.write().named.insert(name, id);
    }

    /// Look up a node in the static table.
    pub fn find_static_name(&self, name: Name) -> Option<GraphId> {
        self.inner.read().named.get(&name).copied()
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore").field("live", &self.len()).finish_non_exhaustive()
    }
}
