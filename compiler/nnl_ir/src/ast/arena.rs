//! Struct-of-arrays storage for AST nodes.

use crate::{Name, Span, TypeDecl};

use super::{AstKind, AstNode, NodeId, NodeRange, TypeRange};

#[inline]
fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len}"))
}

#[inline]
fn to_u16(len: usize, what: &str) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("{what} too long: {len}"))
}

/// Arena holding one compilation unit's AST.
///
/// # Index Spaces
///
/// - `kinds`/`spans`/`parents`: parallel arrays indexed by [`NodeId`]
/// - `lists`: flat `Vec<NodeId>` indexed by [`NodeRange`]
/// - `types`: flat `Vec<TypeDecl>` indexed by [`TypeRange`]
#[derive(Clone, Debug)]
pub struct AstArena {
    file: Name,
    kinds: Vec<AstKind>,
    spans: Vec<Span>,
    parents: Vec<NodeId>,
    lists: Vec<NodeId>,
    types: Vec<TypeDecl>,
}

impl AstArena {
    /// Create an empty arena for the given source file.
    pub fn new(file: Name) -> Self {
        AstArena {
            file,
            kinds: Vec::new(),
            spans: Vec::new(),
            parents: Vec::new(),
            lists: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Source file the nodes came from.
    #[inline]
    pub fn file(&self) -> Name {
        self.file
    }

    /// Allocate a node, returning its ID. The parent is wired by [`finish`](Self::finish).
    pub fn alloc(&mut self, kind: AstKind, span: Span) -> NodeId {
        let id = NodeId::new(to_u32(self.kinds.len(), "AST nodes"));
        self.kinds.push(kind);
        self.spans.push(span);
        self.parents.push(NodeId::INVALID);
        id
    }

    /// Allocate a contiguous list of node IDs.
    pub fn alloc_list(&mut self, ids: &[NodeId]) -> NodeRange {
        if ids.is_empty() {
            return NodeRange::EMPTY;
        }
        let start = to_u32(self.lists.len(), "list entries");
        self.lists.extend_from_slice(ids);
        NodeRange::new(start, to_u16(ids.len(), "node list"))
    }

    /// Allocate a contiguous list of types.
    pub fn alloc_types(&mut self, types: &[TypeDecl]) -> TypeRange {
        if types.is_empty() {
            return TypeRange::EMPTY;
        }
        let start = to_u32(self.types.len(), "type entries");
        self.types.extend_from_slice(types);
        TypeRange {
            start,
            len: to_u16(types.len(), "type list"),
        }
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &AstKind {
        &self.kinds[id.index()]
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.index()]
    }

    /// Parent back-reference; `NodeId::INVALID` for roots.
    #[inline]
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.parents[id.index()]
    }

    pub fn get(&self, id: NodeId) -> AstNode {
        AstNode {
            kind: self.kinds[id.index()],
            span: self.spans[id.index()],
            parent: self.parents[id.index()],
        }
    }

    pub fn get_list(&self, range: NodeRange) -> &[NodeId] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    pub fn get_types(&self, range: TypeRange) -> &[TypeDecl] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.types[start..start + range.len()]
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Direct children of a node, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut one = |child: NodeId| {
            if child.is_valid() {
                out.push(child);
            }
        };
        match *self.kind(id) {
            AstKind::Int(_)
            | AstKind::Double(_)
            | AstKind::Str(_)
            | AstKind::Symbol(_)
            | AstKind::Ref(_)
            | AstKind::Using { .. }
            | AstKind::Error => {}
            AstKind::VarDecl { init, subs, .. } => {
                one(init);
                self.get_list(subs).iter().copied().for_each(&mut one);
            }
            AstKind::Unary { operand, .. } => one(operand),
            AstKind::Binary { left, right, .. } => {
                one(left);
                one(right);
            }
            AstKind::Path { segments } => {
                self.get_list(segments).iter().copied().for_each(&mut one);
            }
            AstKind::Call { callee, args, .. } => {
                one(callee);
                self.get_list(args).iter().copied().for_each(&mut one);
            }
            AstKind::Conditional {
                case_value, parts, ..
            } => {
                one(case_value);
                self.get_list(parts).iter().copied().for_each(&mut one);
            }
            AstKind::ConditionalPart { condition, body } => {
                one(condition);
                one(body);
            }
            AstKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                one(init);
                one(condition);
                one(increment);
                one(body);
            }
            AstKind::ForEach {
                variable,
                source,
                body,
            } => {
                one(variable);
                one(source);
                one(body);
            }
            AstKind::Select {
                variables,
                source,
                body,
                ..
            } => {
                self.get_list(variables).iter().copied().for_each(&mut one);
                one(source);
                one(body);
            }
            AstKind::Lock {
                targets,
                link_targets,
                body,
            } => {
                self.get_list(targets).iter().copied().for_each(&mut one);
                self.get_list(link_targets)
                    .iter()
                    .copied()
                    .for_each(&mut one);
                one(body);
            }
            AstKind::Return { values } => {
                self.get_list(values).iter().copied().for_each(&mut one);
            }
            AstKind::Function { params, body, .. } => {
                one(params);
                one(body);
            }
            AstKind::Class { items, .. }
            | AstKind::CodeList { items, .. }
            | AstKind::List { items }
            | AstKind::Union { items } => {
                self.get_list(items).iter().copied().for_each(&mut one);
            }
            AstKind::Link { from, meaning, to } => {
                one(from);
                one(meaning);
                one(to);
            }
        }
        out
    }

    /// Wire every node's parent back-reference from the child structure.
    ///
    /// Call once after the whole tree is allocated. A node referenced from
    /// two places keeps the first parent found.
    pub fn finish(&mut self) {
        for raw in 0..self.kinds.len() {
            let id = NodeId::new(to_u32(raw, "AST nodes"));
            for child in self.children(id) {
                let slot = &mut self.parents[child.index()];
                if !slot.is_valid() {
                    *slot = id;
                }
            }
        }
    }

    /// Walk the parent chain starting at (but excluding) `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            current: self.parent(id),
        }
    }
}

/// Iterator over a node's ancestors, innermost first.
pub struct Ancestors<'a> {
    arena: &'a AstArena,
    current: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if !self.current.is_valid() {
            return None;
        }
        let id = self.current;
        self.current = self.arena.parent(id);
        Some(id)
    }
}
