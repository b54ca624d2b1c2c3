//! Hand assembly of ASTs.
//!
//! [`AstBuilder`] is for tests and tools that produce trees without the
//! parser. Every node gets its own source line, so diagnostics for
//! different nodes never share a position.

use crate::{Name, Span, StringInterner, TypeDecl};

use super::{
    AstArena, AstKind, BinaryOp, BindingKind, CodeListMode, ConditionalStyle, DeclScope, NodeId,
    NodeRange, QueryStyle, SplitReaction, UnaryOp,
};

/// Builder over an [`AstArena`]. Call [`finish`](Self::finish) last.
pub struct AstBuilder<'a> {
    arena: AstArena,
    interner: &'a StringInterner,
    line: u32,
}

impl<'a> AstBuilder<'a> {
    pub fn new(interner: &'a StringInterner, file: &str) -> Self {
        AstBuilder {
            arena: AstArena::new(interner.intern(file)),
            interner,
            line: 0,
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Allocate a node on the next source line.
    pub fn node(&mut self, kind: AstKind) -> NodeId {
        self.line += 1;
        self.arena.alloc(kind, Span::on_line(self.line, 1, 2))
    }

    fn list(&mut self, ids: &[NodeId]) -> NodeRange {
        self.arena.alloc_list(ids)
    }

    // Leaves

    pub fn int(&mut self, value: i64) -> NodeId {
        self.node(AstKind::Int(value))
    }

    pub fn double(&mut self, value: f64) -> NodeId {
        self.node(AstKind::Double(value.to_bits()))
    }

    pub fn text(&mut self, value: &str) -> NodeId {
        let name = self.name(value);
        self.node(AstKind::Str(name))
    }

    pub fn symbol(&mut self, word: &str) -> NodeId {
        let name = self.name(word);
        self.node(AstKind::Symbol(name))
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        let name = self.name(name);
        self.node(AstKind::Ref(name))
    }

    pub fn using(&mut self, alias: &str, target: &str) -> NodeId {
        let alias = self.name(alias);
        let target = self.name(target);
        self.node(AstKind::Using { alias, target })
    }

    pub fn error(&mut self) -> NodeId {
        self.node(AstKind::Error)
    }

    // Declarations

    /// `local|var|global <ty> name [= init]`.
    pub fn var(
        &mut self,
        scope: DeclScope,
        ty: TypeDecl,
        name: &str,
        init: Option<NodeId>,
    ) -> NodeId {
        self.var_full(scope, ty, name, init, &[], None)
    }

    /// A local variable.
    pub fn local(&mut self, ty: TypeDecl, name: &str, init: Option<NodeId>) -> NodeId {
        self.var(DeclScope::Local, ty, name, init)
    }

    pub fn var_full(
        &mut self,
        scope: DeclScope,
        ty: TypeDecl,
        name: &str,
        init: Option<NodeId>,
        subs: &[NodeId],
        split: Option<SplitReaction>,
    ) -> NodeId {
        let name = self.name(name);
        let subs = self.list(subs);
        self.node(AstKind::VarDecl {
            name,
            ty,
            scope,
            init: init.unwrap_or(NodeId::INVALID),
            subs,
            split,
        })
    }

    // Operators

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.node(AstKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.node(AstKind::Binary { op, left, right })
    }

    pub fn assign(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(BinaryOp::Assign, left, right)
    }

    pub fn path(&mut self, segments: &[&str]) -> NodeId {
        let ids: Vec<NodeId> = segments.iter().map(|s| self.ident(s)).collect();
        let segments = self.list(&ids);
        self.node(AstKind::Path { segments })
    }

    /// `$a.b` and friends.
    pub fn binding(&mut self, kind: BindingKind, segments: &[&str]) -> NodeId {
        let path = self.path(segments);
        self.unary(UnaryOp::BindingRead(kind), path)
    }

    /// Call of a function by name.
    pub fn call(&mut self, callee: &str, args: &[NodeId]) -> NodeId {
        let callee = self.ident(callee);
        self.call_node(callee, args, false)
    }

    pub fn call_node(&mut self, callee: NodeId, args: &[NodeId], blocked: bool) -> NodeId {
        let args = self.list(args);
        self.node(AstKind::Call {
            callee,
            args,
            blocked,
        })
    }

    // Control

    pub fn part(&mut self, condition: Option<NodeId>, body: NodeId) -> NodeId {
        self.node(AstKind::ConditionalPart {
            condition: condition.unwrap_or(NodeId::INVALID),
            body,
        })
    }

    pub fn conditional(
        &mut self,
        style: ConditionalStyle,
        case_value: Option<NodeId>,
        parts: &[NodeId],
    ) -> NodeId {
        let parts = self.list(parts);
        self.node(AstKind::Conditional {
            style,
            case_value: case_value.unwrap_or(NodeId::INVALID),
            parts,
        })
    }

    /// `if (condition) then [else otherwise]`.
    pub fn if_else(&mut self, condition: NodeId, then: NodeId, otherwise: Option<NodeId>) -> NodeId {
        let mut parts = vec![self.part(Some(condition), then)];
        if let Some(otherwise) = otherwise {
            parts.push(self.part(None, otherwise));
        }
        self.conditional(ConditionalStyle::If, None, &parts)
    }

    pub fn for_loop(
        &mut self,
        init: Option<NodeId>,
        condition: Option<NodeId>,
        increment: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.node(AstKind::For {
            init: init.unwrap_or(NodeId::INVALID),
            condition: condition.unwrap_or(NodeId::INVALID),
            increment: increment.unwrap_or(NodeId::INVALID),
            body,
        })
    }

    pub fn foreach(&mut self, variable: NodeId, source: NodeId, body: NodeId) -> NodeId {
        self.node(AstKind::ForEach {
            variable,
            source,
            body,
        })
    }

    pub fn select(
        &mut self,
        variables: &[NodeId],
        source: NodeId,
        style: QueryStyle,
        body: NodeId,
    ) -> NodeId {
        let variables = self.list(variables);
        self.node(AstKind::Select {
            variables,
            source,
            style,
            body,
        })
    }

    pub fn lock(&mut self, targets: &[NodeId], link_targets: &[NodeId], body: NodeId) -> NodeId {
        let targets = self.list(targets);
        let link_targets = self.list(link_targets);
        self.node(AstKind::Lock {
            targets,
            link_targets,
            body,
        })
    }

    pub fn ret(&mut self, values: &[NodeId]) -> NodeId {
        let values = self.list(values);
        self.node(AstKind::Return { values })
    }

    // Aggregates

    /// A statement list.
    pub fn block(&mut self, items: &[NodeId]) -> NodeId {
        let items = self.list(items);
        self.node(AstKind::CodeList {
            mode: CodeListMode::Statements,
            items,
        })
    }

    pub fn function(
        &mut self,
        name: &str,
        params: &[NodeId],
        returns: &[TypeDecl],
        body: &[NodeId],
    ) -> NodeId {
        self.function_full(name, params, returns, body, false)
    }

    pub fn function_full(
        &mut self,
        name: &str,
        params: &[NodeId],
        returns: &[TypeDecl],
        body: &[NodeId],
        inline: bool,
    ) -> NodeId {
        let name = self.name(name);
        let items = self.list(params);
        let params = self.node(AstKind::CodeList {
            mode: CodeListMode::Params,
            items,
        });
        let returns = self.arena.alloc_types(returns);
        let body = self.block(body);
        self.node(AstKind::Function {
            name,
            params,
            returns,
            body,
            inline,
        })
    }

    pub fn class(&mut self, name: &str, meaning: Option<&str>, items: &[NodeId]) -> NodeId {
        let name = self.name(name);
        let meaning = meaning.map_or(Name::EMPTY, |m| self.name(m));
        let items = self.list(items);
        self.node(AstKind::Class {
            name,
            meaning,
            items,
        })
    }

    pub fn list_expr(&mut self, items: &[NodeId]) -> NodeId {
        let items = self.list(items);
        self.node(AstKind::List { items })
    }

    pub fn union(&mut self, items: &[NodeId]) -> NodeId {
        let items = self.list(items);
        self.node(AstKind::Union { items })
    }

    pub fn link(&mut self, from: NodeId, meaning: NodeId, to: NodeId) -> NodeId {
        self.node(AstKind::Link { from, meaning, to })
    }

    /// Wire parents and hand out the arena.
    pub fn finish(mut self) -> AstArena {
        self.arena.finish();
        self.arena
    }
}
