//! The closed set of AST node kinds.

use crate::{Name, TypeDecl};

use super::operators::{
    BinaryOp, CodeListMode, ConditionalStyle, DeclScope, QueryStyle, SplitReaction, UnaryOp,
};
use super::{NodeId, NodeRange, TypeRange};

/// Kind of an AST node.
///
/// `Copy` so lowering can take it out of the arena while mutating its own
/// state. Optional children use [`NodeId::INVALID`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AstKind {
    // Leaf / reference nodes
    Int(i64),
    /// Double literal stored as raw bits.
    Double(u64),
    Str(Name),
    /// A named neuron (`'word`), shared through the graph's static table.
    Symbol(Name),
    /// A name resolved through the enclosing scope chain.
    Ref(Name),
    /// `using alias = target;`
    Using {
        alias: Name,
        target: Name,
    },

    // Declarations
    /// `local|var|global <ty> name [= init] [, sub...] [: split]`
    ///
    /// `subs` holds further `VarDecl`s that share this declaration's single
    /// initializer.
    VarDecl {
        name: Name,
        ty: TypeDecl,
        scope: DeclScope,
        init: NodeId,
        subs: NodeRange,
        split: Option<SplitReaction>,
    },

    // Operators
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    /// Dotted path read through a binding operator. Segments are `Ref` nodes.
    Path {
        segments: NodeRange,
    },
    Call {
        callee: NodeId,
        args: NodeRange,
        /// The caller blocks until the callee finished.
        blocked: bool,
    },

    // Control
    Conditional {
        style: ConditionalStyle,
        /// Switch styles only.
        case_value: NodeId,
        /// `ConditionalPart` nodes.
        parts: NodeRange,
    },
    ConditionalPart {
        /// Invalid for the trailing `else`/`default` part.
        condition: NodeId,
        body: NodeId,
    },
    For {
        init: NodeId,
        condition: NodeId,
        increment: NodeId,
        body: NodeId,
    },
    ForEach {
        variable: NodeId,
        source: NodeId,
        body: NodeId,
    },
    Select {
        variables: NodeRange,
        source: NodeId,
        style: QueryStyle,
        body: NodeId,
    },
    Lock {
        targets: NodeRange,
        link_targets: NodeRange,
        body: NodeId,
    },
    Return {
        values: NodeRange,
    },

    // Aggregates
    Function {
        name: Name,
        /// `CodeList` in `Params` mode.
        params: NodeId,
        returns: TypeRange,
        /// `CodeList` in `Statements` mode.
        body: NodeId,
        inline: bool,
    },
    Class {
        name: Name,
        /// Relation the class cluster represents; `Name::EMPTY` for plain classes.
        meaning: Name,
        items: NodeRange,
    },
    CodeList {
        mode: CodeListMode,
        items: NodeRange,
    },
    List {
        items: NodeRange,
    },
    Union {
        items: NodeRange,
    },
    /// `link from -> meaning -> to;`
    Link {
        from: NodeId,
        meaning: NodeId,
        to: NodeId,
    },

    /// Parse error placeholder.
    Error,
}

impl AstKind {
    /// Short human readable name, used in diagnostics and traces.
    pub const fn describe(&self) -> &'static str {
        match self {
            AstKind::Int(_) => "integer literal",
            AstKind::Double(_) => "double literal",
            AstKind::Str(_) => "string literal",
            AstKind::Symbol(_) => "symbol",
            AstKind::Ref(_) => "reference",
            AstKind::Using { .. } => "using declaration",
            AstKind::VarDecl { .. } => "variable declaration",
            AstKind::Unary { .. } => "unary expression",
            AstKind::Binary { .. } => "binary expression",
            AstKind::Path { .. } => "binding path",
            AstKind::Call { .. } => "function call",
            AstKind::Conditional { .. } => "conditional statement",
            AstKind::ConditionalPart { .. } => "conditional part",
            AstKind::For { .. } => "for loop",
            AstKind::ForEach { .. } => "foreach loop",
            AstKind::Select { .. } => "select loop",
            AstKind::Lock { .. } => "lock statement",
            AstKind::Return { .. } => "return statement",
            AstKind::Function { .. } => "function",
            AstKind::Class { .. } => "class",
            AstKind::CodeList { .. } => "code list",
            AstKind::List { .. } => "list expression",
            AstKind::Union { .. } => "union expression",
            AstKind::Link { .. } => "link declaration",
            AstKind::Error => "error",
        }
    }

    /// Declarations that introduce a name into their enclosing scope.
    pub const fn declared_name(&self) -> Option<Name> {
        match *self {
            AstKind::VarDecl { name, .. }
            | AstKind::Function { name, .. }
            | AstKind::Class { name, .. } => Some(name),
            AstKind::Using { alias, .. } => Some(alias),
            _ => None,
        }
    }
}
