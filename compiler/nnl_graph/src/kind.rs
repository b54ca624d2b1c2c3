//! Node kinds, link relations and well-known sentinel nodes.

use nnl_ir::{DeclScope, Name, QueryStyle, SplitReaction, TypeDecl};

use crate::Instruction;

/// Tag of a typed link, and the meaning of a cluster.
///
/// The same vocabulary serves both purposes: a statement links to its
/// argument cluster through `Arguments`, and that cluster's meaning is
/// `Arguments` as well.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    Instruction,
    Arguments,
    LeftPart,
    RightPart,
    /// Operand of a by-reference node.
    Value,
    Operator,
    /// Condition of a conditional expression, or the cluster of conditional
    /// expressions of a conditional statement.
    Condition,
    /// Code executed by a conditional expression, or the pre-condition code
    /// of a loop.
    Statements,
    LoopStyle,
    CaseItem,
    LoopItem,
    /// Ordered statements of a function.
    Code,
    /// Parameter variables of a function.
    Parameters,
    List,
    Union,
    LockTargets,
    LinkTargets,
    SplitReaction,
    /// Plain class cluster.
    Class,
    /// Class cluster representing a user relation.
    Custom(Name),
}

/// Comparison and logical operators of a [`NodeKind::BoolExpression`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolOperator {
    Equal,
    Different,
    Smaller,
    SmallerOrEqual,
    Bigger,
    BiggerOrEqual,
    Contains,
    NotContains,
    And,
    Or,
}

/// How a conditional statement evaluates its parts.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LoopStyle {
    /// `if`: first matching part runs once.
    Normal,
    /// `while`: repeat while a part matches.
    Looped,
    /// `do`: like `Looped`, but the first part runs before the first check.
    Until,
    /// `switch`: the part whose condition equals the case item runs.
    Case,
    /// Looped `switch`.
    CaseLooped,
    For,
    ForEach,
    QueryLoop(QueryStyle),
}

/// Sentinel nodes shared by every module. Created lazily, exactly once.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum WellKnown {
    /// Stand-in for anything that failed to render.
    Empty,
    /// The value most recently returned by a call or a `ReturnValue` statement.
    ReturnValue,
    True,
    False,
    Operator(BoolOperator),
    Style(LoopStyle),
    Split(SplitReaction),
}

/// Keys of the store's value index.
///
/// Nodes created through a static key exist at most once per store.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StaticKey {
    Int(i64),
    /// Raw bits of an `f64`.
    Double(u64),
    Text(Name),
    Symbol(Name),
    /// Resolved jump offset, relative to the jump statement.
    JumpTarget(i32),
    Instruction(Instruction),
    WellKnown(WellKnown),
}

/// What a graph node represents.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Reserved slot whose content is not known yet.
    Temporary,
    Int(i64),
    Double(u64),
    Text(Name),
    /// A named neuron.
    Symbol(Name),
    JumpTarget(i32),
    Instruction(Instruction),
    WellKnown(WellKnown),
    /// Ordered children plus a meaning.
    Cluster(Relation),
    Variable {
        scope: DeclScope,
        ty: TypeDecl,
    },
    /// Executes an instruction over an argument cluster.
    Statement,
    /// Like `Statement`, but produces a value.
    ResultStatement,
    /// `LeftPart = RightPart`.
    Assignment,
    /// `LeftPart Operator RightPart`.
    BoolExpression,
    ConditionalStatement,
    ConditionalExpression,
    /// Pass a variable itself instead of its value.
    ByRef,
    Lock,
}

impl NodeKind {
    /// Value-index key for kinds that exist once per value.
    pub const fn static_key(self) -> Option<StaticKey> {
        match self {
            NodeKind::Int(v) => Some(StaticKey::Int(v)),
            NodeKind::Double(v) => Some(StaticKey::Double(v)),
            NodeKind::Text(v) => Some(StaticKey::Text(v)),
            NodeKind::Symbol(v) => Some(StaticKey::Symbol(v)),
            NodeKind::JumpTarget(v) => Some(StaticKey::JumpTarget(v)),
            NodeKind::Instruction(v) => Some(StaticKey::Instruction(v)),
            NodeKind::WellKnown(v) => Some(StaticKey::WellKnown(v)),
            _ => None,
        }
    }

    pub const fn is_cluster(self) -> bool {
        matches!(self, NodeKind::Cluster(_))
    }

    /// Nodes the engine can execute as a statement.
    pub const fn is_executable(self) -> bool {
        matches!(
            self,
            NodeKind::Statement
                | NodeKind::ResultStatement
                | NodeKind::Assignment
                | NodeKind::ConditionalStatement
                | NodeKind::Lock
        )
    }
}

impl From<StaticKey> for NodeKind {
    fn from(key: StaticKey) -> Self {
        match key {
            StaticKey::Int(v) => NodeKind::Int(v),
            StaticKey::Double(v) => NodeKind::Double(v),
            StaticKey::Text(v) => NodeKind::Text(v),
            StaticKey::Symbol(v) => NodeKind::Symbol(v),
            StaticKey::JumpTarget(v) => NodeKind::JumpTarget(v),
            StaticKey::Instruction(v) => NodeKind::Instruction(v),
            StaticKey::WellKnown(v) => NodeKind::WellKnown(v),
        }
    }
}
