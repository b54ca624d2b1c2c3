//! Operators and small tag enums used by AST nodes.
//!
//! All types are `Copy` so that `AstKind` can be copied out of the arena
//! during lowering without holding a borrow.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    // Assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    /// `&=`: intersection of neuron lists.
    AndAssign,
    /// `|=`: union of neuron lists.
    OrAssign,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Containment
    Contains,
    NotContains,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Contains => "contains",
            Self::NotContains => "!contains",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// `=` and every compound assignment.
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::DivAssign
                | Self::ModAssign
                | Self::AndAssign
                | Self::OrAssign
        )
    }

    /// The arithmetic operator a compound assignment applies, if any.
    ///
    /// `&=` and `|=` are list operations and have no arithmetic counterpart.
    pub const fn compound_operator(self) -> Option<BinaryOp> {
        match self {
            Self::AddAssign => Some(Self::Add),
            Self::SubAssign => Some(Self::Sub),
            Self::MulAssign => Some(Self::Mul),
            Self::DivAssign => Some(Self::Div),
            Self::ModAssign => Some(Self::Mod),
            _ => None,
        }
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    pub const fn is_containment(self) -> bool {
        matches!(self, Self::Contains | Self::NotContains)
    }

    /// `&&` and `||`.
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// The four kinds of externally resolved binding paths.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BindingKind {
    Variable,
    Thesaurus,
    Asset,
    Topic,
}

impl BindingKind {
    /// Source sigil of the binding read operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Variable => "$",
            Self::Thesaurus => "^",
            Self::Asset => "#",
            Self::Topic => "~",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Negate,
    Not,
    /// `ref x`: pass the variable itself instead of its content.
    ByRef,
    /// Read through a binding path (`$a.b`, `^a.b`, `#a.b`, `~a.b`).
    BindingRead(BindingKind),
    /// Postfix `++`.
    Increment,
    /// Postfix `--`.
    Decrement,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
            Self::ByRef => "ref",
            Self::BindingRead(kind) => kind.as_symbol(),
            Self::Increment => "++",
            Self::Decrement => "--",
        }
    }
}

/// Storage class of a declared variable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclScope {
    /// Local to one execution frame.
    Local,
    /// Shared by every frame of the module's processor.
    Var,
    /// Shared across processors.
    Global,
}

/// What happens to a variable's value when a processor splits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitReaction {
    Copy,
    Shared,
    Empty,
}

/// Flavour of a conditional statement.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionalStyle {
    If,
    Do,
    While,
    Switch,
    LoopedSwitch,
}

impl ConditionalStyle {
    /// Styles whose body runs repeatedly.
    pub const fn is_looped(self) -> bool {
        matches!(self, Self::Do | Self::While | Self::LoopedSwitch)
    }

    /// Styles keyed on a case value instead of boolean conditions.
    pub const fn is_switch(self) -> bool {
        matches!(self, Self::Switch | Self::LoopedSwitch)
    }
}

/// What a `select` loop iterates over.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryStyle {
    Children,
    Clusters,
    LinksIn,
    LinksOut,
    /// A user supplied query expression.
    Custom,
}

/// Whether a code list holds parameters or statements.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeListMode {
    Params,
    Statements,
}
