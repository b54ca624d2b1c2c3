//! Built-in instructions and their return types.
//!
//! Every instruction is a single shared graph node (see
//! [`GraphStore::instruction`](crate::GraphStore::instruction)). Statements and
//! result statements link to it through [`Relation::Instruction`](crate::Relation::Instruction).

use nnl_ir::TypeDecl;

/// An instruction the execution engine knows how to run.
///
/// Arithmetic comes in three flavours: an `Int`-specialized, a
/// `Double`-specialized and a generic one that inspects its operands at run
/// time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Instruction {
    AddInt,
    AddDouble,
    Add,
    SubtractInt,
    SubtractDouble,
    Subtract,
    MultiplyInt,
    MultiplyDouble,
    Multiply,
    DivideInt,
    DivideDouble,
    Divide,
    ModulusInt,
    ModulusDouble,
    Modulus,
    MinusInt,
    MinusDouble,
    Minus,
    Not,
    Union,
    Intersect,

    // Calls and the value stack
    Call,
    BlockedCall,
    PushValue,
    PopValue,
    ReturnValue,
    Return,

    // Jumps, relative to the jump statement itself
    Jump,
    JumpIfTrue,
    JumpIfFalse,

    AddLink,
}

impl Instruction {
    /// Type of the value a result statement over this instruction produces.
    ///
    /// `None` for instructions that only have side effects; they can only
    /// appear as plain statements.
    pub const fn return_type(self) -> TypeDecl {
        match self {
            Self::AddInt
            | Self::SubtractInt
            | Self::MultiplyInt
            | Self::DivideInt
            | Self::ModulusInt
            | Self::MinusInt => TypeDecl::Int,
            Self::AddDouble
            | Self::SubtractDouble
            | Self::MultiplyDouble
            | Self::DivideDouble
            | Self::ModulusDouble
            | Self::MinusDouble => TypeDecl::Double,
            Self::Not => TypeDecl::Bool,
            Self::Add
            | Self::Subtract
            | Self::Multiply
            | Self::Divide
            | Self::Modulus
            | Self::Minus
            | Self::Union
            | Self::Intersect
            | Self::PopValue => TypeDecl::Var,
            Self::Call
            | Self::BlockedCall
            | Self::PushValue
            | Self::ReturnValue
            | Self::Return
            | Self::Jump
            | Self::JumpIfTrue
            | Self::JumpIfFalse
            | Self::AddLink => TypeDecl::None,
        }
    }

    /// Jumps carry their offset in a [`NodeKind::JumpTarget`](crate::NodeKind::JumpTarget) argument.
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::Jump | Self::JumpIfTrue | Self::JumpIfFalse)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddInt => "AddInt",
            Self::AddDouble => "AddDouble",
            Self::Add => "Add",
            Self::SubtractInt => "SubtractInt",
            Self::SubtractDouble => "SubtractDouble",
            Self::Subtract => "Subtract",
            Self::MultiplyInt => "MultiplyInt",
            Self::MultiplyDouble => "MultiplyDouble",
            Self::Multiply => "Multiply",
            Self::DivideInt => "DivideInt",
            Self::DivideDouble => "DivideDouble",
            Self::Divide => "Divide",
            Self::ModulusInt => "ModulusInt",
            Self::ModulusDouble => "ModulusDouble",
            Self::Modulus => "Modulus",
            Self::MinusInt => "MinusInt",
            Self::MinusDouble => "MinusDouble",
            Self::Minus => "Minus",
            Self::Not => "Not",
            Self::Union => "Union",
            Self::Intersect => "Intersect",
            Self::Call => "Call",
            Self::BlockedCall => "BlockedCall",
            Self::PushValue => "PushValue",
            Self::PopValue => "PopValue",
            Self::ReturnValue => "ReturnValue",
            Self::Return => "Return",
            Self::Jump => "Jump",
            Self::JumpIfTrue => "JumpIfTrue",
            Self::JumpIfFalse => "JumpIfFalse",
            Self::AddLink => "AddLink",
        }
    }
}
