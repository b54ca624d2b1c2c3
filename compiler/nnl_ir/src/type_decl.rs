//! The NNL type lattice.
//!
//! Type inference is deliberately small: every expression yields one of the
//! variants below. `Var` is the top of the lattice (any neuron or list of
//! neurons), `None` means "produces no value".

use std::fmt;

/// Declared or inferred type of an NNL expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeDecl {
    Var,
    Int,
    Double,
    Bool,
    String,
    IntArray,
    DoubleArray,
    StringArray,
    None,
}

impl TypeDecl {
    /// Returns `true` if the type produces a value.
    #[inline]
    pub const fn has_value(self) -> bool {
        !matches!(self, TypeDecl::None)
    }

    /// Returns `true` for `Int` and `Double`.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, TypeDecl::Int | TypeDecl::Double)
    }

    /// The array type whose elements have this type, if any.
    pub const fn array_of(self) -> Option<TypeDecl> {
        match self {
            TypeDecl::Int => Some(TypeDecl::IntArray),
            TypeDecl::Double => Some(TypeDecl::DoubleArray),
            TypeDecl::String => Some(TypeDecl::StringArray),
            _ => None,
        }
    }

    /// The element type of an array type.
    pub const fn element(self) -> Option<TypeDecl> {
        match self {
            TypeDecl::IntArray => Some(TypeDecl::Int),
            TypeDecl::DoubleArray => Some(TypeDecl::Double),
            TypeDecl::StringArray => Some(TypeDecl::String),
            _ => None,
        }
    }

    /// Source keyword for this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeDecl::Var => "var",
            TypeDecl::Int => "int",
            TypeDecl::Double => "double",
            TypeDecl::Bool => "bool",
            TypeDecl::String => "string",
            TypeDecl::IntArray => "int[]",
            TypeDecl::DoubleArray => "double[]",
            TypeDecl::StringArray => "string[]",
            TypeDecl::None => "void",
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
