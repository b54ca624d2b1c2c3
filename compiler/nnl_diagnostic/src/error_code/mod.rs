//! Error codes for lowering diagnostics.
//!
//! Each code is a unique identifier (e.g., `E1001`); the first digit groups
//! the kind of failure.

use std::fmt;

/// Error codes for all lowering diagnostics.
///
/// Format: E#### where the first digit indicates the category:
/// - E1xxx: Unresolved references
/// - E2xxx: Type and arity errors
/// - E3xxx: Structural errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Resolution Errors (E1xxx)
    /// Unknown identifier
    E1001,
    /// Unknown binding path
    E1002,
    /// Callee is not a function
    E1003,

    // Type Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Expression does not return a value
    E2002,
    /// Argument count mismatch
    E2003,

    // Structural Errors (E3xxx)
    /// Assignment without a left part
    E3001,
    /// Left part cannot be assigned to
    E3002,
    /// Missing condition on a non-terminal branch
    E3003,
    /// Default case is not the last case
    E3004,
    /// Function call not allowed here
    E3005,
    /// By-reference outside an argument list
    E3006,
    /// Loop header misses a required part
    E3007,

    // Internal Errors (E9xxx)
    /// Internal invariant violation
    E9001,
    /// Jump target never closed
    E9002,
}

impl ErrorCode {
    /// All error codes, in declaration order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E3007,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line description used when no specific message is given.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "unknown identifier",
            ErrorCode::E1002 => "unknown binding",
            ErrorCode::E1003 => "not callable",
            ErrorCode::E2001 => "type mismatch",
            ErrorCode::E2002 => "expression doesn't return a value",
            ErrorCode::E2003 => "wrong number of arguments",
            ErrorCode::E3001 => "missing left part",
            ErrorCode::E3002 => "left part is not assignable",
            ErrorCode::E3003 => "missing condition",
            ErrorCode::E3004 => "default case must be the last case",
            ErrorCode::E3005 => "function call not allowed here",
            ErrorCode::E3006 => "by-reference argument outside of an argument list",
            ErrorCode::E3007 => "missing loop part",
            ErrorCode::E9001 => "internal compiler error",
            ErrorCode::E9002 => "unclosed jump target",
        }
    }

    /// Check if this is a resolution error (E1xxx range).
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003)
    }

    /// Check if this is a type error (E2xxx range).
    pub fn is_type_error(&self) -> bool {
        matches!(self, ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003)
    }

    /// Check if this is a structural error (E3xxx range).
    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001
                | ErrorCode::E3002
                | ErrorCode::E3003
                | ErrorCode::E3004
                | ErrorCode::E3005
                | ErrorCode::E3006
                | ErrorCode::E3007
        )
    }

    /// Check if this is an internal compiler error (E9xxx range).
    ///
    /// These point at a gap in the lowering tables rather than at the user's
    /// code.
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001 | ErrorCode::E9002)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
