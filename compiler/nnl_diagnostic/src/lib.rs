//! Diagnostics for the NNL lowering compiler.
//!
//! Lowering never aborts on a user error. Every problem becomes a
//! [`Diagnostic`] carrying an [`ErrorCode`] and a source position; the
//! failed subtree is replaced by a sentinel and compilation continues.
//! The [`DiagnosticQueue`] collects reports, drops duplicates and enforces
//! an error limit.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
