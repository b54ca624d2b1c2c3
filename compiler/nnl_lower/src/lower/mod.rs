//! AST → graph lowering, one file per construct family.
//!
//! - `expr`: the dispatch, literals, references and binding reads
//! - `operators`: unary and binary operators, assignments
//! - `booleans`: short-circuit `&&` / `||` with calls in their operands
//! - `calls`: argument passing, inline expansion
//! - `decl`: variables, functions, classes
//! - `aggregates`: code lists, lists, unions, links, `return`, `lock`
//! - `control_flow`: conditionals, `for`, `foreach`, `select`

mod aggregates;
mod booleans;
mod calls;
mod control_flow;
mod decl;
mod expr;
mod operators;

#[cfg(test)]
mod tests;
