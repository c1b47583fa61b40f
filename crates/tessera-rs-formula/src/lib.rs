//! Named arithmetic formulas for game balance.
//!
//! Formulas are plain expressions over named scalars: decimal literals,
//! variables, `+ - * /`, unary minus, parentheses and a fixed set of math
//! functions. Text is compiled once on registration into an expression tree
//! and evaluated against caller-supplied bindings.

mod ast;
mod engine;
mod error;
mod lexer;
mod parser;

/// Expression tree types and variable bindings.
pub use ast::{Arity, BinaryOp, Expr, Function, Variables};
/// Formula registry.
pub use engine::{FORMULAS_SECTION, Formula, FormulaEngine, required_variables};
/// Public error type returned by formula parsing and evaluation.
pub use error::FormulaError;
/// Formula text parser.
pub use parser::{MAX_DEPTH, parse};
