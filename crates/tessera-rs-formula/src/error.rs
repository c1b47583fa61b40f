//! Error types for formula parsing and evaluation.

use thiserror::Error;

/// Errors returned by formula compilation and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// No formula is registered under the requested name.
    #[error("formula not found: {0}")]
    NotFound(String),
    /// The expression references a variable that was not bound.
    #[error("missing variable: {0}")]
    MissingVariable(String),
    /// A division had a zero denominator.
    #[error("division by zero")]
    DivisionByZero,
    /// The expression text is malformed.
    #[error("parse error at offset {position}: {message}")]
    Parse { position: usize, message: String },
    /// A call names a function outside the supported set.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// A function was called with the wrong number of arguments.
    #[error("function {function} expects {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },
    /// Evaluation produced NaN or an infinity.
    #[error("formula result is not a finite number")]
    NonFinite,
}

impl FormulaError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}
