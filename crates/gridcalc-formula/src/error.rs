//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
///
/// None of these escape a cell: the evaluator turns every one of them into
/// the `#ERROR!` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Result is infinite or NaN
    #[error("Result is not a finite number")]
    NonFinite,
}
