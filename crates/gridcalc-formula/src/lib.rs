//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → number, or the `#ERROR!` sentinel)
//! - The built-in aggregate functions (SUM, AVERAGE, COUNT, MIN, MAX)
//! - Dependency tracking for ordered recalculation
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::CellTable;
//! use gridcalc_formula::evaluate;
//!
//! let cells = CellTable::from_inputs([("A1", "10"), ("A2", "20")]).unwrap();
//! assert_eq!(evaluate("=SUM(A1:A2)*2", &cells).to_string(), "60");
//! assert_eq!(evaluate("=A1+*2", &cells).to_string(), "#ERROR!");
//! assert_eq!(evaluate("plain text", &cells).to_string(), "plain text");
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::{DependencyGraph, EvaluationOrder};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    evaluate, evaluate_expr, function_registry, references, FormulaOutput, ERROR_SENTINEL,
};
pub use functions::{FunctionDef, FunctionRegistry};
pub use parser::parse_formula;
