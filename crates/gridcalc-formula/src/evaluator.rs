//! Formula evaluator
//!
//! Evaluates formula ASTs against a cell table.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{parse_number, FunctionRegistry};
use crate::parser::parse_formula;
use ahash::AHashSet;
use gridcalc_core::{CellAddress, CellRange, CellTable};
use std::fmt;
use std::sync::OnceLock;

/// Text stored in a cell whose formula failed to evaluate
pub const ERROR_SENTINEL: &str = "#ERROR!";

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The process-wide registry of built-in functions
pub fn function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Outcome of evaluating a cell's text
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaOutput {
    /// Input that is not a formula, returned unchanged
    Text(String),
    /// Numeric result of a formula
    Number(f64),
    /// The formula could not be evaluated
    Error,
}

impl FormulaOutput {
    /// Numeric result, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaOutput::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Check if evaluation failed
    pub fn is_error(&self) -> bool {
        matches!(self, FormulaOutput::Error)
    }
}

impl fmt::Display for FormulaOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaOutput::Text(s) => f.write_str(s),
            // Shortest round-trip form; negative zero prints as 0
            FormulaOutput::Number(n) if *n == 0.0 => f.write_str("0"),
            FormulaOutput::Number(n) => write!(f, "{}", n),
            FormulaOutput::Error => f.write_str(ERROR_SENTINEL),
        }
    }
}

/// Evaluate cell text against a cell table
///
/// Text not starting with `=` is returned unchanged. Any failure (syntax,
/// unknown function, division by zero, non-finite result) yields
/// [`FormulaOutput::Error`]; nothing panics or propagates.
///
/// # Example
/// ```rust
/// use gridcalc_core::CellTable;
/// use gridcalc_formula::{evaluate, FormulaOutput};
///
/// let cells = CellTable::from_inputs([("A1", "4")]).unwrap();
/// assert_eq!(evaluate("=a1/8", &cells), FormulaOutput::Number(0.5));
/// assert_eq!(evaluate("=1/0", &cells), FormulaOutput::Error);
/// ```
pub fn evaluate(formula: &str, cells: &CellTable) -> FormulaOutput {
    if !formula.starts_with('=') {
        return FormulaOutput::Text(formula.to_string());
    }

    match parse_formula(formula).and_then(|expr| evaluate_expr(&expr, cells)) {
        Ok(n) => FormulaOutput::Number(n),
        Err(e) => {
            log::trace!("formula {:?} failed: {}", formula, e);
            FormulaOutput::Error
        }
    }
}

/// Evaluate a parsed expression
///
/// Cell references read the cell's calculated value, else its raw input,
/// as a number; absent or non-numeric cells count as 0.
pub fn evaluate_expr(expr: &FormulaExpr, cells: &CellTable) -> FormulaResult<f64> {
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::CellRef(addr) => Ok(parse_number(cells.value_at(addr)).unwrap_or(0.0)),

        FormulaExpr::BinaryOp { op, left, right } => {
            evaluate_binary_op(*op, left, right, cells)
        }

        FormulaExpr::UnaryOp { op, operand } => {
            let value = evaluate_expr(operand, cells)?;
            match op {
                UnaryOperator::Negate => Ok(-value),
            }
        }

        FormulaExpr::Function { name, args } => evaluate_function(name, args, cells),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    cells: &CellTable,
) -> FormulaResult<f64> {
    let l = evaluate_expr(left, cells)?;
    let r = evaluate_expr(right, cells)?;

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            l / r
        }
    };

    finite(result)
}

/// Evaluate a function call
fn evaluate_function(name: &str, args: &str, cells: &CellTable) -> FormulaResult<f64> {
    let def = function_registry()
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    finite((def.implementation)(args, cells)?)
}

fn finite(n: f64) -> FormulaResult<f64> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(FormulaError::NonFinite)
    }
}

/// Every cell an expression reads, in order of first appearance
///
/// Direct references are always listed. Function arguments are resolved the
/// way the functions resolve them, and a range contributes the cells of it
/// that are stored in `cells`; the rest read as empty and cannot depend on
/// anything.
pub fn references(expr: &FormulaExpr, cells: &CellTable) -> Vec<CellAddress> {
    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    collect_references(expr, cells, &mut seen, &mut out);
    out
}

fn collect_references(
    expr: &FormulaExpr,
    cells: &CellTable,
    seen: &mut AHashSet<CellAddress>,
    out: &mut Vec<CellAddress>,
) {
    match expr {
        FormulaExpr::Number(_) => {}
        FormulaExpr::CellRef(addr) => {
            if seen.insert(*addr) {
                out.push(*addr);
            }
        }
        FormulaExpr::BinaryOp { left, right, .. } => {
            collect_references(left, cells, seen, out);
            collect_references(right, cells, seen, out);
        }
        FormulaExpr::UnaryOp { operand, .. } => collect_references(operand, cells, seen, out),
        FormulaExpr::Function { args, .. } => {
            for range in args.split(',').filter_map(|piece| CellRange::parse(piece).ok()) {
                for (addr, _) in cells.cells_in(&range) {
                    if seen.insert(addr) {
                        out.push(addr);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> String {
        eval_with(formula, &CellTable::new())
    }

    fn eval_with(formula: &str, cells: &CellTable) -> String {
        evaluate(formula, cells).to_string()
    }

    fn addrs(refs: &[&str]) -> Vec<CellAddress> {
        refs.iter().map(|r| CellAddress::parse(r).unwrap()).collect()
    }

    #[test]
    fn test_evaluate_literal_arithmetic() {
        assert_eq!(eval("=1+2*3"), "7");
        assert_eq!(eval("=(1+2)*3"), "9");
        assert_eq!(eval("=10/4"), "2.5");
        assert_eq!(eval("=2-5"), "-3");
        assert_eq!(eval("=-(2+3)"), "-5");
        assert_eq!(eval("=0.1+0.2"), "0.30000000000000004");
        assert_eq!(eval("=1e3/1e1"), "100");
    }

    #[test]
    fn test_negative_zero_renders_as_zero() {
        assert_eq!(evaluate("=-0", &CellTable::new()), FormulaOutput::Number(-0.0));
        assert_eq!(eval("=-0"), "0");
        assert_eq!(eval("=0*-1"), "0");
    }

    #[test]
    fn test_non_formula_passthrough() {
        assert_eq!(
            evaluate("hello", &CellTable::new()),
            FormulaOutput::Text("hello".into())
        );
        assert_eq!(eval("42"), "42");
        assert_eq!(eval(""), "");
        assert_eq!(eval(" =1+1"), " =1+1");
    }

    #[test]
    fn test_cell_references() {
        let mut cells =
            CellTable::from_inputs([("A1", "10"), ("A2", "abc"), ("A3", "=A1*2")]).unwrap();
        assert_eq!(eval_with("=A1+1", &cells), "11");
        assert_eq!(eval_with("=a1*b7", &cells), "0");
        assert_eq!(eval_with("=A2+5", &cells), "5");

        // Uncalculated formula cells read as their raw input, which is not numeric
        assert_eq!(eval_with("=A3+1", &cells), "1");
        cells.get_mut("A3").unwrap().set_calculated_value("20");
        assert_eq!(eval_with("=A3+1", &cells), "21");
    }

    #[test]
    fn test_functions() {
        let cells = CellTable::from_inputs([("A1", "10"), ("A2", "20"), ("A3", "x")]).unwrap();
        assert_eq!(eval_with("=SUM(A1:A3)", &cells), "30");
        assert_eq!(eval_with("=sum(a1:a2)/2", &cells), "15");
        assert_eq!(eval_with("=AVERAGE(A1:A2)", &cells), "15");
        assert_eq!(eval_with("=COUNT(A1:A5)", &cells), "3");
        assert_eq!(eval_with("=MAX(A1:A3)-MIN(A1:A3)", &cells), "10");
        assert_eq!(eval_with("=SUM(A1, A2) + A1", &cells), "40");
        assert_eq!(eval_with("=AVERAGE(B1:B3)", &cells), "0");
    }

    #[test]
    fn test_errors_become_sentinel() {
        let cells = CellTable::new();
        for formula in [
            "=A1+*2",
            "=FOO(A1)",
            "=1/0",
            "=A1/B1",
            "=(1",
            "=",
            "=hello",
            "=1e308*10",
        ] {
            assert_eq!(evaluate(formula, &cells), FormulaOutput::Error, "{}", formula);
            assert_eq!(eval_with(formula, &cells), ERROR_SENTINEL);
        }
    }

    #[test]
    fn test_references() {
        let cells = CellTable::from_inputs([("B1", "1"), ("B2", "2")]).unwrap();
        let expr = parse_formula("=A1+SUM(B1:B3, A1, junk)*C3").unwrap();
        assert_eq!(references(&expr, &cells), addrs(&["A1", "B1", "B2", "C3"]));

        let expr = parse_formula("=1+2").unwrap();
        assert!(references(&expr, &cells).is_empty());
    }

    #[test]
    fn test_references_whole_sheet_range() {
        let cells = CellTable::from_inputs([("A1", "1"), ("D7", "=A1")]).unwrap();
        let expr = parse_formula("=MAX(A1:XFD1048576)").unwrap();
        assert_eq!(references(&expr, &cells), addrs(&["A1", "D7"]));
    }
}
