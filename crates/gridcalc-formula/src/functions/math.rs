//! Aggregate math functions

use super::resolve_args;
use crate::error::FormulaResult;
use gridcalc_core::CellTable;

/// SUM function
///
/// Non-numeric and missing cells add 0.
pub fn fn_sum(args: &str, cells: &CellTable) -> FormulaResult<f64> {
    Ok(resolve_args(args, cells).numbers().sum())
}

/// AVERAGE function
///
/// Divides by the number of referenced cells, numeric, text or missing. No
/// references at all gives 0.
pub fn fn_average(args: &str, cells: &CellTable) -> FormulaResult<f64> {
    let resolved = resolve_args(args, cells);
    if resolved.referenced == 0 {
        return Ok(0.0);
    }

    let sum: f64 = resolved.numbers().sum();
    Ok(sum / resolved.referenced as f64)
}

/// COUNT function
///
/// Counts non-empty cells, whatever their content.
pub fn fn_count(args: &str, cells: &CellTable) -> FormulaResult<f64> {
    Ok(resolve_args(args, cells).non_empty() as f64)
}

/// MIN function
pub fn fn_min(args: &str, cells: &CellTable) -> FormulaResult<f64> {
    Ok(resolve_args(args, cells)
        .numbers()
        .reduce(f64::min)
        .unwrap_or(0.0))
}

/// MAX function
pub fn fn_max(args: &str, cells: &CellTable) -> FormulaResult<f64> {
    Ok(resolve_args(args, cells)
        .numbers()
        .reduce(f64::max)
        .unwrap_or(0.0))
}
