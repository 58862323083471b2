//! Recalculation engine
//!
//! Refreshes the calculated value of every formula cell in a cell table.
//!
//! The default [`CalculationMode::SinglePass`] walks the table once in
//! insertion order, evaluating each formula against the table as updated so
//! far. A formula reading a formula cell that comes later sees that cell's
//! previous result. Every cell is evaluated exactly once, so circular
//! references terminate.
//!
//! [`CalculationMode::DependencyOrder`] evaluates every formula after the
//! cells it reads and marks cells on a reference cycle with
//! [`CIRCULAR_SENTINEL`].
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.active_sheet_mut().unwrap();
//! sheet.update_cell("A1", "10").unwrap();
//! sheet.update_cell("A2", "20").unwrap();
//! let stats = sheet.update_cell("A3", "=SUM(A1:A2)").unwrap();
//!
//! assert_eq!(stats.cells_calculated, 1);
//! assert_eq!(sheet.cells().get("A3").unwrap().display_value(), "30");
//! ```

use crate::{evaluate, parse_formula, references, CellAddress, CellTable, Result, Sheet, Workbook};
use ahash::AHashMap;
use gridcalc_formula::DependencyGraph;
use log::{debug, trace, warn};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

/// Text stored in a formula cell that lies on a reference cycle
/// (dependency-ordered mode only)
pub const CIRCULAR_SENTINEL: &str = "#CIRCULAR!";

/// How formula cells are ordered during recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalculationMode {
    /// One pass in insertion order
    #[default]
    SinglePass,
    /// Precedents first; cycles are marked `#CIRCULAR!`
    DependencyOrder,
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CalculationMode::SinglePass => "single-pass",
            CalculationMode::DependencyOrder => "dependency-order",
        })
    }
}

impl FromStr for CalculationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single-pass" | "single" => Ok(CalculationMode::SinglePass),
            "dependency-order" | "dependency" | "ordered" => Ok(CalculationMode::DependencyOrder),
            other => Err(format!(
                "unknown calculation mode '{}' (expected single-pass or dependency-order)",
                other
            )),
        }
    }
}

/// Options for recalculation
#[derive(Debug, Clone, Default)]
pub struct CalculationOptions {
    /// Evaluation order
    pub mode: CalculationMode,
}

impl CalculationOptions {
    /// Options for the given mode
    pub fn with_mode(mode: CalculationMode) -> Self {
        Self { mode }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of cells evaluated
    pub cells_calculated: usize,
    /// Number of cells that ended up as `#ERROR!`
    pub errors: usize,
    /// Number of cells marked `#CIRCULAR!`
    pub circular_references: usize,
}

impl AddAssign for CalculationStats {
    fn add_assign(&mut self, other: Self) {
        self.formula_count += other.formula_count;
        self.cells_calculated += other.cells_calculated;
        self.errors += other.errors;
        self.circular_references += other.circular_references;
    }
}

/// Recalculate a cell table with default options
///
/// The input is left untouched; the returned table has the same cells in the
/// same order with fresh calculated values on every formula cell.
pub fn recalculate(cells: &CellTable) -> CellTable {
    recalculate_with_options(cells, &CalculationOptions::default()).0
}

/// Recalculate a cell table, also returning statistics
pub fn recalculate_with_options(
    cells: &CellTable,
    options: &CalculationOptions,
) -> (CellTable, CalculationStats) {
    let mut out = cells.clone();
    let stats = recalculate_in_place(&mut out, options);
    (out, stats)
}

/// Recalculate a cell table in place
pub fn recalculate_in_place(cells: &mut CellTable, options: &CalculationOptions) -> CalculationStats {
    let stats = match options.mode {
        CalculationMode::SinglePass => single_pass(cells),
        CalculationMode::DependencyOrder => dependency_order(cells),
    };
    trace!(
        "{} recalculation: {} formulas, {} errors, {} circular",
        options.mode,
        stats.formula_count,
        stats.errors,
        stats.circular_references
    );
    stats
}

fn single_pass(cells: &mut CellTable) -> CalculationStats {
    let mut stats = CalculationStats::default();
    for index in 0..cells.len() {
        if cells.get_index(index).map_or(false, |(_, cell)| cell.is_formula()) {
            stats.formula_count += 1;
            calculate_cell(cells, index, &mut stats);
        }
    }
    stats
}

fn dependency_order(cells: &mut CellTable) -> CalculationStats {
    let mut stats = CalculationStats::default();
    let mut graph = DependencyGraph::new();
    let mut nodes = Vec::new();
    let mut index_of: AHashMap<CellAddress, usize> = AHashMap::new();
    // Formula cells whose key is not a reference, or repeats one
    let mut unordered = Vec::new();

    for (index, (key, cell)) in cells.iter().enumerate() {
        if !cell.is_formula() {
            continue;
        }
        stats.formula_count += 1;

        let addr = match CellAddress::parse(key) {
            Ok(addr) if !index_of.contains_key(&addr) => addr,
            _ => {
                unordered.push(index);
                continue;
            }
        };
        index_of.insert(addr, index);
        nodes.push(addr);

        match parse_formula(cell.raw_input()) {
            Ok(expr) => {
                for precedent in references(&expr, cells) {
                    graph.add_dependency(precedent, addr);
                }
            }
            Err(e) => warn!("formula in {} does not parse: {}", key, e),
        }
    }

    let plan = graph.evaluation_order(&nodes);
    for addr in plan.order {
        let Some(&index) = index_of.get(&addr) else {
            continue;
        };
        if plan.circular.contains(&addr) {
            if let Some((_, cell)) = cells.get_index_mut(index) {
                cell.set_calculated_value(CIRCULAR_SENTINEL);
            }
            debug!("{} is on a circular reference", addr);
            stats.circular_references += 1;
        } else {
            calculate_cell(cells, index, &mut stats);
        }
    }

    for index in unordered {
        calculate_cell(cells, index, &mut stats);
    }

    stats
}

/// Evaluate the formula at `index` against the table and store the result
fn calculate_cell(cells: &mut CellTable, index: usize, stats: &mut CalculationStats) {
    let Some((key, cell)) = cells.get_index(index) else {
        return;
    };
    let output = evaluate(cell.raw_input(), cells);
    if output.is_error() {
        debug!("{} = {:?} evaluated to an error", key, cell.raw_input());
        stats.errors += 1;
    }

    if let Some((_, cell)) = cells.get_index_mut(index) {
        cell.set_calculated_value(output.to_string());
    }
    stats.cells_calculated += 1;
}

/// Extension trait for Sheet: edits that recalculate
///
/// Every edit is followed by a full recalculation of the sheet with default
/// options. Use [`SheetCalculationExt::apply`] to pick other options.
pub trait SheetCalculationExt {
    /// Recalculate every formula with default options
    fn calculate(&mut self) -> CalculationStats;

    /// Recalculate every formula with custom options
    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;

    /// Run an edit, then recalculate with the given options
    fn apply<F>(&mut self, options: &CalculationOptions, edit: F) -> Result<CalculationStats>
    where
        F: FnOnce(&mut Sheet) -> Result<()>;

    /// Set a cell's raw input and recalculate
    fn update_cell(&mut self, reference: &str, input: &str) -> Result<CalculationStats>;

    /// Clear a cell's input and recalculate
    fn clear_cell_and_recalculate(&mut self, reference: &str) -> Result<CalculationStats>;

    /// Append a row and recalculate
    fn insert_row(&mut self) -> CalculationStats;

    /// Remove the last row (a sheet keeps at least one) and recalculate
    fn remove_row(&mut self) -> CalculationStats;

    /// Append a column and recalculate
    fn insert_column(&mut self) -> CalculationStats;

    /// Remove the last column (a sheet keeps at least one) and recalculate
    fn remove_column(&mut self) -> CalculationStats;
}

impl SheetCalculationExt for Sheet {
    fn calculate(&mut self) -> CalculationStats {
        self.calculate_with_options(&CalculationOptions::default())
    }

    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        recalculate_in_place(self.cells_mut(), options)
    }

    fn apply<F>(&mut self, options: &CalculationOptions, edit: F) -> Result<CalculationStats>
    where
        F: FnOnce(&mut Sheet) -> Result<()>,
    {
        edit(self)?;
        Ok(self.calculate_with_options(options))
    }

    fn update_cell(&mut self, reference: &str, input: &str) -> Result<CalculationStats> {
        self.apply(&CalculationOptions::default(), |sheet| {
            sheet.set_cell_input(reference, input)
        })
    }

    fn clear_cell_and_recalculate(&mut self, reference: &str) -> Result<CalculationStats> {
        self.apply(&CalculationOptions::default(), |sheet| {
            sheet.clear_cell(reference)
        })
    }

    fn insert_row(&mut self) -> CalculationStats {
        self.add_row();
        self.calculate()
    }

    fn remove_row(&mut self) -> CalculationStats {
        self.delete_row();
        self.calculate()
    }

    fn insert_column(&mut self) -> CalculationStats {
        self.add_column();
        self.calculate()
    }

    fn remove_column(&mut self) -> CalculationStats {
        self.delete_column();
        self.calculate()
    }
}

/// Extension trait for Workbook to add calculation methods
pub trait WorkbookCalculationExt {
    /// Recalculate every sheet with default options
    fn calculate(&mut self) -> CalculationStats;

    /// Recalculate every sheet with custom options
    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;

    /// Set a cell's raw input on a sheet and recalculate that sheet
    fn update_cell(&mut self, sheet_id: &str, reference: &str, input: &str)
        -> Result<CalculationStats>;
}

impl WorkbookCalculationExt for Workbook {
    fn calculate(&mut self) -> CalculationStats {
        self.calculate_with_options(&CalculationOptions::default())
    }

    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        let mut total = CalculationStats::default();
        for sheet in self.sheets_mut() {
            let stats = sheet.calculate_with_options(options);
            trace!("sheet {:?}: {:?}", sheet.id(), stats);
            total += stats;
        }
        total
    }

    fn update_cell(
        &mut self,
        sheet_id: &str,
        reference: &str,
        input: &str,
    ) -> Result<CalculationStats> {
        self.try_sheet_mut(sheet_id)?.update_cell(reference, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ERROR_SENTINEL;
    use pretty_assertions::assert_eq;

    fn table(inputs: &[(&str, &str)]) -> CellTable {
        CellTable::from_inputs(inputs.iter().copied()).unwrap()
    }

    fn value<'a>(cells: &'a CellTable, reference: &str) -> Option<&'a str> {
        cells.get(reference).and_then(|c| c.calculated_value())
    }

    #[test]
    fn test_simple_calculation() {
        let cells = table(&[("A1", "10"), ("A2", "20"), ("A3", "=A1+A2")]);
        let (out, stats) = recalculate_with_options(&cells, &CalculationOptions::default());

        assert_eq!(stats.formula_count, 1);
        assert_eq!(stats.cells_calculated, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(value(&out, "A3"), Some("30"));

        // Input untouched, non-formula cells never get a result
        assert_eq!(value(&cells, "A3"), None);
        assert_eq!(value(&out, "A1"), None);
    }

    #[test]
    fn test_chain_calculation_in_insertion_order() {
        let cells = table(&[
            ("A1", "5"),
            ("A2", "=A1*2"),
            ("A3", "=A2+10"),
            ("A4", "=A3*A1"),
        ]);
        let out = recalculate(&cells);
        assert_eq!(value(&out, "A2"), Some("10"));
        assert_eq!(value(&out, "A3"), Some("20"));
        assert_eq!(value(&out, "A4"), Some("100"));
    }

    #[test]
    fn test_forward_reference_sees_previous_result() {
        let cells = table(&[("A1", "=B1*2"), ("B1", "=C1"), ("C1", "4")]);

        let first = recalculate(&cells);
        assert_eq!(value(&first, "A1"), Some("0"));
        assert_eq!(value(&first, "B1"), Some("4"));

        // Each pass moves the chain one step further
        let second = recalculate(&first);
        assert_eq!(value(&second, "A1"), Some("8"));
    }

    #[test]
    fn test_dependency_order_converges_forward_chain() {
        let cells = table(&[("A1", "=B1*2"), ("B1", "=C1+1"), ("C1", "=D1"), ("D1", "4")]);
        let options = CalculationOptions::with_mode(CalculationMode::DependencyOrder);
        let (out, stats) = recalculate_with_options(&cells, &options);

        assert_eq!(value(&out, "C1"), Some("4"));
        assert_eq!(value(&out, "B1"), Some("5"));
        assert_eq!(value(&out, "A1"), Some("10"));
        assert_eq!(stats.formula_count, 3);
        assert_eq!(stats.circular_references, 0);

        // Order of the table is preserved
        let keys: Vec<_> = out.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["A1", "B1", "C1", "D1"]);
    }

    #[test]
    fn test_circular_reference_terminates() {
        let cells = table(&[("A1", "=B1+1"), ("B1", "=A1+1")]);
        let out = recalculate(&cells);
        assert_eq!(value(&out, "A1"), Some("1"));
        assert_eq!(value(&out, "B1"), Some("2"));
    }

    #[test]
    fn test_dependency_order_marks_cycles() {
        let cells = table(&[
            ("A1", "=B1+1"),
            ("B1", "=A1+1"),
            ("C1", "=C1"),
            ("D1", "=A1+5"),
            ("E1", "=2*3"),
        ]);
        let options = CalculationOptions::with_mode(CalculationMode::DependencyOrder);
        let (out, stats) = recalculate_with_options(&cells, &options);

        assert_eq!(value(&out, "A1"), Some(CIRCULAR_SENTINEL));
        assert_eq!(value(&out, "B1"), Some(CIRCULAR_SENTINEL));
        assert_eq!(value(&out, "C1"), Some(CIRCULAR_SENTINEL));
        // Reads a circular cell but is not on the cycle
        assert_eq!(value(&out, "D1"), Some("5"));
        assert_eq!(value(&out, "E1"), Some("6"));
        assert_eq!(stats.circular_references, 3);
        assert_eq!(stats.cells_calculated, 2);
    }

    #[test]
    fn test_errors_are_cell_local() {
        let cells = table(&[("A1", "=A1+*2"), ("A2", "=FOO(1)"), ("A3", "=1+1")]);
        let (out, stats) = recalculate_with_options(&cells, &CalculationOptions::default());
        assert_eq!(value(&out, "A1"), Some(ERROR_SENTINEL));
        assert_eq!(value(&out, "A2"), Some(ERROR_SENTINEL));
        assert_eq!(value(&out, "A3"), Some("2"));
        assert_eq!(stats.errors, 2);
    }

    #[test]
    fn test_sheet_edits_recalculate() {
        let mut sheet = Sheet::new("s", "S");
        sheet.update_cell("A1", "2").unwrap();
        sheet.update_cell("A2", "=A1*A1").unwrap();
        assert_eq!(value(sheet.cells(), "A2"), Some("4"));

        sheet.update_cell("A1", "3").unwrap();
        assert_eq!(value(sheet.cells(), "A2"), Some("9"));

        sheet.clear_cell_and_recalculate("A1").unwrap();
        assert_eq!(value(sheet.cells(), "A2"), Some("0"));

        assert!(sheet.update_cell("not a ref", "1").is_err());
    }

    #[test]
    fn test_structural_edits_recalculate() {
        let mut sheet = Sheet::new("s", "S");
        sheet.set_cell_input("A1", "=2+2").unwrap();

        let stats = sheet.insert_row();
        assert_eq!(stats.cells_calculated, 1);
        assert_eq!(sheet.row_count(), 101);
        assert_eq!(value(sheet.cells(), "A1"), Some("4"));

        sheet.remove_column();
        assert_eq!(sheet.column_count(), 25);
        sheet.insert_column();
        sheet.remove_row();
        assert_eq!((sheet.row_count(), sheet.column_count()), (100, 26));
    }

    #[test]
    fn test_workbook_calculation() {
        let mut workbook = Workbook::new();
        workbook
            .add_sheet(Sheet::new("sheet2", "Sheet2"))
            .unwrap();
        workbook
            .sheet_mut("sheet1")
            .unwrap()
            .set_cell_input("A1", "=1/0")
            .unwrap();
        workbook
            .sheet_mut("sheet2")
            .unwrap()
            .set_cell_input("A1", "=3*3")
            .unwrap();

        let stats = workbook.calculate();
        assert_eq!(stats.formula_count, 2);
        assert_eq!(stats.errors, 1);

        let stats = workbook.update_cell("sheet2", "B1", "=A1+1").unwrap();
        assert_eq!(stats.formula_count, 2);
        assert_eq!(
            value(workbook.sheet("sheet2").unwrap().cells(), "B1"),
            Some("10")
        );
        assert!(workbook.update_cell("missing", "A1", "1").is_err());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(
            "dependency-order".parse::<CalculationMode>(),
            Ok(CalculationMode::DependencyOrder)
        );
        assert_eq!(
            "single-pass".parse::<CalculationMode>(),
            Ok(CalculationMode::SinglePass)
        );
        assert!("sometimes".parse::<CalculationMode>().is_err());
        assert_eq!(CalculationMode::default().to_string(), "single-pass");
    }
}
