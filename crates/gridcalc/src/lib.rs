//! # gridcalc
//!
//! Formula evaluation and recalculation for spreadsheet documents.
//!
//! ## Features
//!
//! - A1 references and ranges, case-insensitive
//! - Arithmetic formulas with SUM, AVERAGE, COUNT, MIN and MAX
//! - Single-pass recalculation in insertion order, or dependency-ordered
//!   recalculation with circular reference detection
//! - Cell formatting carried through untouched
//! - Chart series extraction
//! - JSON persistence of whole documents
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! // Create a new workbook
//! let mut workbook = Workbook::new();
//! let sheet = workbook.active_sheet_mut().unwrap();
//!
//! // Set cell inputs; each edit recalculates the sheet
//! sheet.update_cell("A1", "10").unwrap();
//! sheet.update_cell("A2", "20").unwrap();
//! sheet.update_cell("A3", "=A1+A2").unwrap();
//! assert_eq!(sheet.cells().get("A3").unwrap().display_value(), "30");
//!
//! // Save to JSON
//! let json = workbook.to_json().unwrap();
//! let reloaded = Workbook::from_json(&json).unwrap();
//! assert_eq!(reloaded, workbook);
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{
    recalculate, recalculate_in_place, recalculate_with_options, CalculationMode,
    CalculationOptions, CalculationStats, SheetCalculationExt, WorkbookCalculationExt,
    CIRCULAR_SENTINEL,
};

// Re-export core types
pub use gridcalc_core::{
    Cell, CellAddress, CellContent, CellFormat, CellRange, CellTable, Error, FrozenPanes, Result,
    Sheet, TextAlign, Workbook, DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT,
};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate, evaluate_expr, parse_formula, references, FormulaError, FormulaExpr, FormulaOutput,
    FormulaResult, ERROR_SENTINEL,
};

// Re-export chart types
pub use gridcalc_chart::{
    generate_chart_data, AxisTitle, ChartConfig, ChartData, ChartOptions, ChartType, ColorSpec,
    Dataset, Point, SeriesData,
};

use log::debug;
use std::path::Path;

/// Extension trait for Workbook to add JSON persistence
///
/// Stored calculated values are never trusted: every load recalculates all
/// sheets.
pub trait WorkbookExt: Sized {
    /// Open a workbook from a JSON file
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Save the workbook to a JSON file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Parse a workbook from JSON text
    fn from_json(json: &str) -> Result<Self>;

    /// Serialize the workbook to pretty-printed JSON
    fn to_json(&self) -> Result<String>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| Error::other(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn from_json(json: &str) -> Result<Workbook> {
        let mut workbook: Workbook = serde_json::from_str(json)
            .map_err(|e| Error::other(format!("Invalid workbook JSON: {}", e)))?;
        if workbook.sheet_count() == 0 {
            return Err(Error::other("Workbook has no sheets"));
        }

        let stats = workbook.calculate();
        debug!(
            "loaded workbook {:?}: {} sheets, {} formulas recalculated",
            workbook.name(),
            workbook.sheet_count(),
            stats.cells_calculated
        );
        Ok(workbook)
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::other(format!("Failed to serialize workbook: {}", e)))
    }
}
