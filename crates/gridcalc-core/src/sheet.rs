//! Sheet type

use crate::cell::{CellAddress, CellRange, CellTable};
use crate::error::Result;
use crate::style::CellFormat;

/// Default number of rows in a new sheet
pub const DEFAULT_ROW_COUNT: u32 = 100;

/// Default number of columns in a new sheet
pub const DEFAULT_COLUMN_COUNT: u32 = 26;

/// Frozen pane extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrozenPanes {
    /// Number of frozen rows at the top
    pub rows: u32,
    /// Number of frozen columns at the left
    pub columns: u32,
}

/// A single sheet of a workbook
///
/// Row and column counts describe the visible grid only. Cells are keyed by
/// reference and may lie outside it; structural edits never move them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Sheet {
    id: String,
    name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    is_active: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    cells: CellTable,
    #[cfg_attr(feature = "serde", serde(default = "default_row_count"))]
    row_count: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_column_count"))]
    column_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    frozen: FrozenPanes,
}

#[cfg(feature = "serde")]
fn default_row_count() -> u32 {
    DEFAULT_ROW_COUNT
}

#[cfg(feature = "serde")]
fn default_column_count() -> u32 {
    DEFAULT_COLUMN_COUNT
}

impl Sheet {
    /// Create an empty sheet with the default grid size
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_active: false,
            cells: CellTable::new(),
            row_count: DEFAULT_ROW_COUNT,
            column_count: DEFAULT_COLUMN_COUNT,
            frozen: FrozenPanes::default(),
        }
    }

    /// Sheet id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the sheet
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Check if this is the active sheet
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    // === Cells ===

    /// The cell table
    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    /// Mutable cell table
    pub fn cells_mut(&mut self) -> &mut CellTable {
        &mut self.cells
    }

    /// Replace the whole cell table
    pub fn set_cells(&mut self, cells: CellTable) {
        self.cells = cells;
    }

    /// Set a cell's raw input without recalculating
    pub fn set_cell_input<S: Into<String>>(&mut self, reference: &str, input: S) -> Result<()> {
        self.cells.set_input(reference, input)
    }

    /// Clear a cell's input without recalculating
    pub fn clear_cell(&mut self, reference: &str) -> Result<()> {
        self.cells.clear(reference)
    }

    /// Merge a partial format into every cell of a selection
    ///
    /// The corners may be given in any order. Missing cells are created empty.
    pub fn format_range(&mut self, start: &str, end: &str, format: &CellFormat) -> Result<()> {
        let range = CellRange::new(CellAddress::parse(start)?, CellAddress::parse(end)?);
        for addr in range.cells() {
            self.cells.entry(&addr).format.merge(format);
        }
        Ok(())
    }

    // === Grid size ===

    /// Number of rows in the grid
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Number of columns in the grid
    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    /// Append a row
    pub fn add_row(&mut self) {
        self.row_count = self.row_count.saturating_add(1);
    }

    /// Remove the last row; a sheet keeps at least one
    pub fn delete_row(&mut self) {
        self.row_count = self.row_count.saturating_sub(1).max(1);
    }

    /// Append a column
    pub fn add_column(&mut self) {
        self.column_count = self.column_count.saturating_add(1);
    }

    /// Remove the last column; a sheet keeps at least one
    pub fn delete_column(&mut self) {
        self.column_count = self.column_count.saturating_sub(1).max(1);
    }

    /// Frozen pane extent
    pub fn frozen(&self) -> FrozenPanes {
        self.frozen
    }

    /// Set the frozen pane extent
    pub fn set_frozen(&mut self, rows: u32, columns: u32) {
        self.frozen = FrozenPanes { rows, columns };
    }
}
