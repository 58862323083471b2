//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")
//! - [`Cell`] / [`CellContent`] - What a cell holds
//! - [`CellTable`] - The ordered reference-to-cell mapping of one sheet

mod address;
mod table;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use table::CellTable;
pub use value::{Cell, CellContent};
