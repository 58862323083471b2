//! # gridcalc-core
//!
//! Core data structures for the gridcalc spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`CellAddress`] and [`CellRange`] - A1 references and rectangles
//! - [`Cell`] and [`CellTable`] - Cell contents and the per-sheet table
//! - [`CellFormat`] - Cell formatting, carried through untouched
//! - [`Workbook`], [`Sheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellAddress, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.active_sheet_mut().unwrap();
//!
//! sheet.set_cell_input("A1", "10").unwrap();
//! sheet.set_cell_input("A2", "=A1*2").unwrap();
//!
//! let a1 = CellAddress::parse("A1").unwrap();
//! assert_eq!(sheet.cells().value_at(&a1), "10");
//! ```

pub mod cell;
pub mod error;
pub mod sheet;
pub mod style;
pub mod workbook;

// Re-exports for convenience
pub use cell::{Cell, CellAddress, CellContent, CellRange, CellTable};
pub use error::{Error, Result};
pub use sheet::{FrozenPanes, Sheet, DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT};
pub use style::{CellFormat, TextAlign};
pub use workbook::Workbook;
