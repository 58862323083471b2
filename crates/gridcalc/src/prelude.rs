//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationMode,
    CalculationOptions,
    CalculationStats,
    // Cell types
    Cell,
    CellAddress,
    CellFormat,
    CellRange,
    CellTable,
    // Chart types
    ChartConfig,
    ChartData,
    ChartType,
    // Error types
    Error,
    FormulaOutput,
    Result,
    // Main types
    Sheet,
    // Extension traits
    SheetCalculationExt,
    TextAlign,
    Workbook,
    WorkbookCalculationExt,
    WorkbookExt,
};
