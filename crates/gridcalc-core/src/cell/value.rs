//! Cell content types

use crate::style::CellFormat;
use std::fmt;

/// What a cell holds: a plain value, or a formula with its last result
///
/// Only formulas carry a calculated value, so a cell that stops being a
/// formula drops its result along with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Literal text as typed (may be empty)
    Value(String),

    /// Formula cell
    Formula {
        /// Text as typed, including the leading '='
        input: String,
        /// Last evaluated result, if the cell has been calculated
        calculated_value: Option<String>,
    },
}

impl CellContent {
    /// Classify raw input: text starting with '=' is a formula
    pub fn from_input<S: Into<String>>(input: S) -> Self {
        let input = input.into();
        if input.starts_with('=') {
            CellContent::Formula {
                input,
                calculated_value: None,
            }
        } else {
            CellContent::Value(input)
        }
    }

    /// The text as typed
    pub fn raw_input(&self) -> &str {
        match self {
            CellContent::Value(s) => s,
            CellContent::Formula { input, .. } => input,
        }
    }
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Value(String::new())
    }
}

/// A single addressable cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "CellRecord", into = "CellRecord")
)]
pub struct Cell {
    content: CellContent,
    /// Styling, carried through evaluation untouched
    pub format: CellFormat,
}

impl Cell {
    /// Create an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell from raw input
    pub fn from_input<S: Into<String>>(input: S) -> Self {
        Self {
            content: CellContent::from_input(input),
            format: CellFormat::default(),
        }
    }

    /// Builder-style format setter
    pub fn with_format(mut self, format: CellFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the cell's input, keeping its format
    ///
    /// A formula replaced by another formula keeps its previous result until
    /// it is recalculated; any other change drops the result.
    pub fn set_input<S: Into<String>>(&mut self, input: S) {
        let previous = self.calculated_value().map(str::to_string);
        self.content = CellContent::from_input(input);
        if let Some(value) = previous {
            self.set_calculated_value(value);
        }
    }

    /// The cell content
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// The text as typed
    pub fn raw_input(&self) -> &str {
        self.content.raw_input()
    }

    /// The formula expression (without the leading '='), if this is a formula cell
    pub fn formula(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula { input, .. } => Some(&input[1..]),
            CellContent::Value(_) => None,
        }
    }

    /// Check if this is a formula cell
    pub fn is_formula(&self) -> bool {
        matches!(self.content, CellContent::Formula { .. })
    }

    /// Last calculated result of a formula cell
    pub fn calculated_value(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula {
                calculated_value, ..
            } => calculated_value.as_deref(),
            CellContent::Value(_) => None,
        }
    }

    /// Store a calculated result
    ///
    /// Returns `false` (and stores nothing) for non-formula cells.
    pub fn set_calculated_value<S: Into<String>>(&mut self, value: S) -> bool {
        match &mut self.content {
            CellContent::Formula {
                calculated_value, ..
            } => {
                *calculated_value = Some(value.into());
                true
            }
            CellContent::Value(_) => false,
        }
    }

    /// The value other cells see: the calculated result when present, else the input
    pub fn display_value(&self) -> &str {
        self.calculated_value().unwrap_or_else(|| self.raw_input())
    }

    /// Check if the cell has no input
    pub fn is_empty(&self) -> bool {
        self.raw_input().is_empty()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_value())
    }
}

impl From<&str> for Cell {
    fn from(input: &str) -> Self {
        Cell::from_input(input)
    }
}

impl From<String> for Cell {
    fn from(input: String) -> Self {
        Cell::from_input(input)
    }
}

/// Persisted cell shape
///
/// `formula` repeats the input for formula cells and is empty otherwise.
/// `calculatedValue` is written for readers of the document but ignored on
/// load.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellRecord {
    #[serde(default, alias = "rawInput")]
    value: String,
    #[serde(default)]
    formula: String,
    #[serde(default)]
    format: CellFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calculated_value: Option<String>,
}

#[cfg(feature = "serde")]
impl From<CellRecord> for Cell {
    fn from(record: CellRecord) -> Self {
        let input = if record.value.is_empty() && record.formula.starts_with('=') {
            record.formula
        } else {
            record.value
        };

        // Stored results are not trusted; the next recalculation fills them in
        Cell::from_input(input).with_format(record.format)
    }
}

#[cfg(feature = "serde")]
impl From<Cell> for CellRecord {
    fn from(cell: Cell) -> Self {
        match cell.content {
            CellContent::Value(value) => CellRecord {
                value,
                formula: String::new(),
                format: cell.format,
                calculated_value: None,
            },
            CellContent::Formula {
                input,
                calculated_value,
            } => CellRecord {
                formula: input.clone(),
                value: input,
                format: cell.format,
                calculated_value,
            },
        }
    }
}
