//! Built-in spreadsheet functions
//!
//! Every function receives the raw argument text captured between its
//! parentheses and the cell table it is evaluated against.

pub mod math;

use crate::error::FormulaResult;
use ahash::AHashMap;
use gridcalc_core::{CellRange, CellTable};

/// Function implementation signature
pub type FunctionImpl = fn(&str, &CellTable) -> FormulaResult<f64>;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Implementation
    pub implementation: FunctionImpl,
    /// One-line description
    pub description: &'static str,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    /// Register a function, replacing any with the same name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_ascii_uppercase(), def);
    }

    /// Names of all registered functions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_math_functions(&mut self) {
        self.register(FunctionDef {
            name: "SUM",
            implementation: math::fn_sum,
            description: "Sum of the numeric values",
        });

        self.register(FunctionDef {
            name: "AVERAGE",
            implementation: math::fn_average,
            description: "Sum divided by the number of referenced cells",
        });

        self.register(FunctionDef {
            name: "COUNT",
            implementation: math::fn_count,
            description: "Number of non-empty referenced cells",
        });

        self.register(FunctionDef {
            name: "MIN",
            implementation: math::fn_min,
            description: "Smallest numeric value",
        });

        self.register(FunctionDef {
            name: "MAX",
            implementation: math::fn_max,
            description: "Largest numeric value",
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Cells referenced by a function's argument text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedArgs<'a> {
    /// Values of the referenced cells that exist in the table
    pub values: Vec<&'a str>,
    /// Number of referenced cells, including missing ones
    pub referenced: u64,
}

impl ResolvedArgs<'_> {
    /// Numeric values; text and empty cells are skipped
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter_map(parse_number)
    }

    /// Number of referenced cells with any content
    pub fn non_empty(&self) -> usize {
        self.values.iter().filter(|v| !v.is_empty()).count()
    }
}

/// Resolve raw argument text to the referenced cells
///
/// The text is split on commas; each piece is a range (`A1:B3`) or a single
/// reference (`A1`). Every stored cell in a piece yields its calculated
/// value, else its raw input. Missing cells read as `""`, so they only count
/// toward [`ResolvedArgs::referenced`]. Pieces that are not references
/// contribute nothing.
pub fn resolve_args<'a>(args: &str, cells: &'a CellTable) -> ResolvedArgs<'a> {
    let mut resolved = ResolvedArgs::default();
    for piece in args.split(',') {
        match CellRange::parse(piece) {
            Ok(range) => {
                resolved.referenced += range.cell_count();
                resolved.values.extend(
                    cells
                        .cells_in(&range)
                        .into_iter()
                        .map(|(_, cell)| cell.display_value()),
                );
            }
            Err(e) => log::trace!("ignoring function argument {:?}: {}", piece.trim(), e),
        }
    }
    resolved
}

/// Coerce cell text to a number
///
/// Surrounding whitespace is ignored; anything that is not a finite number
/// yields `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
