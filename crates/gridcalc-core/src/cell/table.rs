//! Ordered cell table

use indexmap::map::{Iter, IterMut};
use indexmap::IndexMap;

use super::{Cell, CellAddress, CellRange};
use crate::error::Result;

/// Mapping from reference text to [`Cell`] for one sheet
///
/// Iteration follows insertion order. Recalculation walks the table in this
/// order, so it is part of the observable behavior and survives persistence.
/// References that were never written are implicitly empty.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct CellTable {
    cells: IndexMap<String, Cell>,
}

impl CellTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(reference, raw input)` pairs, in order
    pub fn from_inputs<I, K, V>(inputs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::new();
        for (reference, input) in inputs {
            table.set_input(reference.as_ref(), input)?;
        }
        Ok(table)
    }

    /// Number of stored entries (including cleared ones)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Look up a cell by reference text
    ///
    /// Tries the key as given first, then its normalized A1 form.
    pub fn get(&self, reference: &str) -> Option<&Cell> {
        if let Some(cell) = self.cells.get(reference) {
            return Some(cell);
        }
        let addr = CellAddress::parse(reference).ok()?;
        self.cells.get(&addr.to_a1_string())
    }

    /// Look up a cell by address
    pub fn get_at(&self, addr: &CellAddress) -> Option<&Cell> {
        self.cells.get(&addr.to_a1_string())
    }

    /// Mutable lookup by reference text
    pub fn get_mut(&mut self, reference: &str) -> Option<&mut Cell> {
        if self.cells.contains_key(reference) {
            return self.cells.get_mut(reference);
        }
        let key = CellAddress::parse(reference).ok()?.to_a1_string();
        self.cells.get_mut(&key)
    }

    /// Access by insertion index
    pub fn get_index(&self, index: usize) -> Option<(&str, &Cell)> {
        self.cells
            .get_index(index)
            .map(|(key, cell)| (key.as_str(), cell))
    }

    /// Mutable access by insertion index
    pub fn get_index_mut(&mut self, index: usize) -> Option<(&str, &mut Cell)> {
        self.cells
            .get_index_mut(index)
            .map(|(key, cell)| (key.as_str(), cell))
    }

    /// Check whether an entry exists for a reference
    pub fn contains(&self, reference: &str) -> bool {
        self.get(reference).is_some()
    }

    /// Insert a cell under its normalized reference
    ///
    /// An existing entry keeps its position in the order.
    pub fn insert(&mut self, reference: &str, cell: Cell) -> Result<Option<Cell>> {
        let key = CellAddress::parse(reference)?.to_a1_string();
        Ok(self.cells.insert(key, cell))
    }

    /// Get the cell at a reference, creating an empty one if needed
    pub fn entry(&mut self, addr: &CellAddress) -> &mut Cell {
        self.cells.entry(addr.to_a1_string()).or_default()
    }

    /// Set the raw input of a cell, keeping its format
    pub fn set_input<S: Into<String>>(&mut self, reference: &str, input: S) -> Result<()> {
        let addr = CellAddress::parse(reference)?;
        self.entry(&addr).set_input(input);
        Ok(())
    }

    /// Clear a cell's input
    ///
    /// The entry stays in place so the order is preserved; an empty cell
    /// reads as empty everywhere.
    pub fn clear(&mut self, reference: &str) -> Result<()> {
        let addr = CellAddress::parse(reference)?;
        if let Some(cell) = self.cells.get_mut(&addr.to_a1_string()) {
            cell.set_input("");
        }
        Ok(())
    }

    /// The value other cells see at an address: calculated value, else raw
    /// input, else `""` for a missing cell
    pub fn value_at(&self, addr: &CellAddress) -> &str {
        self.get_at(addr).map(Cell::display_value).unwrap_or("")
    }

    /// Stored cells inside a range
    ///
    /// Walks the range cell by cell when it is no larger than the table
    /// (row-major order), otherwise scans the table (insertion order), so
    /// whole-sheet ranges cost no more than the table itself.
    pub fn cells_in(&self, range: &CellRange) -> Vec<(CellAddress, &Cell)> {
        if range.cell_count() <= self.cells.len() as u64 {
            range
                .cells()
                .filter_map(|addr| self.get_at(&addr).map(|cell| (addr, cell)))
                .collect()
        } else {
            self.cells
                .iter()
                .filter_map(|(key, cell)| {
                    let addr = CellAddress::parse(key).ok()?;
                    range.contains(&addr).then_some((addr, cell))
                })
                .collect()
        }
    }

    /// Iterate `(reference, cell)` in insertion order
    pub fn iter(&self) -> Iter<'_, String, Cell> {
        self.cells.iter()
    }

    /// Iterate mutably in insertion order
    pub fn iter_mut(&mut self) -> IterMut<'_, String, Cell> {
        self.cells.iter_mut()
    }

    /// References of every formula cell, in insertion order
    pub fn formula_cells(&self) -> impl Iterator<Item = &str> {
        self.cells
            .iter()
            .filter(|(_, cell)| cell.is_formula())
            .map(|(key, _)| key.as_str())
    }

    /// Number of formula cells
    pub fn formula_count(&self) -> usize {
        self.formula_cells().count()
    }
}

/// Collects `(reference, cell)` pairs, normalizing references that parse
///
/// Keys that are not references are kept as written. When two keys
/// normalize to the same reference the later cell wins and the earlier
/// position is kept.
impl FromIterator<(String, Cell)> for CellTable {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, cell) in iter {
            let key = match CellAddress::parse(&key) {
                Ok(addr) => addr.to_a1_string(),
                Err(_) => key,
            };
            table.cells.insert(key, cell);
        }
        table
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CellTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let stored = IndexMap::<String, Cell>::deserialize(deserializer)?;
        Ok(stored.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CellTable {
    type Item = (&'a String, &'a Cell);
    type IntoIter = Iter<'a, String, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
