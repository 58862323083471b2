//! Workbook type - the document structure

use crate::error::{Error, Result};
use crate::sheet::Sheet;

/// Id of the sheet in a new workbook
pub const DEFAULT_SHEET_ID: &str = "sheet1";

/// Name of the sheet in a new workbook
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// A spreadsheet document
///
/// A workbook owns one or more sheets and remembers which one is active.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Workbook {
    #[cfg_attr(feature = "serde", serde(default))]
    id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    name: String,
    sheets: Vec<Sheet>,
    #[cfg_attr(feature = "serde", serde(default))]
    active_sheet_id: String,
}

impl Workbook {
    /// Create a workbook with a single empty sheet
    pub fn new() -> Self {
        let mut sheet = Sheet::new(DEFAULT_SHEET_ID, DEFAULT_SHEET_NAME);
        sheet.set_active(true);
        Self {
            id: String::new(),
            name: "Untitled".to_string(),
            sheets: vec![sheet],
            active_sheet_id: DEFAULT_SHEET_ID.to_string(),
        }
    }

    /// Document id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the document id
    pub fn set_id<S: Into<String>>(&mut self, id: S) {
        self.id = id.into();
    }

    /// Document name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the document
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Iterate over all sheets
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Iterate over all sheets mutably
    pub fn sheets_mut(&mut self) -> impl Iterator<Item = &mut Sheet> {
        self.sheets.iter_mut()
    }

    /// Get a sheet by id
    pub fn sheet(&self, id: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id() == id)
    }

    /// Get a mutable sheet by id
    pub fn sheet_mut(&mut self, id: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.id() == id)
    }

    /// Get a sheet by id, or fail with [`Error::SheetNotFound`]
    pub fn try_sheet_mut(&mut self, id: &str) -> Result<&mut Sheet> {
        self.sheet_mut(id)
            .ok_or_else(|| Error::SheetNotFound(id.to_string()))
    }

    /// Id of the active sheet
    pub fn active_sheet_id(&self) -> &str {
        &self.active_sheet_id
    }

    /// The active sheet, falling back to the first sheet when the stored id
    /// matches none
    pub fn active_sheet(&self) -> Option<&Sheet> {
        self.sheet(&self.active_sheet_id)
            .or_else(|| self.sheets.first())
    }

    /// Mutable active sheet, with the same fallback as [`Workbook::active_sheet`]
    pub fn active_sheet_mut(&mut self) -> Option<&mut Sheet> {
        let index = self
            .sheets
            .iter()
            .position(|s| s.id() == self.active_sheet_id)
            .unwrap_or(0);
        self.sheets.get_mut(index)
    }

    /// Make a sheet the active one
    pub fn set_active_sheet(&mut self, id: &str) -> Result<()> {
        if self.sheet(id).is_none() {
            return Err(Error::SheetNotFound(id.to_string()));
        }
        for sheet in &mut self.sheets {
            let active = sheet.id() == id;
            sheet.set_active(active);
        }
        self.active_sheet_id = id.to_string();
        Ok(())
    }

    /// Add a sheet at the end
    pub fn add_sheet(&mut self, mut sheet: Sheet) -> Result<()> {
        if self.sheet(sheet.id()).is_some() {
            return Err(Error::DuplicateSheetId(sheet.id().to_string()));
        }
        sheet.set_active(false);
        self.sheets.push(sheet);
        Ok(())
    }

    /// Remove a sheet by id
    ///
    /// The last remaining sheet cannot be removed. Removing the active sheet
    /// activates the first one.
    pub fn remove_sheet(&mut self, id: &str) -> Result<Sheet> {
        let index = self
            .sheets
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| Error::SheetNotFound(id.to_string()))?;
        if self.sheets.len() == 1 {
            return Err(Error::other("cannot remove the only sheet"));
        }

        let removed = self.sheets.remove(index);
        if removed.id() == self.active_sheet_id {
            let first = self.sheets[0].id().to_string();
            self.set_active_sheet(&first)?;
        }
        Ok(removed)
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        let sheet = wb.active_sheet().unwrap();
        assert_eq!(sheet.id(), "sheet1");
        assert_eq!(sheet.name(), "Sheet1");
        assert!(sheet.is_active());
    }

    #[test]
    fn test_add_and_activate() {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::new("sheet2", "Data")).unwrap();
        assert_eq!(wb.sheet_count(), 2);

        wb.set_active_sheet("sheet2").unwrap();
        assert_eq!(wb.active_sheet().unwrap().name(), "Data");
        assert!(!wb.sheet("sheet1").unwrap().is_active());

        assert_eq!(
            wb.set_active_sheet("missing"),
            Err(Error::SheetNotFound("missing".into()))
        );
    }

    #[test]
    fn test_duplicate_id() {
        let mut wb = Workbook::new();
        assert_eq!(
            wb.add_sheet(Sheet::new("sheet1", "Other")),
            Err(Error::DuplicateSheetId("sheet1".into()))
        );
    }

    #[test]
    fn test_remove_sheet() {
        let mut wb = Workbook::new();
        assert!(wb.remove_sheet("sheet1").is_err());

        wb.add_sheet(Sheet::new("sheet2", "Sheet2")).unwrap();
        wb.remove_sheet("sheet1").unwrap();
        assert_eq!(wb.active_sheet_id(), "sheet2");
        assert!(wb.active_sheet().unwrap().is_active());
    }
}
