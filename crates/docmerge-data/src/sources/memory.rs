//! In-memory workbook.
//!
//! Useful for embedding (a front end that already holds cell data) and for
//! tests that should not depend on files on disk.

use std::collections::BTreeMap;

use crate::cell_ref::CellRef;
use crate::error::Result;
use crate::sources::SheetAccess;
use crate::value::CellValue;

#[derive(Debug, Clone, Default)]
struct MemorySheet {
    name: String,
    values: BTreeMap<(u32, u32), CellValue>,
    formulas: BTreeMap<(u32, u32), String>,
}

/// A workbook held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty sheet (no-op if it already exists)
    pub fn add_sheet(&mut self, name: &str) -> &mut Self {
        self.sheet_mut(name);
        self
    }

    /// Store a value at an A1 reference, creating the sheet if needed
    pub fn set_value(&mut self, sheet: &str, cell: &str, value: impl Into<CellValue>) -> Result<()> {
        let pos = CellRef::parse(cell)?;
        self.sheet_mut(sheet)
            .values
            .insert((pos.row, pos.col), value.into());
        Ok(())
    }

    /// Store formula text at an A1 reference, creating the sheet if needed
    pub fn set_formula(&mut self, sheet: &str, cell: &str, formula: &str) -> Result<()> {
        let pos = CellRef::parse(cell)?;
        self.sheet_mut(sheet)
            .formulas
            .insert((pos.row, pos.col), formula.to_string());
        Ok(())
    }

    fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn sheet_mut(&mut self, name: &str) -> &mut MemorySheet {
        let index = match self.sheets.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sheets.push(MemorySheet {
                    name: name.to_string(),
                    ..MemorySheet::default()
                });
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[index]
    }
}

impl SheetAccess for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn cell_value(&self, sheet: &str, row: u32, col: u32) -> CellValue {
        self.sheet(sheet)
            .and_then(|s| s.values.get(&(row, col)))
            .cloned()
            .unwrap_or_default()
    }

    fn cell_formula(&self, sheet: &str, row: u32, col: u32) -> Option<String> {
        self.sheet(sheet)?.formulas.get(&(row, col)).cloned()
    }

    fn last_row(&self, sheet: &str) -> Option<u32> {
        let sheet = self.sheet(sheet)?;
        let value_row = sheet.values.keys().map(|(r, _)| *r).max();
        let formula_row = sheet.formulas.keys().map(|(r, _)| *r).max();
        value_row.max(formula_row)
    }
}
