//! Excel/XLSX/ODS workbook source using calamine.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{DataError, Result};
use crate::sources::SheetAccess;
use crate::value::CellValue;

/// A workbook loaded from disk
///
/// Every sheet is read twice at open time: once for stored values and once
/// for formula text. Lookups afterwards are pure memory reads.
pub struct ExcelWorkbook {
    /// Path to the workbook file
    path: String,
    /// Sheet names in declared order
    sheet_names: Vec<String>,
    /// Stored values per sheet
    values: HashMap<String, Range<Data>>,
    /// Formula text per sheet
    formulas: HashMap<String, Range<String>>,
}

impl ExcelWorkbook {
    /// Open a workbook from a file path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();

        if !path.as_ref().exists() {
            return Err(DataError::FileNotFound(path_str));
        }

        let mut workbook = open_workbook_auto(path.as_ref())
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", path_str, e)))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut values = HashMap::new();
        let mut formulas = HashMap::new();

        for name in &sheet_names {
            let sheet_values = match workbook.worksheet_range(name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!(sheet = %name, error = %e, "sheet has no readable cells");
                    Range::empty()
                }
            };
            let sheet_formulas = match workbook.worksheet_formula(name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::debug!(sheet = %name, error = %e, "sheet has no readable formulas");
                    Range::empty()
                }
            };
            values.insert(name.clone(), sheet_values);
            formulas.insert(name.clone(), sheet_formulas);
        }

        tracing::debug!(path = %path_str, sheets = sheet_names.len(), "opened workbook");

        Ok(Self {
            path: path_str,
            sheet_names,
            values,
            formulas,
        })
    }

    /// Path the workbook was opened from
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SheetAccess for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.clone()
    }

    fn cell_value(&self, sheet: &str, row: u32, col: u32) -> CellValue {
        self.values
            .get(sheet)
            .and_then(|range| range.get_value((row, col)))
            .map(CellValue::from)
            .unwrap_or_default()
    }

    fn cell_formula(&self, sheet: &str, row: u32, col: u32) -> Option<String> {
        let formula = self.formulas.get(sheet)?.get_value((row, col))?;
        let formula = formula.trim();
        if formula.is_empty() {
            None
        } else if formula.starts_with('=') {
            Some(formula.to_string())
        } else {
            Some(format!("={}", formula))
        }
    }

    fn last_row(&self, sheet: &str) -> Option<u32> {
        let value_end = self.values.get(sheet).and_then(|r| r.end()).map(|(r, _)| r);
        let formula_end = self.formulas.get(sheet).and_then(|r| r.end()).map(|(r, _)| r);
        value_end.max(formula_end)
    }
}
