//! Spreadsheet sources.
//!
//! This module contains the [`SheetAccess`] capability and its
//! implementations: a calamine-backed workbook read from disk and an
//! in-memory workbook.

pub mod excel;
pub mod memory;

pub use excel::ExcelWorkbook;
pub use memory::MemoryWorkbook;

use crate::value::CellValue;

/// Read-only access to the cells of a workbook
///
/// Values and formulas are independent views: a cell may carry formula
/// text while its stored value is empty (the workbook was never
/// recalculated), which callers are expected to handle.
pub trait SheetAccess {
    /// Sheet names in declared order
    fn sheet_names(&self) -> Vec<String>;

    /// Whether a sheet with exactly this name exists
    fn has_sheet(&self, sheet: &str) -> bool {
        self.sheet_names().iter().any(|name| name == sheet)
    }

    /// Stored value at a 0-indexed position; `Empty` outside the used area
    /// or for an unknown sheet
    fn cell_value(&self, sheet: &str, row: u32, col: u32) -> CellValue;

    /// Formula text at a 0-indexed position, if the cell holds a formula
    fn cell_formula(&self, sheet: &str, row: u32, col: u32) -> Option<String>;

    /// Index of the last row holding any value, `None` for an empty sheet
    fn last_row(&self, sheet: &str) -> Option<u32>;
}

impl<T: SheetAccess + ?Sized> SheetAccess for &T {
    fn sheet_names(&self) -> Vec<String> {
        (**self).sheet_names()
    }

    fn has_sheet(&self, sheet: &str) -> bool {
        (**self).has_sheet(sheet)
    }

    fn cell_value(&self, sheet: &str, row: u32, col: u32) -> CellValue {
        (**self).cell_value(sheet, row, col)
    }

    fn cell_formula(&self, sheet: &str, row: u32, col: u32) -> Option<String> {
        (**self).cell_formula(sheet, row, col)
    }

    fn last_row(&self, sheet: &str) -> Option<u32> {
        (**self).last_row(sheet)
    }
}
