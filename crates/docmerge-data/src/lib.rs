//! # docmerge-data
//!
//! Spreadsheet access for docmerge.
//!
//! ## Features
//!
//! - **Workbook Support**: Read `.xlsx`, `.xls` and `.ods` files using `calamine`
//! - **Values and Formulas**: Stored values and formula text are exposed
//!   separately through the [`SheetAccess`] trait
//! - **Reference Parsing**: Standard A1 notation for cells and ranges
//!
//! ## Example
//!
//! ```rust,ignore
//! use docmerge_data::{CellRef, ExcelWorkbook, SheetAccess};
//!
//! let workbook = ExcelWorkbook::open("paciente.xlsx")?;
//! let cell = CellRef::parse("B2")?;
//! println!("{}", workbook.cell_value("Hoja1", cell.row, cell.col));
//! ```

pub mod cell_ref;
pub mod error;
pub mod sources;
pub mod value;

// Re-exports
pub use cell_ref::{CellRange, CellRef};
pub use error::{DataError, Result};
pub use sources::{ExcelWorkbook, MemoryWorkbook, SheetAccess};
pub use value::{CellValue, DATETIME_FORMAT, DATE_FORMAT};
