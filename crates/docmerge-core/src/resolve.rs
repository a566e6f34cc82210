//! Cell resolution: coordinate expressions to display strings.
//!
//! A coordinate expression is `[Sheet!]A1` or `[Sheet!]A1:B2`. Ranges
//! serialize row by row, cells joined with `\t` and rows with `\n`.
//! A cell whose stored value is blank but which carries `TODAY`/`HOY` or
//! `NOW`/`AHORA` formula text resolves to the current date or timestamp;
//! any other formula resolves to an empty string.

use chrono::{Local, NaiveDateTime};

use docmerge_data::{CellRange, CellRef, CellValue, SheetAccess};

use crate::error::ResolutionError;

/// Split `Sheet!A1` into sheet and coordinate
///
/// Without a `!` the coordinate belongs to `default_sheet`. Both parts are
/// trimmed; only the first `!` separates.
pub fn split_sheet_and_coordinate(expr: &str, default_sheet: &str) -> (String, String) {
    let expr = expr.trim();
    match expr.split_once('!') {
        Some((sheet, coordinate)) => (sheet.trim().to_string(), coordinate.trim().to_string()),
        None => (default_sheet.to_string(), expr.to_string()),
    }
}

/// Evaluate the two recognized formulas
///
/// Matching is a case-insensitive substring test on the formula text with
/// any leading `=` removed. Date keywords are checked first.
pub fn evaluate_recognized_formula(formula: &str, now: NaiveDateTime) -> CellValue {
    let text = formula.trim().trim_start_matches('=').to_uppercase();

    if text.contains("TODAY") || text.contains("HOY") {
        CellValue::Date(now.date())
    } else if text.contains("NOW") || text.contains("AHORA") {
        CellValue::DateTime(now)
    } else {
        CellValue::Empty
    }
}

/// Reads coordinate expressions from a workbook
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    now: Option<NaiveDateTime>,
}

impl Resolver {
    /// Resolver using the local clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with a fixed "now" for formula evaluation
    pub fn with_now(now: NaiveDateTime) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Resolve a coordinate on `sheet` into its display string
    ///
    /// An empty coordinate resolves to an empty string.
    pub fn resolve<W: SheetAccess + ?Sized>(
        &self,
        workbook: &W,
        sheet: &str,
        coordinate: &str,
    ) -> Result<String, ResolutionError> {
        if !workbook.has_sheet(sheet) {
            return Err(ResolutionError::SheetNotFound(sheet.to_string()));
        }

        let coordinate = coordinate.trim();
        if coordinate.is_empty() {
            return Ok(String::new());
        }

        if coordinate.contains(':') {
            let range = CellRange::parse(coordinate)
                .map_err(|_| ResolutionError::InvalidRange(coordinate.to_string()))?;
            let now = self.now();

            let rows: Vec<String> = range
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|cell| self.cell_text(workbook, sheet, *cell, now))
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect();
            Ok(rows.join("\n"))
        } else {
            let cell = CellRef::parse(coordinate)
                .map_err(|_| ResolutionError::InvalidCoordinate(coordinate.to_string()))?;
            Ok(self.cell_text(workbook, sheet, cell, self.now()))
        }
    }

    fn cell_text<W: SheetAccess + ?Sized>(
        &self,
        workbook: &W,
        sheet: &str,
        cell: CellRef,
        now: NaiveDateTime,
    ) -> String {
        let value = workbook.cell_value(sheet, cell.row, cell.col);

        let blank = match &value {
            CellValue::Text(text) => text.trim().is_empty(),
            other => other.is_empty(),
        };
        if blank {
            if let Some(formula) = workbook.cell_formula(sheet, cell.row, cell.col) {
                tracing::debug!(sheet, cell = %cell, formula = %formula, "evaluating formula fallback");
                return evaluate_recognized_formula(&formula, now).to_string();
            }
        }

        value.to_string()
    }
}
