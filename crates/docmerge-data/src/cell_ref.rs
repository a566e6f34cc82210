//! A1-style cell and range references.
//!
//! Positions are 0-indexed internally (`A1` is row 0, column 0). `$`
//! absolute markers and surrounding whitespace are accepted and ignored.

use std::fmt;

use crate::error::{DataError, Result};

/// Last column Excel can address (`XFD`)
pub const MAX_COLUMNS: u32 = 16_384;

/// Last row Excel can address
pub const MAX_ROWS: u32 = 1_048_576;

/// A single cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    /// 0-indexed row
    pub row: u32,
    /// 0-indexed column
    pub col: u32,
}

impl CellRef {
    /// Create a reference from 0-indexed row and column
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell reference like "B2" or "$AB$10"
    pub fn parse(cell: &str) -> Result<Self> {
        let cell: String = cell
            .trim()
            .chars()
            .filter(|c| *c != '$')
            .collect::<String>()
            .to_uppercase();

        if cell.is_empty() {
            return Err(DataError::InvalidCoordinate(
                "Empty cell reference".to_string(),
            ));
        }

        let split = cell
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cell.len());
        let (col_str, row_str) = cell.split_at(split);

        if col_str.is_empty()
            || row_str.is_empty()
            || !row_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(DataError::InvalidCoordinate(format!(
                "Invalid cell reference '{}'",
                cell
            )));
        }

        let col = column_to_index(col_str)?;

        let row: u32 = row_str.parse::<u32>().map_err(|_| {
            DataError::InvalidCoordinate(format!("Invalid row number '{}'", row_str))
        })?;

        if row == 0 || row > MAX_ROWS {
            return Err(DataError::InvalidCoordinate(format!(
                "Row number out of bounds in '{}'",
                cell
            )));
        }

        Ok(Self { row: row - 1, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", index_to_column(self.col), self.row + 1)
    }
}

/// A rectangular block of cells, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellRef,
    /// Bottom-right corner
    pub end: CellRef,
}

impl CellRange {
    /// Parse a range string like "A1:C10"
    ///
    /// Corners given in any order are normalized to top-left/bottom-right.
    pub fn parse(range: &str) -> Result<Self> {
        let parts: Vec<&str> = range.split(':').collect();

        if parts.len() != 2 {
            return Err(DataError::InvalidRange(format!(
                "Expected format 'A1:B2', got '{}'",
                range
            )));
        }

        let first = CellRef::parse(parts[0]).map_err(|e| DataError::InvalidRange(e.to_string()))?;
        let second =
            CellRef::parse(parts[1]).map_err(|e| DataError::InvalidRange(e.to_string()))?;

        Ok(Self {
            start: CellRef::new(first.row.min(second.row), first.col.min(second.col)),
            end: CellRef::new(first.row.max(second.row), first.col.max(second.col)),
        })
    }

    /// Number of rows covered
    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns covered
    pub fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Cells row by row, top to bottom, left to right within a row
    pub fn rows(&self) -> impl Iterator<Item = Vec<CellRef>> + '_ {
        (self.start.row..=self.end.row).map(move |row| {
            (self.start.col..=self.end.col)
                .map(|col| CellRef::new(row, col))
                .collect()
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Convert column letters to 0-indexed number (A=0, B=1, ..., Z=25, AA=26)
pub fn column_to_index(col: &str) -> Result<u32> {
    let mut result: u32 = 0;
    for c in col.chars() {
        if !c.is_ascii_uppercase() {
            return Err(DataError::InvalidCoordinate(format!(
                "Invalid column '{}'",
                col
            )));
        }
        let value = c as u32 - 'A' as u32 + 1;
        result = result * 26 + value;
        if result > MAX_COLUMNS {
            return Err(DataError::InvalidCoordinate(format!(
                "Column out of bounds '{}'",
                col
            )));
        }
    }
    if result == 0 {
        return Err(DataError::InvalidCoordinate("Empty column".to_string()));
    }
    Ok(result - 1)
}

/// Convert a 0-indexed column number back to letters
pub fn index_to_column(mut index: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}
