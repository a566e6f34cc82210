//! Reconciliation report.
//!
//! The report is plain text with a fixed section order: header, matches,
//! unmatched tags, unused mapping labels, empty cells and read errors.
//! The last three lists print at most `max_items` entries each.

use std::fmt;

use crate::error::ResolutionError;
use crate::mapping::MappingTable;
use crate::reconcile::MatchRecord;

/// Why a tag ended up with no text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Column B of the mapping row is blank
    EmptyCoordinate,
    /// The referenced cell or range holds nothing
    EmptyCell,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::EmptyCoordinate => f.write_str("empty coordinate"),
            EmptyReason::EmptyCell => f.write_str("empty cell"),
        }
    }
}

/// A matched tag that resolved to blank text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyCell {
    pub tag: String,
    /// `Sheet!Coordinate`
    pub location: String,
    pub reason: EmptyReason,
}

/// A matched tag whose coordinate could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadError {
    pub tag: String,
    pub label: String,
    pub sheet: String,
    pub coordinate: String,
    pub error: ResolutionError,
}

/// Audit of one template/spreadsheet pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub template: String,
    pub spreadsheet: String,
    pub mapping_sheet: String,
    pub data_sheet: String,
    /// One record per template tag, in tag order
    pub matches: Vec<MatchRecord>,
    /// Mapping labels no tag matched, first-seen order
    pub unused_labels: Vec<String>,
    pub empty_cells: Vec<EmptyCell>,
    pub errors: Vec<ReadError>,
    /// Set when the renderer rejected the template
    pub render_warning: Option<String>,
    /// Cap for the unused, empty and error lists
    pub max_items: usize,
}

impl Report {
    /// Tags with no mapping label, in tag order
    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter(|record| !record.is_matched())
            .map(|record| record.tag.as_str())
    }
}

/// Labels never selected as a match target
pub fn unused_labels(table: &MappingTable, records: &[MatchRecord]) -> Vec<String> {
    table
        .labels()
        .iter()
        .filter(|label| {
            !records
                .iter()
                .any(|record| record.label.as_deref() == Some(label.as_str()))
        })
        .cloned()
        .collect()
}

fn write_capped<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    max_items: usize,
    mut line: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for item in items.iter().take(max_items) {
        line(f, item)?;
    }
    if items.len() > max_items {
        writeln!(f, " ... and {} more", items.len() - max_items)?;
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template: {}", self.template)?;
        writeln!(f, "Spreadsheet: {}", self.spreadsheet)?;
        writeln!(f, "Mapping sheet: {}", self.mapping_sheet)?;
        writeln!(f, "Default data sheet: {}", self.data_sheet)?;
        writeln!(f)?;

        writeln!(f, "Matches (template -> mapping):")?;
        for record in &self.matches {
            writeln!(
                f,
                " - {}  =>  {}   (method: {})",
                record.tag,
                record.label.as_deref().unwrap_or("(none)"),
                record.method
            )?;
        }
        writeln!(f)?;

        let unmatched: Vec<&str> = self.unmatched().collect();
        writeln!(f, "Unmatched template tags: {}", unmatched.len())?;
        for tag in &unmatched {
            writeln!(f, " - {}", tag)?;
        }
        writeln!(f)?;

        writeln!(f, "Unused mapping labels: {}", self.unused_labels.len())?;
        write_capped(f, &self.unused_labels, self.max_items, |f, label| {
            writeln!(f, " - {}", label)
        })?;
        writeln!(f)?;

        writeln!(f, "Empty cells: {}", self.empty_cells.len())?;
        write_capped(f, &self.empty_cells, self.max_items, |f, item| {
            writeln!(f, " - tag: {} coord: {} -> {}", item.tag, item.location, item.reason)
        })?;
        writeln!(f)?;

        writeln!(f, "Read errors: {}", self.errors.len())?;
        write_capped(f, &self.errors, self.max_items, |f, item| {
            writeln!(
                f,
                " - tag: {} label: {} sheet: {} coord: {} -> {}",
                item.tag, item.label, item.sheet, item.coordinate, item.error
            )
        })?;

        if let Some(warning) = &self.render_warning {
            writeln!(f)?;
            writeln!(f, "Render warning: {}", warning)?;
        }
        Ok(())
    }
}
