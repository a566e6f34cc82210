//! Mapping table: label → coordinate pairs read from the workbook.
//!
//! The mapping sheet holds labels in column A and coordinate expressions in
//! column B, starting at row 1. Tie-breaks are fixed:
//!
//! - mapping sheet: exact (case-insensitive) name, then first name
//!   containing the keyword, then the first sheet
//! - duplicate labels: the last row wins for the coordinate
//! - labels normalizing to the same key: the last label wins, the key keeps
//!   its first-seen position

use std::collections::HashMap;

use docmerge_data::SheetAccess;

use crate::error::{CoreError, Result};
use crate::normalize::normalize;

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Column A text, trimmed
    pub label: String,
    /// Column B text, trimmed; may be empty, sheet-qualified or a range
    pub coordinate: String,
}

impl MappingEntry {
    /// Create an entry
    pub fn new(label: impl Into<String>, coordinate: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            coordinate: coordinate.into(),
        }
    }
}

/// Pick the sheet that holds the mapping table
pub fn find_mapping_sheet(sheet_names: &[String], keyword: &str) -> Option<String> {
    let keyword = keyword.to_lowercase();

    sheet_names
        .iter()
        .find(|name| name.trim().to_lowercase() == keyword)
        .or_else(|| {
            sheet_names
                .iter()
                .find(|name| name.to_lowercase().contains(&keyword))
        })
        .or_else(|| sheet_names.first())
        .cloned()
}

/// First sheet other than the mapping sheet, or the mapping sheet itself
pub fn default_data_sheet(sheet_names: &[String], mapping_sheet: &str) -> String {
    sheet_names
        .iter()
        .find(|name| name.as_str() != mapping_sheet)
        .cloned()
        .unwrap_or_else(|| mapping_sheet.to_string())
}

/// Read label/coordinate pairs from columns A and B
///
/// Rows with an empty label are skipped. An empty result is a
/// [`CoreError::MissingMapping`].
pub fn read_mapping<W: SheetAccess + ?Sized>(workbook: &W, sheet: &str) -> Result<Vec<MappingEntry>> {
    let mut entries = Vec::new();

    if let Some(last_row) = workbook.last_row(sheet) {
        for row in 0..=last_row {
            let label = workbook.cell_value(sheet, row, 0).to_string();
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let coordinate = workbook.cell_value(sheet, row, 1).to_string();
            entries.push(MappingEntry::new(label, coordinate.trim()));
        }
    }

    if entries.is_empty() {
        return Err(CoreError::MissingMapping(format!(
            "sheet '{}' has no label/coordinate pairs in columns A/B",
            sheet
        )));
    }

    tracing::debug!(sheet, entries = entries.len(), "read mapping table");
    Ok(entries)
}

/// Lookup structures built from the mapping entries
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    /// Distinct labels, first-seen order
    labels: Vec<String>,
    /// Coordinate per label, last row wins
    coordinates: HashMap<String, String>,
    /// Normalized key → label, keys in first-seen order
    normalized: Vec<(String, String)>,
    /// Position of each key in `normalized`
    index: HashMap<String, usize>,
}

impl MappingTable {
    /// Build the lookups from entries in sheet order
    pub fn new(entries: &[MappingEntry]) -> Self {
        let mut table = Self::default();

        for entry in entries {
            if !table.coordinates.contains_key(&entry.label) {
                table.labels.push(entry.label.clone());
            }
            table
                .coordinates
                .insert(entry.label.clone(), entry.coordinate.clone());
        }

        for label in &table.labels {
            let key = normalize(label);
            match table.index.get(&key) {
                Some(&pos) => table.normalized[pos].1 = label.clone(),
                None => {
                    table.index.insert(key.clone(), table.normalized.len());
                    table.normalized.push((key, label.clone()));
                }
            }
        }

        table
    }

    /// Distinct labels in first-seen order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Coordinate expression for a label; empty for unknown labels
    pub fn coordinate(&self, label: &str) -> &str {
        self.coordinates
            .get(label)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Label owning a normalized key
    pub fn label_for_key(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.normalized[pos].1.as_str())
    }

    /// Normalized keys with their labels, first-seen order
    pub fn normalized(&self) -> impl Iterator<Item = (&str, &str)> {
        self.normalized
            .iter()
            .map(|(key, label)| (key.as_str(), label.as_str()))
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when there are no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
