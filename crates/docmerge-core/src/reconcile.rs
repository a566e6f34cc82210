//! Tag reconciliation: template tags against mapping labels.
//!
//! Strategies are tried in a fixed order and the first hit wins:
//!
//! 1. `norm_exact` - `normalize(tag)` is a known key
//! 2. `space_to_underscore` - spaces in the tag replaced by `_` first
//! 3. `underscore_to_space` - underscores in the tag replaced by spaces first
//! 4. `compact_numeric` - keys compared with every `_` removed; the first
//!    key in mapping order wins

use std::fmt;

use crate::mapping::MappingTable;
use crate::normalize::normalize;

/// Strategy that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    NormExact,
    SpaceToUnderscore,
    UnderscoreToSpace,
    CompactNumeric,
    Unmatched,
}

impl MatchMethod {
    /// Name used in the report
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::NormExact => "norm_exact",
            MatchMethod::SpaceToUnderscore => "space_to_underscore",
            MatchMethod::UnderscoreToSpace => "underscore_to_space",
            MatchMethod::CompactNumeric => "compact_numeric",
            MatchMethod::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of matching one template tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Tag as written in the template
    pub tag: String,
    /// Mapping label the tag resolved to
    pub label: Option<String>,
    pub method: MatchMethod,
}

impl MatchRecord {
    pub fn is_matched(&self) -> bool {
        self.label.is_some()
    }
}

/// Match every tag; one record per tag, in tag order
pub fn reconcile(tags: &[String], table: &MappingTable) -> Vec<MatchRecord> {
    tags.iter()
        .map(|tag| {
            let (label, method) = match match_tag(tag, table) {
                Some((label, method)) => (Some(label.to_string()), method),
                None => (None, MatchMethod::Unmatched),
            };
            tracing::debug!(tag = %tag, method = %method, "reconciled tag");
            MatchRecord {
                tag: tag.clone(),
                label,
                method,
            }
        })
        .collect()
}

fn match_tag<'t>(tag: &str, table: &'t MappingTable) -> Option<(&'t str, MatchMethod)> {
    let key = normalize(tag);
    if let Some(label) = table.label_for_key(&key) {
        return Some((label, MatchMethod::NormExact));
    }

    if let Some(label) = table.label_for_key(&normalize(&tag.replace(' ', "_"))) {
        return Some((label, MatchMethod::SpaceToUnderscore));
    }

    if let Some(label) = table.label_for_key(&normalize(&tag.replace('_', " "))) {
        return Some((label, MatchMethod::UnderscoreToSpace));
    }

    let compact = key.replace('_', "");
    table
        .normalized()
        .find(|(candidate, _)| candidate.replace('_', "") == compact)
        .map(|(_, label)| (label, MatchMethod::CompactNumeric))
}
