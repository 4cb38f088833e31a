// AlertSleuth - core/filter.rs
//
// Filter engine for the unified table.
// Text search and CPV selection are AND-combined; tokens within the text
// search are AND-combined; selected CPV codes are OR-combined.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::Record;
use std::collections::BTreeSet;

/// Complete filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free-text title search. Split on whitespace; every token must appear
    /// in the title (case-insensitive). Empty = no text filter.
    pub query: String,

    /// Selected CPV labels. A record matches when its CPV cell contains any
    /// of them (case-sensitive substring). Empty = no code filter.
    pub selected_codes: BTreeSet<String>,
}

impl FilterState {
    /// Build a filter from an optional query and any iterable of code labels.
    pub fn new<I, S>(query: Option<&str>, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            query: query.unwrap_or_default().to_string(),
            selected_codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if no filters are active.
    ///
    /// A query made only of whitespace still counts as a filter: it has zero
    /// tokens and therefore matches every record.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.selected_codes.is_empty()
    }

    /// Lower-cased whitespace-separated query tokens.
    pub fn tokens(&self) -> Vec<String> {
        self.query.split_whitespace().map(str::to_lowercase).collect()
    }
}

/// Result of applying a filter.
///
/// `NotApplied` means the user asked for nothing; it is deliberately distinct
/// from `Applied` with no matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterOutcome {
    #[default]
    NotApplied,

    /// Indices into the filtered slice, in ascending (original) order.
    Applied(Vec<usize>),
}

impl FilterOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Matching indices, or `None` when no filter was applied.
    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            Self::NotApplied => None,
            Self::Applied(indices) => Some(indices),
        }
    }

    /// Number of matches (zero when not applied).
    pub fn len(&self) -> usize {
        self.indices().map_or(0, <[usize]>::len)
    }

    /// True when a filter was applied and nothing matched.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::Applied(indices) if indices.is_empty())
    }

    /// Resolve the indices against the slice they were computed from.
    pub fn select<'a>(&self, records: &'a [Record]) -> Option<Vec<&'a Record>> {
        self.indices()
            .map(|indices| indices.iter().filter_map(|&i| records.get(i)).collect())
    }
}

/// Apply filters to a slice of records, returning indices of matching records.
///
/// Returns indices into the original slice rather than copies so the UI can
/// render the filtered view with virtual scrolling.
pub fn apply_filters(records: &[Record], filter: &FilterState) -> FilterOutcome {
    if filter.is_empty() {
        return FilterOutcome::NotApplied;
    }

    let tokens = filter.tokens();

    let indices = records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_text(record, &tokens))
        .filter(|(_, record)| matches_codes(record, &filter.selected_codes))
        .map(|(idx, _)| idx)
        .collect();

    FilterOutcome::Applied(indices)
}

/// Every token must be a substring of the lower-cased title.
fn matches_text(record: &Record, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let title = record.title.to_lowercase();
    tokens.iter().all(|token| title.contains(token.as_str()))
}

/// Any selected code must be a substring of the raw CPV cell.
fn matches_codes(record: &Record, selected: &BTreeSet<String>) -> bool {
    if selected.is_empty() {
        return true;
    }
    let cell = record.classification_codes.as_deref().unwrap_or_default();
    selected.iter().any(|code| cell.contains(code.as_str()))
}
