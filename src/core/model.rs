// AlertSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::sync::Arc;

// =============================================================================
// Record (one row of the unified table)
// =============================================================================

/// A single alert entry from one of the source sheets.
///
/// This is the core data unit that flows through filtering, display,
/// and export. Records are built once at load time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Calendar date of the alert email. `None` when the cell was empty or
    /// could not be interpreted as a date.
    pub date: Option<NaiveDate>,

    /// Announcement title. Empty when the cell was empty.
    pub title: String,

    /// Announcement URL as written in the sheet (not validated).
    pub url: Option<String>,

    /// Link to the published document as written in the sheet (not validated).
    pub document_link: Option<String>,

    /// Sheet the record was read from.
    pub source_sheet: SourceSheet,

    /// Raw CPV cell text. Matched by substring only, never parsed.
    pub classification_codes: Option<String>,
}

// =============================================================================
// Source sheet tag
// =============================================================================

/// Name of the sheet a record originates from.
///
/// Cheap to clone: every record of a sheet shares the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceSheet(Arc<str>);

impl SourceSheet {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SourceSheet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// =============================================================================
// Classification code (CPV lookup entry)
// =============================================================================

/// One selectable CPV filter option from the lookup sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationCode {
    /// Short code identifier, e.g. "45000000".
    pub code: String,

    /// Human-readable description.
    pub description: String,

    /// `code - description`. Unique key of the lookup list and the string
    /// matched against record CPV cells when selected.
    pub label: String,
}

impl ClassificationCode {
    pub fn new(code: String, description: String) -> Self {
        let label = format!("{code}{}{description}", constants::CODE_LABEL_SEPARATOR);
        Self {
            code,
            description,
            label,
        }
    }
}

// =============================================================================
// Workbook layout (which sheets and columns to read)
// =============================================================================

/// Column headers expected in the data and lookup sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub date: String,
    pub title: String,
    pub url: String,
    pub document_link: String,
    pub codes: String,
    /// Header of the origin-sheet column written to exports.
    pub source: String,
    pub lookup_code: String,
    pub lookup_description: String,
}

impl ColumnNames {
    /// Headers of the projected columns, in export order.
    pub fn projected(&self) -> [&str; 6] {
        [
            self.date.as_str(),
            self.title.as_str(),
            self.url.as_str(),
            self.document_link.as_str(),
            self.source.as_str(),
            self.codes.as_str(),
        ]
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: constants::DEFAULT_DATE_COLUMN.to_string(),
            title: constants::DEFAULT_TITLE_COLUMN.to_string(),
            url: constants::DEFAULT_URL_COLUMN.to_string(),
            document_link: constants::DEFAULT_DOCUMENT_COLUMN.to_string(),
            codes: constants::DEFAULT_CODES_COLUMN.to_string(),
            source: constants::DEFAULT_SOURCE_COLUMN.to_string(),
            lookup_code: constants::DEFAULT_LOOKUP_CODE_COLUMN.to_string(),
            lookup_description: constants::DEFAULT_LOOKUP_DESCRIPTION_COLUMN.to_string(),
        }
    }
}

/// Sheets to concatenate (in order), the lookup sheet, and column headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookLayout {
    pub sheets: Vec<String>,
    pub lookup_sheet: String,
    pub columns: ColumnNames,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            sheets: constants::DEFAULT_SOURCE_SHEETS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            lookup_sheet: constants::DEFAULT_LOOKUP_SHEET.to_string(),
            columns: ColumnNames::default(),
        }
    }
}
