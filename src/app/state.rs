// AlertSleuth - app/state.rs
//
// Application state management. Holds the session's dataset, filter state,
// and the latest filter outcome.
// Owned by the eframe::App implementation; also drives the headless CLI run.

use crate::app::dataset::{Dataset, DatasetCache};
use crate::core::export::ExportFormat;
use crate::core::filter::{self, FilterOutcome, FilterState};
use crate::core::model::{ClassificationCode, Record, WorkbookLayout};
use crate::platform::config::AppConfig;
use crate::platform::fetch::WorkbookSource;

/// What the results area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView<'a> {
    /// No dataset yet.
    Loading,

    /// The last load failed and nothing is loaded.
    LoadFailed(&'a str),

    /// No criteria entered.
    WaitingForInput,

    /// Criteria entered, nothing matched.
    NoResults,

    /// Rows to display, in table order.
    Rows(Vec<&'a Record>),
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Sheets and headers to read.
    pub layout: WorkbookLayout,

    /// Workbook source for (re)loads.
    pub source: WorkbookSource,

    /// Download size cap in bytes.
    pub max_download_bytes: u64,

    /// Session dataset, loaded once and replaced whole on reload.
    pub cache: DatasetCache,

    /// Error from the most recent failed load.
    pub load_error: Option<String>,

    /// Current filter configuration.
    pub filter_state: FilterState,

    /// Outcome of the last `apply_filters` call.
    pub outcome: FilterOutcome,

    /// Narrowing text for the CPV picker list (display only).
    pub code_search: String,

    /// Render the full table while no filter is applied.
    pub show_all: bool,

    /// Status message for the status bar.
    pub status_message: String,

    /// Non-fatal warnings (config validation, date parsing).
    pub warnings: Vec<String>,

    /// Suggested xlsx export file name.
    pub export_file_name: String,

    /// Record count above which an export asks for confirmation.
    pub large_export_threshold: usize,

    /// Large export waiting for confirmation: format and record count.
    pub pending_large_export: Option<(ExportFormat, usize)>,

    /// Whether to show the About dialog.
    pub show_about: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,

    /// Set when the UI should (re)start a background load.
    pub pending_reload: bool,
}

impl AppState {
    /// Create initial state from the validated configuration.
    pub fn new(config: &AppConfig, debug_mode: bool) -> Self {
        Self {
            layout: config.layout.clone(),
            source: config.source.clone(),
            max_download_bytes: config.max_download_bytes,
            cache: DatasetCache::new(),
            load_error: None,
            filter_state: FilterState::default(),
            outcome: FilterOutcome::NotApplied,
            code_search: String::new(),
            show_all: false,
            status_message: "Ready.".to_string(),
            warnings: Vec::new(),
            export_file_name: config.export_file_name.clone(),
            large_export_threshold: config.large_export_threshold,
            pending_large_export: None,
            show_about: false,
            debug_mode,
            pending_reload: true,
        }
    }

    /// Loaded records, or an empty slice before the first load.
    pub fn records(&self) -> &[Record] {
        self.cache.get().map(|d| d.records.as_slice()).unwrap_or_default()
    }

    /// Loaded CPV lookup list.
    pub fn codes(&self) -> &[ClassificationCode] {
        self.cache.get().map(|d| d.codes.as_slice()).unwrap_or_default()
    }

    /// Install a freshly loaded dataset (whole-table replace) and re-run the
    /// current filters against it.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let loaded = self.cache.replace(dataset);
        self.status_message = format!(
            "Loaded {} records and {} CPV codes from {}",
            loaded.records.len(),
            loaded.codes.len(),
            loaded.source
        );
        self.load_error = None;

        // Selections that no longer exist in the new lookup list are dropped.
        let known: Vec<String> = self
            .filter_state
            .selected_codes
            .iter()
            .filter(|label| loaded.codes.iter().any(|c| &c.label == *label))
            .cloned()
            .collect();
        self.filter_state.selected_codes = known.into_iter().collect();
        self.apply_filters();
    }

    /// Record a failed load. A previously loaded dataset is kept.
    pub fn set_load_failed(&mut self, error: String) {
        self.status_message = format!("Load failed: {error}");
        self.load_error = Some(error);
    }

    /// Recompute the outcome from the current records and filter state.
    pub fn apply_filters(&mut self) {
        self.outcome = filter::apply_filters(self.records(), &self.filter_state);
        tracing::debug!(
            query = %self.filter_state.query,
            codes = self.filter_state.selected_codes.len(),
            matched = self.outcome.len(),
            applied = self.outcome.is_applied(),
            "Filters applied"
        );
    }

    /// Select or deselect a CPV label and re-filter.
    pub fn toggle_code(&mut self, label: &str) {
        if !self.filter_state.selected_codes.remove(label) {
            self.filter_state.selected_codes.insert(label.to_string());
        }
        self.apply_filters();
    }

    /// Reset query and code selection.
    pub fn clear_filters(&mut self) {
        self.filter_state = FilterState::default();
        self.code_search.clear();
        self.apply_filters();
    }

    /// CPV entries whose label contains the picker's narrowing text
    /// (case-insensitive).
    pub fn visible_codes(&self) -> Vec<&ClassificationCode> {
        let needle = self.code_search.trim().to_lowercase();
        self.codes()
            .iter()
            .filter(|c| needle.is_empty() || c.label.to_lowercase().contains(&needle))
            .collect()
    }

    /// Records the current filter selected, or `None` when no filter applies.
    pub fn filtered_records(&self) -> Option<Vec<&Record>> {
        self.outcome.select(self.records())
    }

    /// Records an export should write: the filtered set while a filter is
    /// applied, else the whole table when "show all" is on. `None` when there
    /// is nothing to export.
    pub fn exportable_records(&self) -> Option<Vec<Record>> {
        if let Some(rows) = self.filtered_records() {
            return Some(rows.into_iter().cloned().collect());
        }
        if self.show_all && self.cache.is_loaded() {
            return Some(self.records().to_vec());
        }
        None
    }

    /// Number of records `exportable_records` would return, without cloning.
    pub fn export_count(&self) -> usize {
        if self.outcome.is_applied() {
            self.outcome.len()
        } else if self.show_all {
            self.records().len()
        } else {
            0
        }
    }

    /// Decide what the results area shows. An applied filter always wins;
    /// "show all" only replaces the waiting-for-input state.
    pub fn results_view(&self) -> ResultsView<'_> {
        if !self.cache.is_loaded() {
            return match &self.load_error {
                Some(e) => ResultsView::LoadFailed(e),
                None => ResultsView::Loading,
            };
        }
        match self.filtered_records() {
            Some(rows) if rows.is_empty() => ResultsView::NoResults,
            Some(rows) => ResultsView::Rows(rows),
            None if self.show_all => ResultsView::Rows(self.records().iter().collect()),
            None => ResultsView::WaitingForInput,
        }
    }
}
