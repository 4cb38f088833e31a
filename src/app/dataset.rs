// AlertSleuth - app/dataset.rs
//
// The session's loaded data: the unified record table plus the CPV lookup
// list, and the compute-once holder that keeps it for the session.

use crate::core::loader::{self, Workbook};
use crate::core::model::{ClassificationCode, Record, WorkbookLayout};
use crate::platform::fetch::{self, WorkbookSource};
use crate::util::error::Result;
use std::time::Instant;

/// Immutable result of one load: never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Unified table, sheet order then row order.
    pub records: Vec<Record>,

    /// Deduplicated, sorted CPV lookup list.
    pub codes: Vec<ClassificationCode>,

    /// Where the workbook came from (for the status bar).
    pub source: WorkbookSource,
}

impl Dataset {
    /// Build a dataset from an already-opened workbook.
    ///
    /// Either every configured sheet loads or the whole call fails.
    pub fn from_workbook(
        workbook: &mut Workbook,
        layout: &WorkbookLayout,
        source: WorkbookSource,
    ) -> Result<Self> {
        let records = loader::load_records(workbook, &layout.sheets, &layout.columns)?;
        let codes =
            loader::load_classification_codes(workbook, &layout.lookup_sheet, &layout.columns)?;
        Ok(Self {
            records,
            codes,
            source,
        })
    }

    /// Fetch the workbook and load it.
    pub fn fetch_and_load(
        source: &WorkbookSource,
        layout: &WorkbookLayout,
        max_download_bytes: u64,
    ) -> Result<Self> {
        let started = Instant::now();
        let bytes = fetch::fetch_workbook(source, max_download_bytes)?;
        let mut workbook = Workbook::from_bytes(bytes)?;
        let dataset = Self::from_workbook(&mut workbook, layout, source.clone())?;
        tracing::info!(
            source = %source,
            records = dataset.records.len(),
            codes = dataset.codes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dataset loaded"
        );
        Ok(dataset)
    }
}

/// Compute-once holder for the session's dataset.
///
/// Empty until the first successful load; a reload replaces the whole
/// dataset. A failed load leaves the holder untouched.
#[derive(Debug, Default)]
pub struct DatasetCache {
    dataset: Option<Dataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The held dataset, if loaded.
    pub fn get(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Return the held dataset, running `load` only if nothing is held yet.
    pub fn get_or_load<F>(&mut self, load: F) -> Result<&Dataset>
    where
        F: FnOnce() -> Result<Dataset>,
    {
        let dataset = match self.dataset.take() {
            Some(held) => {
                tracing::debug!("Dataset cache hit");
                held
            }
            None => load()?,
        };
        let held: &Dataset = self.dataset.insert(dataset);
        Ok(held)
    }

    /// Whole-table replace.
    pub fn replace(&mut self, dataset: Dataset) -> &Dataset {
        self.dataset.insert(dataset)
    }
}
