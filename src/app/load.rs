// AlertSleuth - app/load.rs
//
// Workbook load lifecycle. Runs fetch + load on a background thread and
// reports progress to the UI thread over an mpsc channel.
//
// Architecture:
//   - `LoadManager` lives on the UI thread; `run_load` runs on a background thread.
//   - A superseded load is abandoned by dropping its receiver; its thread
//     finishes quietly when the next send fails.
//   - All cross-thread communication is via `LoadProgress` channel messages.

use crate::app::dataset::Dataset;
use crate::core::loader::Workbook;
use crate::core::model::WorkbookLayout;
use crate::platform::fetch::{self, WorkbookSource};
use crate::util::error::AlertSleuthError;
use std::sync::mpsc;
use std::time::Instant;

/// Progress messages sent from the load thread to the UI.
#[derive(Debug)]
pub enum LoadProgress {
    /// Download or file read has started.
    Fetching { source: String },

    /// Workbook bytes are in memory; sheets are being parsed.
    Fetched { bytes: usize },

    /// Dataset fully loaded.
    Completed { dataset: Box<Dataset> },

    /// Load failed; nothing was loaded.
    Failed { error: String },
}

/// Manages a workbook load on a background thread.
pub struct LoadManager {
    /// Channel receiver for the UI to poll progress messages.
    progress_rx: Option<mpsc::Receiver<LoadProgress>>,
}

impl LoadManager {
    pub fn new() -> Self {
        Self { progress_rx: None }
    }

    /// Start loading `source` with the given layout.
    ///
    /// Spawns a background thread immediately. A load already in flight is
    /// abandoned; only the newest load reports progress.
    pub fn start_load(&mut self, source: WorkbookSource, layout: WorkbookLayout, max_bytes: u64) {
        let (tx, rx) = mpsc::channel();
        self.progress_rx = Some(rx);

        std::thread::spawn(move || {
            run_load(source, layout, max_bytes, tx);
        });

        tracing::info!("Workbook load started");
    }

    /// Whether a load has been started and not yet finished.
    pub fn is_loading(&self) -> bool {
        self.progress_rx.is_some()
    }

    /// Poll for progress messages without blocking. Returns all pending messages.
    ///
    /// The receiver is released once a terminal message has been seen.
    pub fn poll_progress(&mut self) -> Vec<LoadProgress> {
        let mut messages = Vec::new();
        let mut finished = false;
        if let Some(ref rx) = self.progress_rx {
            loop {
                match rx.try_recv() {
                    Ok(msg) => {
                        if matches!(
                            msg,
                            LoadProgress::Completed { .. } | LoadProgress::Failed { .. }
                        ) {
                            finished = true;
                        }
                        messages.push(msg);
                    }
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        if !finished {
                            messages.push(LoadProgress::Failed {
                                error: "Load thread stopped unexpectedly".to_string(),
                            });
                        }
                        finished = true;
                        break;
                    }
                }
            }
        }
        if finished {
            self.progress_rx = None;
        }
        messages
    }
}

impl Default for LoadManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch → open → load. Runs on a background thread.
fn run_load(
    source: WorkbookSource,
    layout: WorkbookLayout,
    max_bytes: u64,
    tx: mpsc::Sender<LoadProgress>,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                return; // Receiver dropped (superseded or UI closed).
            }
        };
    }

    let started = Instant::now();
    send!(LoadProgress::Fetching {
        source: source.to_string(),
    });

    let bytes = match fetch::fetch_workbook(&source, max_bytes) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(source = %source, error = %e, "Workbook fetch failed");
            send!(LoadProgress::Failed {
                error: e.to_string(),
            });
            return;
        }
    };
    send!(LoadProgress::Fetched { bytes: bytes.len() });

    let result = Workbook::from_bytes(bytes)
        .map_err(AlertSleuthError::from)
        .and_then(|mut wb| Dataset::from_workbook(&mut wb, &layout, source.clone()));

    match result {
        Ok(dataset) => {
            tracing::info!(
                records = dataset.records.len(),
                codes = dataset.codes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Background load completed"
            );
            send!(LoadProgress::Completed {
                dataset: Box::new(dataset),
            });
        }
        Err(e) => {
            tracing::error!(source = %source, error = %e, "Workbook load failed");
            send!(LoadProgress::Failed {
                error: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    fn wait_for_terminal(manager: &mut LoadManager) -> Vec<LoadProgress> {
        let mut all = Vec::new();
        for _ in 0..500 {
            all.extend(manager.poll_progress());
            if !manager.is_loading() {
                return all;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("load did not finish in time");
    }

    #[test]
    fn test_missing_file_reports_failed() {
        let mut manager = LoadManager::new();
        manager.start_load(
            WorkbookSource::Path(PathBuf::from("/nonexistent/alertsleuth/book.xlsx")),
            WorkbookLayout::default(),
            1024,
        );
        let messages = wait_for_terminal(&mut manager);
        assert!(matches!(messages.first(), Some(LoadProgress::Fetching { .. })));
        assert!(matches!(messages.last(), Some(LoadProgress::Failed { .. })));
    }

    #[test]
    fn test_non_spreadsheet_reports_failed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<html>not a workbook</html>").unwrap();
        let mut manager = LoadManager::new();
        manager.start_load(
            WorkbookSource::Path(file.path().to_path_buf()),
            WorkbookLayout::default(),
            1024,
        );
        let messages = wait_for_terminal(&mut manager);
        let Some(LoadProgress::Failed { error }) = messages.last() else {
            panic!("expected failure, got {messages:?}");
        };
        assert!(error.contains("not a workbook"));
    }

    #[test]
    fn test_idle_manager_has_no_messages() {
        let mut manager = LoadManager::default();
        assert!(!manager.is_loading());
        assert!(manager.poll_progress().is_empty());
    }
}
