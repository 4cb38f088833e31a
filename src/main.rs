// AlertSleuth - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and validation
// 3. Logging initialisation (debug mode support)
// 4. Headless search (--no-gui) or eframe GUI launch

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use alertsleuth::app;

pub use alertsleuth::core;
pub use alertsleuth::platform;
pub use alertsleuth::ui;
pub use alertsleuth::util;

use crate::app::dataset::Dataset;
use crate::app::state::{AppState, ResultsView};
use crate::core::export::{self, ExportFormat};
use crate::core::filter::FilterState;
use crate::core::present;
use crate::platform::config::AppConfig;
use crate::platform::fetch::WorkbookSource;
use crate::util::error::AlertSleuthError;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// AlertSleuth - search BOE/DOUE alert workbooks by title and CPV code.
///
/// Loads the configured sheets of the alerts workbook into one table and
/// filters it by words in the title and by selected CPV codes.
#[derive(Parser, Debug)]
#[command(name = "AlertSleuth", version, about)]
struct Cli {
    /// Workbook to load: a local .xlsx path or an http(s) URL.
    /// Overrides the [source] section of config.toml.
    #[arg(short = 's', long = "source")]
    source: Option<String>,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Run a single search in the terminal instead of opening the window.
    #[arg(long = "no-gui")]
    no_gui: bool,

    /// Words that must all appear in the title (headless mode).
    #[arg(short = 'q', long = "query")]
    query: Option<String>,

    /// CPV label or code to match; repeat for several (headless mode).
    #[arg(long = "code")]
    codes: Vec<String>,

    /// Write the results to this file; format from the extension
    /// (.xlsx, .csv, .json) (headless mode).
    #[arg(short = 'e', long = "export")]
    export: Option<PathBuf>,

    /// Print the CPV lookup list and exit (headless mode).
    #[arg(long = "list-codes")]
    list_codes: bool,

    /// Print every record when no --query or --code is given (headless mode).
    #[arg(long = "show-all")]
    show_all: bool,
}

/// Config from `--config` (must exist) or the platform default (optional).
fn load_config(cli: &Cli) -> Result<(AppConfig, Vec<String>), AlertSleuthError> {
    let (path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (platform::config::PlatformPaths::resolve().config_file(), false),
    };
    let (mut config, warnings) = platform::config::load_config(&path, explicit)?;
    if let Some(ref source) = cli.source {
        config.source = WorkbookSource::parse(source);
    }
    Ok((config, warnings))
}

/// Headless search: load, filter, print, optionally export.
fn run_headless(
    cli: &Cli,
    config: &AppConfig,
    warnings: Vec<String>,
) -> Result<(), AlertSleuthError> {
    let mut state = AppState::new(config, cli.debug);
    state.warnings = warnings;

    state.cache.get_or_load(|| {
        Dataset::fetch_and_load(&config.source, &config.layout, config.max_download_bytes)
    })?;

    println!("Total records available: {}", state.records().len());

    if cli.list_codes {
        for code in state.codes() {
            println!("{}", code.label);
        }
        return Ok(());
    }

    state.filter_state = FilterState::new(cli.query.as_deref(), cli.codes.iter().cloned());
    state.show_all = cli.show_all;
    state.apply_filters();

    match state.results_view() {
        ResultsView::Rows(rows) => {
            println!("Results found: {}", rows.len());
            println!();
            print!(
                "{}",
                present::render_markdown(rows.iter().copied(), &state.layout.columns)
            );
        }
        ResultsView::NoResults => println!("No results match the current search."),
        ResultsView::WaitingForInput => println!(
            "Enter words to search in the title (--query) or pick CPV codes (--code) to see results."
        ),
        ResultsView::Loading | ResultsView::LoadFailed(_) => {}
    }

    if let Some(ref dest) = cli.export {
        let Some(format) = ExportFormat::from_path(dest) else {
            eprintln!(
                "Cannot export to '{}': use a .xlsx, .csv or .json file name.",
                dest.display()
            );
            return Ok(());
        };
        match state.exportable_records() {
            Some(records) => {
                let n = export::export_to_file(format, &records, &state.layout.columns, dest)?;
                println!("Exported {n} records to {}", dest.display());
            }
            None => eprintln!("Nothing to export: give --query, --code or --show-all."),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is read before logging so [logging] can take effect; its
    // warnings are logged once the subscriber is up.
    let (config, warnings) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            util::logging::init(cli.debug, None, None);
            tracing::error!(error = %e, "Configuration error");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging subsystem
    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        source = %config.source,
        sheets = config.layout.sheets.len(),
        "AlertSleuth starting"
    );
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    if cli.no_gui {
        return match run_headless(&cli, &config, warnings) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Headless search failed");
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    // Create application state; the first frame starts the background load.
    let mut state = AppState::new(&config, cli.debug);
    state.warnings = warnings;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 500.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::AlertSleuthApp::new(state)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch AlertSleuth GUI: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
