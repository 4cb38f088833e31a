// AlertSleuth - tests/e2e_search.rs
//
// End-to-end tests for the fetch -> load -> filter -> present -> export
// pipeline.
//
// These tests write real xlsx workbooks to disk with rust_xlsxwriter and read
// them back through the same calamine path the application uses: no mocks,
// no stubs.

use alertsleuth::app::dataset::{Dataset, DatasetCache};
use alertsleuth::app::state::{AppState, ResultsView};
use alertsleuth::core::export::{export_to_file, ExportFormat};
use alertsleuth::core::filter::{apply_filters, FilterOutcome, FilterState};
use alertsleuth::core::loader::{load_exported_records, Workbook};
use alertsleuth::core::model::WorkbookLayout;
use alertsleuth::core::present::render_markdown;
use alertsleuth::platform::config::AppConfig;
use alertsleuth::platform::fetch::WorkbookSource;
use alertsleuth::util::constants;
use alertsleuth::util::error::{AlertSleuthError, LoadError};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

const HEADER: [&str; 5] = ["Fecha correo", "Título", "URL", "Ver documento", "CPVs"];

/// One data row: (excel serial date, title, url, document link, cpvs).
type Row = (f64, &'static str, &'static str, &'static str, &'static str);

/// Rows per default source sheet, in sheet order.
fn sheet_rows() -> Vec<(&'static str, Vec<Row>)> {
    vec![
        (
            "BOE Alertas de Anuncios",
            vec![
                (
                    45785.0,
                    "Anuncio de licitación de obras de urbanización",
                    "https://www.boe.es/diario_boe/txt.php?id=BOE-B-2025-1",
                    "https://www.boe.es/boe/dias/2025/05/08/pdfs/BOE-B-2025-1.pdf",
                    "45000000 - Trabajos de construcción",
                ),
                (
                    45786.5,
                    "Anuncio de suministro de material sanitario",
                    "https://www.boe.es/diario_boe/txt.php?id=BOE-B-2025-2",
                    "",
                    "33000000 - Equipamiento médico",
                ),
            ],
        ),
        (
            "BOE Alertas de Personal",
            vec![(
                45787.0,
                "Resolución de oposiciones",
                "no disponible",
                "",
                "",
            )],
        ),
        ("BOE Alertas legislativas", vec![]),
        (
            "BOE Alertas temáticas",
            vec![(
                45788.0,
                "Obras en el BOE alertas temáticas",
                "",
                "",
                "45200000 - Obras de construcción",
            )],
        ),
        (
            "DOUE Alertas legislativas",
            vec![(
                45789.0,
                "Reglamento de ejecución sobre obras públicas",
                "https://eur-lex.europa.eu/x",
                "https://eur-lex.europa.eu/x.pdf",
                "45000000 - Trabajos de construcción; 71000000 - Servicios de arquitectura",
            )],
        ),
    ]
}

fn cpv_rows() -> Vec<(&'static str, &'static str)> {
    vec![
        ("45000000", "Trabajos de construcción"),
        ("33000000", "Equipamiento médico"),
        ("45000000", "Trabajos de construcción"),
        ("71000000", ""),
        ("45200000", "Obras de construcción"),
    ]
}

/// Write the alerts workbook to `path`.
fn write_alerts_workbook(path: &Path, sheets: &[(&str, Vec<Row>)]) {
    let mut wb = XlsxWorkbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    for (name, rows) in sheets {
        let ws = wb.add_worksheet();
        ws.set_name(*name).unwrap();
        for (c, h) in HEADER.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        for (r, (date, title, url, doc, cpvs)) in rows.iter().enumerate() {
            let r = (r + 1) as u32;
            ws.write_number_with_format(r, 0, *date, &date_format).unwrap();
            ws.write_string(r, 1, *title).unwrap();
            for (c, value) in [(2u16, url), (3, doc), (4, cpvs)] {
                if !value.is_empty() {
                    ws.write_string(r, c, *value).unwrap();
                }
            }
        }
    }
    let lookup = wb.add_worksheet();
    lookup.set_name(constants::DEFAULT_LOOKUP_SHEET).unwrap();
    lookup.write_string(0, 0, "Código CPV").unwrap();
    lookup.write_string(0, 1, "Descripción").unwrap();
    for (r, (code, desc)) in cpv_rows().iter().enumerate() {
        let r = (r + 1) as u32;
        lookup.write_string(r, 0, *code).unwrap();
        if !desc.is_empty() {
            lookup.write_string(r, 1, *desc).unwrap();
        }
    }
    wb.save(path).unwrap();
}

fn fixture_workbook(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("alertas.xlsx");
    write_alerts_workbook(&path, &sheet_rows());
    path
}

fn load_fixture(path: &Path) -> Dataset {
    Dataset::fetch_and_load(
        &WorkbookSource::Path(path.to_path_buf()),
        &WorkbookLayout::default(),
        constants::DEFAULT_MAX_DOWNLOAD_BYTES,
    )
    .unwrap()
}

fn titles(dataset: &Dataset, outcome: &FilterOutcome) -> Vec<String> {
    outcome
        .select(&dataset.records)
        .unwrap()
        .into_iter()
        .map(|r| r.title.clone())
        .collect()
}

// =============================================================================
// Load E2E
// =============================================================================

/// Every configured sheet contributes its rows, in order, tagged with its name.
#[test]
fn e2e_loads_unified_table_in_sheet_order() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_fixture(&fixture_workbook(&dir));

    let expected: usize = sheet_rows().iter().map(|(_, rows)| rows.len()).sum();
    assert_eq!(dataset.records.len(), expected);

    let sources: Vec<&str> = dataset
        .records
        .iter()
        .map(|r| r.source_sheet.as_str())
        .collect();
    assert_eq!(
        sources,
        vec![
            "BOE Alertas de Anuncios",
            "BOE Alertas de Anuncios",
            "BOE Alertas de Personal",
            "BOE Alertas temáticas",
            "DOUE Alertas legislativas",
        ]
    );

    // Time of day is dropped: 45786.5 is noon on 2025-05-09.
    assert_eq!(dataset.records[1].date, NaiveDate::from_ymd_opt(2025, 5, 9));
    assert_eq!(dataset.records[0].document_link.as_deref().map(|d| d.ends_with(".pdf")), Some(true));
    assert_eq!(dataset.records[1].document_link, None);
}

/// The CPV list drops incomplete rows, dedupes by label and sorts.
#[test]
fn e2e_builds_sorted_deduplicated_cpv_list() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_fixture(&fixture_workbook(&dir));

    let labels: Vec<&str> = dataset.codes.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "33000000 - Equipamiento médico",
            "45000000 - Trabajos de construcción",
            "45200000 - Obras de construcción",
        ]
    );
}

/// A missing configured sheet fails the whole load.
#[test]
fn e2e_missing_sheet_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("incompleto.xlsx");
    let mut sheets = sheet_rows();
    sheets.retain(|(name, _)| *name != "BOE Alertas legislativas");
    write_alerts_workbook(&path, &sheets);

    let result = Dataset::fetch_and_load(
        &WorkbookSource::Path(path),
        &WorkbookLayout::default(),
        constants::DEFAULT_MAX_DOWNLOAD_BYTES,
    );
    assert!(
        matches!(
            result,
            Err(AlertSleuthError::Load(LoadError::SheetNotFound { ref sheet, .. }))
                if sheet == "BOE Alertas legislativas"
        ),
        "expected SheetNotFound, got {result:?}"
    );
}

/// The compute-once holder reads the file a single time per session.
#[test]
fn e2e_cache_survives_workbook_removal() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture_workbook(&dir);
    let mut cache = DatasetCache::new();

    let first = cache.get_or_load(|| Ok(load_fixture(&path))).unwrap().records.len();
    std::fs::remove_file(&path).unwrap();
    let second = cache
        .get_or_load(|| panic!("loader must not run twice"))
        .unwrap()
        .records
        .len();
    assert_eq!(first, second);
}

// =============================================================================
// Filter E2E
// =============================================================================

#[test]
fn e2e_filter_sentinel_and_text_search() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_fixture(&fixture_workbook(&dir));

    let none = apply_filters(&dataset.records, &FilterState::new(None, Vec::<String>::new()));
    assert_eq!(none, FilterOutcome::NotApplied);

    let outcome = apply_filters(
        &dataset.records,
        &FilterState::new(Some("boe alertas"), Vec::<String>::new()),
    );
    assert_eq!(titles(&dataset, &outcome), vec!["Obras en el BOE alertas temáticas"]);

    let outcome = apply_filters(
        &dataset.records,
        &FilterState::new(Some("OBRAS"), Vec::<String>::new()),
    );
    assert_eq!(
        titles(&dataset, &outcome),
        vec![
            "Anuncio de licitación de obras de urbanización",
            "Obras en el BOE alertas temáticas",
            "Reglamento de ejecución sobre obras públicas",
        ]
    );
}

#[test]
fn e2e_filter_by_code_and_combined() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_fixture(&fixture_workbook(&dir));
    let construction = dataset.codes[1].label.clone();

    let by_code = apply_filters(
        &dataset.records,
        &FilterState::new(None, [construction.clone()]),
    );
    assert_eq!(by_code.len(), 2);

    let combined = apply_filters(
        &dataset.records,
        &FilterState::new(Some("reglamento"), [construction]),
    );
    assert_eq!(
        titles(&dataset, &combined),
        vec!["Reglamento de ejecución sobre obras públicas"]
    );

    let nothing = apply_filters(
        &dataset.records,
        &FilterState::new(Some("inexistente"), Vec::<String>::new()),
    );
    assert!(nothing.is_empty_result());
}

// =============================================================================
// Present + export E2E
// =============================================================================

#[test]
fn e2e_markdown_links_and_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_fixture(&fixture_workbook(&dir));
    let md = render_markdown(&dataset.records, &WorkbookLayout::default().columns);

    assert!(md.contains("[Abrir enlace](https://www.boe.es/diario_boe/txt.php?id=BOE-B-2025-1)"));
    assert!(md.contains("[Ver documento](https://eur-lex.europa.eu/x.pdf)"));
    // "no disponible" is not a link.
    let personal = md
        .lines()
        .find(|l| l.contains("Resolución de oposiciones"))
        .unwrap();
    assert_eq!(personal.matches("(sin enlace)").count(), 2);
}

/// Exported rows reload field-for-field, with raw (untransformed) links.
#[test]
fn e2e_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_fixture(&fixture_workbook(&dir));
    let columns = WorkbookLayout::default().columns;

    let outcome = apply_filters(
        &dataset.records,
        &FilterState::new(Some("obras"), Vec::<String>::new()),
    );
    let filtered: Vec<_> = outcome
        .select(&dataset.records)
        .unwrap()
        .into_iter()
        .cloned()
        .collect();

    let dest = dir.path().join(constants::DEFAULT_EXPORT_FILE_NAME);
    let n = export_to_file(ExportFormat::Xlsx, &filtered, &columns, &dest).unwrap();
    assert_eq!(n, 3);

    let mut wb = Workbook::open(&dest).unwrap();
    let reloaded = load_exported_records(&mut wb, constants::EXPORT_SHEET_NAME, &columns).unwrap();
    assert_eq!(reloaded, filtered);
    assert!(reloaded
        .iter()
        .all(|r| r.url.as_deref().map_or(true, |u| !u.contains("Abrir enlace"))));
}

// =============================================================================
// Session E2E
// =============================================================================

/// The app state distinguishes waiting, results, and no-results, and a reload
/// replaces the whole table.
#[test]
fn e2e_session_states_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture_workbook(&dir);
    let mut state = AppState::new(&AppConfig::default(), false);
    state.source = WorkbookSource::Path(path.clone());

    state.set_dataset(load_fixture(&path));
    assert_eq!(state.results_view(), ResultsView::WaitingForInput);

    state.filter_state.query = "suministro".to_string();
    state.apply_filters();
    assert!(matches!(state.results_view(), ResultsView::Rows(ref rows) if rows.len() == 1));

    // Reload from a workbook with fewer rows.
    let mut smaller = sheet_rows();
    smaller[0].1.truncate(1);
    write_alerts_workbook(&path, &smaller);
    state.set_dataset(load_fixture(&path));
    assert_eq!(state.records().len(), 4);
    assert_eq!(state.results_view(), ResultsView::NoResults);
}
