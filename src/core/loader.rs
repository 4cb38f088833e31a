// AlertSleuth - core/loader.rs
//
// Builds the unified record table and the CPV lookup list from a workbook.
//
// Pipeline per source sheet (in configured order):
//   1. Read the used range; first row is the header.
//   2. Resolve the required columns by header text (missing = fatal).
//   3. Project each non-blank row to a Record tagged with the sheet name,
//      normalising the date cell to a calendar date.
//
// Any failure aborts the whole load so callers never see a partial table.

use crate::core::model::{ClassificationCode, ColumnNames, Record, SourceSheet};
use crate::util::constants;
use crate::util::error::LoadError;
use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

/// Days from 0001-01-01 (day 1) to 1899-12-30, the Excel serial epoch.
const EXCEL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// Text layouts with a time-of-day component, tried in order.
const DATETIME_TEXT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only text layouts, tried after the date-time layouts.
const DATE_TEXT_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

// =============================================================================
// Workbook handle
// =============================================================================

/// An opened in-memory workbook (xlsx, xls, xlsb or ods).
pub struct Workbook {
    sheets: Sheets<Cursor<Vec<u8>>>,
    names: Vec<String>,
}

impl Workbook {
    /// Open a workbook from raw bytes, detecting the format from its content.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|source| LoadError::Workbook { source })?;
        let names = sheets.sheet_names().to_vec();
        tracing::debug!(sheets = ?names, "Workbook opened");
        Ok(Self { sheets, names })
    }

    /// Read a workbook file from disk.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    fn read_sheet(&mut self, name: &str) -> Result<SheetTable, LoadError> {
        if !self.names.iter().any(|n| n == name) {
            return Err(LoadError::SheetNotFound {
                sheet: name.to_string(),
                available: self.names.clone(),
            });
        }

        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|source| LoadError::SheetRead {
                sheet: name.to_string(),
                source,
            })?;

        let mut rows = range.rows();
        let header = rows.next().ok_or_else(|| LoadError::EmptySheet {
            sheet: name.to_string(),
        })?;
        let headers = header
            .iter()
            .map(|c| cell_text(c).map(|h| h.trim().to_string()).unwrap_or_default())
            .collect();

        // Fully blank rows inside the used range carry no record.
        let body = rows
            .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
            .map(<[Data]>::to_vec)
            .collect();

        Ok(SheetTable {
            name: name.to_string(),
            headers,
            rows: body,
        })
    }
}

/// Header plus body rows of one sheet.
struct SheetTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
}

impl SheetTable {
    fn column(&self, header: &str) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|h| h == header.trim())
            .ok_or_else(|| LoadError::MissingColumn {
                sheet: self.name.clone(),
                column: header.to_string(),
            })
    }
}

fn cell(row: &[Data], idx: usize) -> &Data {
    row.get(idx).unwrap_or(&Data::Empty)
}

// =============================================================================
// Record projection
// =============================================================================

/// Column indices of the projected fields within one sheet.
struct DataColumns {
    date: usize,
    title: usize,
    url: usize,
    document_link: usize,
    codes: usize,
    /// Present only when reading a previously exported table.
    source: Option<usize>,
}

impl DataColumns {
    fn resolve(
        table: &SheetTable,
        columns: &ColumnNames,
        with_source: bool,
    ) -> Result<Self, LoadError> {
        Ok(Self {
            date: table.column(&columns.date)?,
            title: table.column(&columns.title)?,
            url: table.column(&columns.url)?,
            document_link: table.column(&columns.document_link)?,
            codes: table.column(&columns.codes)?,
            source: if with_source {
                Some(table.column(&columns.source)?)
            } else {
                None
            },
        })
    }

    /// Project one row. Returns the record and whether a non-empty date cell
    /// had to be dropped because it could not be interpreted.
    fn record(&self, row: &[Data], tag: &SourceSheet) -> (Record, bool) {
        let date_cell = cell(row, self.date);
        let date = normalize_date(date_cell);
        let date_dropped = date.is_none() && !matches!(date_cell, Data::Empty);

        let source_sheet = match self.source.and_then(|idx| cell_text(cell(row, idx))) {
            Some(name) if name != tag.as_str() => SourceSheet::new(&name),
            _ => tag.clone(),
        };

        let record = Record {
            date,
            title: cell_text(cell(row, self.title)).unwrap_or_default(),
            url: cell_text(cell(row, self.url)),
            document_link: cell_text(cell(row, self.document_link)),
            source_sheet,
            classification_codes: cell_text(cell(row, self.codes)),
        };
        (record, date_dropped)
    }
}

/// Build the unified table: every configured sheet in order, each row tagged
/// with the name of the sheet it came from, projected to the record fields.
pub fn load_records(
    workbook: &mut Workbook,
    sheets: &[String],
    columns: &ColumnNames,
) -> Result<Vec<Record>, LoadError> {
    let mut records = Vec::new();

    for name in sheets {
        let table = workbook.read_sheet(name)?;
        let cols = DataColumns::resolve(&table, columns, false)?;
        let tag = SourceSheet::new(name);
        let before = records.len();
        let mut dropped_dates = 0usize;

        records.reserve(table.rows.len());
        for row in &table.rows {
            let (record, date_dropped) = cols.record(row, &tag);
            if date_dropped {
                dropped_dates += 1;
            }
            records.push(record);
        }

        if dropped_dates > 0 {
            tracing::warn!(
                sheet = %name,
                count = dropped_dates,
                "Unparseable dates replaced with empty values"
            );
        }
        tracing::debug!(sheet = %name, rows = records.len() - before, "Sheet loaded");
    }

    tracing::info!(
        sheets = sheets.len(),
        records = records.len(),
        "Unified table built"
    );
    Ok(records)
}

/// Read a previously exported table back into records. The origin sheet is
/// taken from the source column rather than from the sheet name.
pub fn load_exported_records(
    workbook: &mut Workbook,
    sheet: &str,
    columns: &ColumnNames,
) -> Result<Vec<Record>, LoadError> {
    let table = workbook.read_sheet(sheet)?;
    let cols = DataColumns::resolve(&table, columns, true)?;
    let tag = SourceSheet::new(sheet);
    Ok(table
        .rows
        .iter()
        .map(|row| cols.record(row, &tag).0)
        .collect())
}

// =============================================================================
// CPV lookup list
// =============================================================================

/// Build the CPV filter options: rows missing a code or a description are
/// dropped, labels are deduplicated (first occurrence wins) and the list is
/// sorted ascending by label.
pub fn load_classification_codes(
    workbook: &mut Workbook,
    lookup_sheet: &str,
    columns: &ColumnNames,
) -> Result<Vec<ClassificationCode>, LoadError> {
    let table = workbook.read_sheet(lookup_sheet)?;
    let code_idx = table.column(&columns.lookup_code)?;
    let desc_idx = table.column(&columns.lookup_description)?;

    let mut by_label: BTreeMap<String, ClassificationCode> = BTreeMap::new();
    let mut incomplete = 0usize;

    for row in &table.rows {
        let (Some(code), Some(description)) = (
            cell_text(cell(row, code_idx)),
            cell_text(cell(row, desc_idx)),
        ) else {
            incomplete += 1;
            continue;
        };
        let entry = ClassificationCode::new(code, description);
        by_label.entry(entry.label.clone()).or_insert(entry);
    }

    tracing::info!(
        sheet = %lookup_sheet,
        codes = by_label.len(),
        skipped = incomplete,
        "CPV lookup list built"
    );
    Ok(by_label.into_values().collect())
}

// =============================================================================
// Cell conversion
// =============================================================================

/// Text content of a cell. Empty strings, empty cells and error cells yield
/// `None`; whole numbers render without a fractional part.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            (!s.is_empty()).then(|| s.clone())
        }
        Data::Float(f) => Some(format_number(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| dt.to_string()),
        ),
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

/// Interpret a cell as a calendar date, discarding any time of day.
///
/// Accepts Excel date cells, bare serial numbers, ISO 8601 text and
/// day-first text (`08/05/2025`). Anything else yields `None`.
pub fn normalize_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => parse_date_text(s),
        _ => None,
    }
}

/// Convert an Excel 1900-system serial (fractional part = time) to a date.
/// Serials before 1900-03-01 are off by one because of Excel's phantom
/// 1900-02-29; the alert data never reaches back that far.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=constants::MAX_EXCEL_SERIAL_DAY).contains(&serial) {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(EXCEL_EPOCH_DAYS_FROM_CE + serial.floor() as i32)
}

/// Inverse of [`serial_to_date`] for whole days.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - EXCEL_EPOCH_DAYS_FROM_CE)
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    DATETIME_TEXT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_TEXT_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

    enum Cell {
        Text(&'static str),
        Number(f64),
        DateTime(f64),
        Empty,
    }

    /// Build an xlsx in memory: each sheet is (name, header, rows).
    fn build_workbook(sheets: Vec<(&str, Vec<&str>, Vec<Vec<Cell>>)>) -> Vec<u8> {
        let mut wb = XlsxWorkbook::new();
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        for (name, header, rows) in sheets {
            let ws = wb.add_worksheet();
            ws.set_name(name).unwrap();
            for (c, h) in header.iter().enumerate() {
                ws.write_string(0, c as u16, *h).unwrap();
            }
            for (r, row) in rows.iter().enumerate() {
                let r = (r + 1) as u32;
                for (c, value) in row.iter().enumerate() {
                    let c = c as u16;
                    match value {
                        Cell::Text(s) => {
                            ws.write_string(r, c, *s).unwrap();
                        }
                        Cell::Number(n) => {
                            ws.write_number(r, c, *n).unwrap();
                        }
                        Cell::DateTime(n) => {
                            ws.write_number_with_format(r, c, *n, &datetime_format)
                                .unwrap();
                        }
                        Cell::Empty => {}
                    }
                }
            }
        }
        wb.save_to_buffer().unwrap()
    }

    fn data_header() -> Vec<&'static str> {
        vec![
            "Fecha correo",
            "Título",
            "URL",
            "Ver documento",
            "Extra",
            "CPVs",
        ]
    }

    fn sample_workbook() -> Workbook {
        let bytes = build_workbook(vec![
            (
                "Anuncios",
                data_header(),
                vec![
                    vec![
                        Cell::DateTime(45785.6875),
                        Cell::Text("Licitación de obras"),
                        Cell::Text("https://boe.es/a"),
                        Cell::Text("no disponible"),
                        Cell::Text("ignored"),
                        Cell::Text("45000000 - Construction work"),
                    ],
                    vec![
                        Cell::Text("09/05/2025"),
                        Cell::Text("Suministro"),
                        Cell::Empty,
                        Cell::Empty,
                        Cell::Empty,
                        Cell::Empty,
                    ],
                ],
            ),
            (
                "Personal",
                data_header(),
                vec![vec![
                    Cell::Text("2025-06-01T08:15:00"),
                    Cell::Text("Oposiciones"),
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Number(79_600_000.0),
                ]],
            ),
            (
                "Listado CPV",
                vec!["Código CPV", "Descripción"],
                vec![
                    vec![Cell::Number(45_000_000.0), Cell::Text("Construction work")],
                    vec![Cell::Text("03000000"), Cell::Text("Agricultural products")],
                    vec![Cell::Number(45_000_000.0), Cell::Text("Construction work")],
                    vec![Cell::Text("09000000"), Cell::Empty],
                    vec![Cell::Empty, Cell::Text("Orphan description")],
                ],
            ),
        ]);
        Workbook::from_bytes(bytes).unwrap()
    }

    fn sheets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_records_concatenated_in_sheet_order_and_tagged() {
        let mut wb = sample_workbook();
        let records =
            load_records(&mut wb, &sheets(&["Personal", "Anuncios"]), &ColumnNames::default())
                .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].source_sheet.as_str(), "Personal");
        assert_eq!(records[1].source_sheet.as_str(), "Anuncios");
        assert_eq!(records[2].source_sheet.as_str(), "Anuncios");
        assert_eq!(records[1].title, "Licitación de obras");
        assert_eq!(records[2].title, "Suministro");
    }

    #[test]
    fn test_dates_normalised_to_calendar_day() {
        let mut wb = sample_workbook();
        let records =
            load_records(&mut wb, &sheets(&["Anuncios", "Personal"]), &ColumnNames::default())
                .unwrap();
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 5, 8));
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2025, 5, 9));
        assert_eq!(records[2].date, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[test]
    fn test_projection_keeps_raw_link_text_and_codes() {
        let mut wb = sample_workbook();
        let records =
            load_records(&mut wb, &sheets(&["Anuncios", "Personal"]), &ColumnNames::default())
                .unwrap();
        assert_eq!(records[0].url.as_deref(), Some("https://boe.es/a"));
        assert_eq!(records[0].document_link.as_deref(), Some("no disponible"));
        assert_eq!(
            records[0].classification_codes.as_deref(),
            Some("45000000 - Construction work")
        );
        assert_eq!(records[1].url, None);
        assert_eq!(records[1].classification_codes, None);
        assert_eq!(records[2].classification_codes.as_deref(), Some("79600000"));
    }

    #[test]
    fn test_missing_sheet_fails_whole_load() {
        let mut wb = sample_workbook();
        let result = load_records(
            &mut wb,
            &sheets(&["Anuncios", "DOUE Alertas legislativas"]),
            &ColumnNames::default(),
        );
        assert!(
            matches!(result, Err(LoadError::SheetNotFound { ref sheet, .. }) if sheet == "DOUE Alertas legislativas"),
            "expected SheetNotFound, got {result:?}"
        );
    }

    #[test]
    fn test_missing_column_fails() {
        let mut wb = sample_workbook();
        let columns = ColumnNames {
            title: "Titulo sin tilde".to_string(),
            ..ColumnNames::default()
        };
        let result = load_records(&mut wb, &sheets(&["Anuncios"]), &columns);
        assert!(matches!(result, Err(LoadError::MissingColumn { ref column, .. }) if column == "Titulo sin tilde"));
    }

    #[test]
    fn test_codes_deduplicated_sorted_and_incomplete_dropped() {
        let mut wb = sample_workbook();
        let codes =
            load_classification_codes(&mut wb, "Listado CPV", &ColumnNames::default()).unwrap();
        let labels: Vec<&str> = codes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "03000000 - Agricultural products",
                "45000000 - Construction work"
            ]
        );
        assert_eq!(codes[1].code, "45000000");
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = Workbook::from_bytes(b"<html>not a workbook</html>".to_vec());
        assert!(matches!(result, Err(LoadError::Workbook { .. })));
    }

    #[test]
    fn test_serial_conversion() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 8).unwrap();
        assert_eq!(serial_to_date(45785.0), Some(date));
        assert_eq!(serial_to_date(45785.99), Some(date));
        assert_eq!(date_to_serial(date), 45785.0);
        assert_eq!(serial_to_date(-3.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_text_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 5, 8);
        assert_eq!(parse_date_text("2025-05-08"), expected);
        assert_eq!(parse_date_text("08/05/2025"), expected);
        // Slash dates are day-first.
        assert_eq!(parse_date_text("05/08/2025"), NaiveDate::from_ymd_opt(2025, 8, 5));
        assert_eq!(parse_date_text("2025-05-08 16:30:00"), expected);
        assert_eq!(parse_date_text("2025-05-08T16:30:00+02:00"), expected);
        assert_eq!(parse_date_text("pendiente"), None);
        assert_eq!(parse_date_text("   "), None);
    }

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(cell_text(&Data::Float(45_000_000.0)).as_deref(), Some("45000000"));
        assert_eq!(cell_text(&Data::Float(1.5)).as_deref(), Some("1.5"));
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }
}
