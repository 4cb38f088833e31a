// AlertSleuth - core/export.rs
//
// Excel, CSV and JSON export of filtered records.
// Exports carry the projected columns exactly as loaded; link cells are
// written as their raw text, never as rendered link labels.
// Core layer: writes to any Write trait object.

use crate::core::loader::date_to_serial;
use crate::core::model::{ColumnNames, Record};
use crate::util::constants;
use crate::util::error::ExportError;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::Write;
use std::path::Path;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// File dialog filter name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Xlsx => "Excel workbook",
            Self::Csv => "CSV",
            Self::Json => "JSON",
        }
    }
}

/// Export records in the given format. Returns the number of records written.
pub fn export_records<W: Write>(
    format: ExportFormat,
    records: &[Record],
    columns: &ColumnNames,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Xlsx => export_xlsx(records, columns, writer, export_path),
        ExportFormat::Csv => export_csv(records, columns, writer, export_path),
        ExportFormat::Json => export_json(records, writer, export_path),
    }
}

/// Create `export_path` and export into it.
pub fn export_to_file(
    format: ExportFormat,
    records: &[Record],
    columns: &ColumnNames,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let file = std::fs::File::create(export_path).map_err(|source| ExportError::Io {
        path: export_path.to_path_buf(),
        source,
    })?;
    export_records(
        format,
        records,
        columns,
        std::io::BufWriter::new(file),
        export_path,
    )
}

/// Column widths (in characters) for the exported worksheet, in export order.
const XLSX_COLUMN_WIDTHS: [f64; 6] = [12.0, 80.0, 40.0, 40.0, 26.0, 40.0];

fn check_count(records: &[Record]) -> Result<(), ExportError> {
    if records.len() > constants::MAX_EXPORT_RECORDS {
        return Err(ExportError::TooManyRecords {
            count: records.len(),
            max: constants::MAX_EXPORT_RECORDS,
        });
    }
    Ok(())
}

/// Serialise records to an in-memory xlsx workbook.
pub fn build_xlsx(records: &[Record], columns: &ColumnNames) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(constants::EXPORT_DATE_NUM_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(constants::EXPORT_SHEET_NAME)?;

    for (col, (header, width)) in columns
        .projected()
        .iter()
        .zip(XLSX_COLUMN_WIDTHS)
        .enumerate()
    {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &header_format)?;
        sheet.set_column_width(col, width)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        if let Some(date) = record.date {
            sheet.write_number_with_format(row, 0, date_to_serial(date), &date_format)?;
        }
        if !record.title.is_empty() {
            sheet.write_string(row, 1, record.title.as_str())?;
        }
        if let Some(url) = &record.url {
            sheet.write_string(row, 2, url.as_str())?;
        }
        if let Some(doc) = &record.document_link {
            sheet.write_string(row, 3, doc.as_str())?;
        }
        sheet.write_string(row, 4, record.source_sheet.as_str())?;
        if let Some(codes) = &record.classification_codes {
            sheet.write_string(row, 5, codes.as_str())?;
        }
    }

    workbook.save_to_buffer()
}

/// Export records to xlsx.
///
/// Writes one worksheet with the projected columns; dates are real Excel
/// dates, links are plain text.
pub fn export_xlsx<W: Write>(
    records: &[Record],
    columns: &ColumnNames,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_count(records)?;

    let bytes = build_xlsx(records, columns).map_err(|source| ExportError::Xlsx {
        path: export_path.to_path_buf(),
        source,
    })?;

    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|source| ExportError::Io {
            path: export_path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        path = %export_path.display(),
        records = records.len(),
        bytes = bytes.len(),
        "Excel export written"
    );
    Ok(records.len())
}

/// Export records to CSV format.
///
/// Writes the projected column headers followed by one row per record.
pub fn export_csv<W: Write>(
    records: &[Record],
    columns: &ColumnNames,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_count(records)?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(columns.projected())
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for record in records {
        let date = record
            .date
            .map(|d| d.format(constants::DATE_DISPLAY_FORMAT).to_string())
            .unwrap_or_default();

        csv_writer
            .write_record([
                date.as_str(),
                record.title.as_str(),
                record.url.as_deref().unwrap_or(""),
                record.document_link.as_deref().unwrap_or(""),
                record.source_sheet.as_str(),
                record.classification_codes.as_deref().unwrap_or(""),
            ])
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export records to JSON format (array of objects).
pub fn export_json<W: Write>(
    records: &[Record],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_count(records)?;
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}
