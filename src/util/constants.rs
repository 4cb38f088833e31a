// AlertSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "AlertSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "AlertSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Workbook source
// =============================================================================

/// Google Drive file id of the shared alerts workbook.
pub const DEFAULT_DRIVE_FILE_ID: &str = "1YafhQs3SZwKJqoOLoOg_Y9Q7DR0nibEo";

/// Direct-download URL prefix for Google Drive files. The file id is appended.
pub const DRIVE_DOWNLOAD_URL_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";

/// Default cap on the downloaded workbook size in bytes.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024; // 50 MB

/// Smallest configurable download cap. Anything lower cannot hold a real workbook.
pub const MIN_MAX_DOWNLOAD_BYTES: u64 = 4 * 1024; // 4 KB

/// Hard upper bound on the download cap (prevents configuration mistakes).
pub const ABSOLUTE_MAX_DOWNLOAD_BYTES: u64 = 1024 * 1024 * 1024; // 1 GB

/// Magic prefix of zip containers (xlsx, xlsb, ods).
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Magic prefix of OLE compound documents (legacy xls).
pub const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

// =============================================================================
// Workbook layout
// =============================================================================

/// Data sheets concatenated into the unified table, in load order.
pub const DEFAULT_SOURCE_SHEETS: &[&str] = &[
    "BOE Alertas de Anuncios",
    "BOE Alertas de Personal",
    "BOE Alertas legislativas",
    "BOE Alertas temáticas",
    "DOUE Alertas legislativas",
];

/// Sheet holding the CPV code lookup list.
pub const DEFAULT_LOOKUP_SHEET: &str = "Listado CPV";

/// Maximum number of configured source sheets.
pub const MAX_SOURCE_SHEETS: usize = 64;

/// Default data-sheet column headers.
pub const DEFAULT_DATE_COLUMN: &str = "Fecha correo";
pub const DEFAULT_TITLE_COLUMN: &str = "Título";
pub const DEFAULT_URL_COLUMN: &str = "URL";
pub const DEFAULT_DOCUMENT_COLUMN: &str = "Ver documento";
pub const DEFAULT_CODES_COLUMN: &str = "CPVs";

/// Header of the origin-sheet column added to the unified table and exports.
pub const DEFAULT_SOURCE_COLUMN: &str = "Fuente";

/// Default lookup-sheet column headers.
pub const DEFAULT_LOOKUP_CODE_COLUMN: &str = "Código CPV";
pub const DEFAULT_LOOKUP_DESCRIPTION_COLUMN: &str = "Descripción";

/// Separator between code and description in a classification label.
pub const CODE_LABEL_SEPARATOR: &str = " - ";

/// Largest Excel serial day number (9999-12-31).
pub const MAX_EXCEL_SERIAL_DAY: f64 = 2_958_465.0;

// =============================================================================
// Presentation
// =============================================================================

/// Link label for the announcement URL column.
pub const URL_LINK_LABEL: &str = "Abrir enlace";

/// Link label for the document column.
pub const DOCUMENT_LINK_LABEL: &str = "Ver documento";

/// Placeholder rendered when a link cell is absent or not an http(s) URL.
pub const NO_LINK_PLACEHOLDER: &str = "(sin enlace)";

/// Scheme prefix a link value must start with to be rendered as a link.
pub const LINK_SCHEME_PREFIX: &str = "http";

/// Date format used for display and text exports.
pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Export
// =============================================================================

/// Default file name offered for the xlsx export.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "resultados_filtrados.xlsx";

/// Worksheet name used in exported workbooks.
pub const EXPORT_SHEET_NAME: &str = "Resultados";

/// Excel number format applied to exported date cells.
pub const EXPORT_DATE_NUM_FORMAT: &str = "yyyy-mm-dd";

/// Maximum number of records in one export (Excel row limit minus the header).
pub const MAX_EXPORT_RECORDS: usize = 1_048_575;

/// Number of records above which the UI warns before exporting.
pub const DEFAULT_LARGE_EXPORT_THRESHOLD: usize = 100_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
