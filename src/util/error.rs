// AlertSleuth - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all AlertSleuth operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum AlertSleuthError {
    /// Downloading or reading the workbook bytes failed.
    Fetch(FetchError),

    /// Building the unified table or the code list failed.
    Load(LoadError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for AlertSleuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for AlertSleuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors related to obtaining the workbook bytes.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP request failed (transport error or non-success status).
    Http {
        url: String,
        source: Box<ureq::Error>,
    },

    /// I/O error reading a local workbook or the response body.
    Io { source: String, error: io::Error },

    /// The workbook exceeds the configured download cap.
    TooLarge { source: String, max_bytes: u64 },

    /// The payload is not a spreadsheet (e.g. an HTML interstitial page).
    UnexpectedContent { source: String, detail: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url, source } => write!(f, "Request to '{url}' failed: {source}"),
            Self::Io { source, error } => write!(f, "Cannot read '{source}': {error}"),
            Self::TooLarge { source, max_bytes } => write!(
                f,
                "Workbook '{source}' exceeds the maximum download size of {max_bytes} bytes. \
                 Raise [source] max_download_bytes in config if this is expected."
            ),
            Self::UnexpectedContent { source, detail } => {
                write!(f, "'{source}' did not return a spreadsheet: {detail}")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http { source, .. } => Some(source.as_ref()),
            Self::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<FetchError> for AlertSleuthError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors related to reading sheets into records. Any of these aborts the
/// whole load; a partially built table is never returned.
#[derive(Debug)]
pub enum LoadError {
    /// The bytes could not be opened as a workbook.
    Workbook { source: calamine::Error },

    /// I/O error reading a workbook file from disk.
    Io { path: PathBuf, source: io::Error },

    /// A configured sheet does not exist in the workbook.
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// A sheet exists but its cells could not be read.
    SheetRead {
        sheet: String,
        source: calamine::Error,
    },

    /// The sheet has no header row.
    EmptySheet { sheet: String },

    /// A required column header is missing from a sheet.
    MissingColumn { sheet: String, column: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook { source } => write!(f, "Cannot open workbook: {source}"),
            Self::Io { path, source } => {
                write!(f, "Cannot read workbook '{}': {source}", path.display())
            }
            Self::SheetNotFound { sheet, available } => write!(
                f,
                "Sheet '{sheet}' not found in workbook (available: {})",
                available.join(", ")
            ),
            Self::SheetRead { sheet, source } => {
                write!(f, "Cannot read sheet '{sheet}': {source}")
            }
            Self::EmptySheet { sheet } => write!(f, "Sheet '{sheet}' has no header row"),
            Self::MissingColumn { sheet, column } => {
                write!(f, "Sheet '{sheet}' is missing required column '{column}'")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Workbook { source } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::SheetRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LoadError> for AlertSleuthError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// Workbook serialisation error.
    Xlsx {
        path: PathBuf,
        source: rust_xlsxwriter::XlsxError,
    },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum record count.
    TooManyRecords { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Xlsx { path, source } => {
                write!(f, "Excel export error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyRecords { count, max } => write!(
                f,
                "Export of {count} records exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Xlsx { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for AlertSleuthError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for AlertSleuthError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for AlertSleuth results.
pub type Result<T> = std::result::Result<T, AlertSleuthError>;
