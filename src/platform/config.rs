// AlertSleuth - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::WorkbookLayout;
use crate::platform::fetch::WorkbookSource;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for AlertSleuth configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/alertsleuth/ or %APPDATA%\AlertSleuth\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[source]` section.
    pub source: SourceSection,
    /// `[workbook]` section.
    pub workbook: WorkbookSection,
    /// `[columns]` section.
    pub columns: ColumnsSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Local workbook path (highest precedence).
    pub path: Option<String>,
    /// Workbook URL.
    pub url: Option<String>,
    /// Google Drive file id of a shared workbook.
    pub drive_file_id: Option<String>,
    /// Download size cap in bytes.
    pub max_download_bytes: Option<u64>,
}

/// `[workbook]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct WorkbookSection {
    /// Data sheets, concatenated in this order.
    pub sheets: Option<Vec<String>>,
    /// CPV lookup sheet.
    pub lookup_sheet: Option<String>,
}

/// `[columns]` config section: header overrides.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ColumnsSection {
    pub date: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub document_link: Option<String>,
    pub codes: Option<String>,
    pub source: Option<String>,
    pub lookup_code: Option<String>,
    pub lookup_description: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Suggested xlsx export file name.
    pub file_name: Option<String>,
    /// Warn before exporting this many records.
    pub large_export_warning_threshold: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Source --
    /// Where to fetch the workbook from.
    pub source: WorkbookSource,
    /// Download size cap in bytes.
    pub max_download_bytes: u64,

    // -- Workbook --
    /// Sheets and column headers to read.
    pub layout: WorkbookLayout,

    // -- Export --
    /// Suggested xlsx export file name.
    pub export_file_name: String,
    /// Record count above which the UI warns before exporting.
    pub large_export_threshold: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: WorkbookSource::default(),
            max_download_bytes: constants::DEFAULT_MAX_DOWNLOAD_BYTES,
            layout: WorkbookLayout::default(),
            export_file_name: constants::DEFAULT_EXPORT_FILE_NAME.to_string(),
            large_export_threshold: constants::DEFAULT_LARGE_EXPORT_THRESHOLD,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate a config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// When `explicit` is false (the platform default location), a missing or
/// unparseable file falls back to defaults with a warning; when the user named
/// the file on the command line, those conditions are errors.
pub fn load_config(
    config_path: &Path,
    explicit: bool,
) -> Result<(AppConfig, Vec<String>), ConfigError> {
    if !explicit && !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return Ok((AppConfig::default(), Vec::new()));
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) if explicit => {
            return Err(ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            })
        }
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            return Ok((AppConfig::default(), vec![msg]));
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) if explicit => {
            return Err(ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            })
        }
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            return Ok((AppConfig::default(), vec![msg]));
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Source: path > url > drive_file_id > default --
    let non_empty = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    if let Some(path) = non_empty(&raw.source.path) {
        config.source = WorkbookSource::Path(PathBuf::from(path));
    } else if let Some(url) = non_empty(&raw.source.url) {
        match WorkbookSource::parse(&url) {
            src @ WorkbookSource::Url(_) => config.source = src,
            WorkbookSource::Path(_) => warnings.push(format!(
                "[source] url = \"{url}\" is not an http(s) URL. Use [source] path for local files. Using default source.",
            )),
        }
    } else if let Some(id) = non_empty(&raw.source.drive_file_id) {
        config.source = WorkbookSource::google_drive(&id);
    }

    // -- Source: max_download_bytes --
    if let Some(bytes) = raw.source.max_download_bytes {
        if (constants::MIN_MAX_DOWNLOAD_BYTES..=constants::ABSOLUTE_MAX_DOWNLOAD_BYTES)
            .contains(&bytes)
        {
            config.max_download_bytes = bytes;
        } else {
            warnings.push(format!(
                "[source] max_download_bytes = {bytes} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_DOWNLOAD_BYTES,
                constants::ABSOLUTE_MAX_DOWNLOAD_BYTES,
                constants::DEFAULT_MAX_DOWNLOAD_BYTES,
            ));
        }
    }

    // -- Workbook: sheets --
    if let Some(sheets) = raw.workbook.sheets {
        let sheets: Vec<String> = sheets
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if sheets.is_empty() || sheets.len() > constants::MAX_SOURCE_SHEETS {
            warnings.push(format!(
                "[workbook] sheets must list 1-{} sheet names. Using default sheets.",
                constants::MAX_SOURCE_SHEETS,
            ));
        } else {
            config.layout.sheets = sheets;
        }
    }

    // -- Workbook: lookup_sheet --
    if let Some(sheet) = non_empty(&raw.workbook.lookup_sheet) {
        config.layout.lookup_sheet = sheet;
    }

    // -- Columns: header overrides --
    let columns = &mut config.layout.columns;
    for (value, target) in [
        (&raw.columns.date, &mut columns.date),
        (&raw.columns.title, &mut columns.title),
        (&raw.columns.url, &mut columns.url),
        (&raw.columns.document_link, &mut columns.document_link),
        (&raw.columns.codes, &mut columns.codes),
        (&raw.columns.source, &mut columns.source),
        (&raw.columns.lookup_code, &mut columns.lookup_code),
        (&raw.columns.lookup_description, &mut columns.lookup_description),
    ] {
        if let Some(header) = non_empty(value) {
            *target = header;
        }
    }

    // -- Export: file_name --
    if let Some(name) = non_empty(&raw.export.file_name) {
        if name.to_lowercase().ends_with(".xlsx") {
            config.export_file_name = name;
        } else {
            warnings.push(format!(
                "[export] file_name = \"{name}\" must end in .xlsx. Using default ({}).",
                constants::DEFAULT_EXPORT_FILE_NAME,
            ));
        }
    }

    // -- Export: large_export_warning_threshold --
    if let Some(threshold) = raw.export.large_export_warning_threshold {
        if (1..=constants::MAX_EXPORT_RECORDS).contains(&threshold) {
            config.large_export_threshold = threshold;
        } else {
            warnings.push(format!(
                "[export] large_export_warning_threshold = {threshold} is out of range (1-{}). Using default ({}).",
                constants::MAX_EXPORT_RECORDS,
                constants::DEFAULT_LARGE_EXPORT_THRESHOLD,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(file) = non_empty(&raw.logging.file) {
        config.log_file = Some(file);
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}
