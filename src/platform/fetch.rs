// AlertSleuth - platform/fetch.rs
//
// Obtains the workbook bytes from a local path or an HTTP(S) URL.
// Every session re-fetches; nothing is cached on disk.

use crate::util::constants;
use crate::util::error::FetchError;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where the workbook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookSource {
    /// A workbook file on disk.
    Path(PathBuf),

    /// A workbook downloaded over HTTP(S).
    Url(String),
}

impl WorkbookSource {
    /// Interpret a CLI/config string: `http://` and `https://` prefixes mean a
    /// URL, anything else is a filesystem path.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    /// Direct-download URL for a shared Google Drive file.
    pub fn google_drive(file_id: &str) -> Self {
        Self::Url(format!(
            "{}{}",
            constants::DRIVE_DOWNLOAD_URL_PREFIX,
            file_id.trim()
        ))
    }
}

impl Default for WorkbookSource {
    fn default() -> Self {
        Self::google_drive(constants::DEFAULT_DRIVE_FILE_ID)
    }
}

impl fmt::Display for WorkbookSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// Fetch the workbook bytes, refusing payloads larger than `max_bytes`.
pub fn fetch_workbook(source: &WorkbookSource, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    let started = std::time::Instant::now();
    let bytes = match source {
        WorkbookSource::Path(path) => read_local(path, max_bytes)?,
        WorkbookSource::Url(url) => download(url, max_bytes)?,
    };
    check_spreadsheet_magic(source, &bytes)?;

    tracing::info!(
        source = %source,
        bytes = bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Workbook fetched"
    );
    Ok(bytes)
}

fn read_local(path: &Path, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    let io_err = |error| FetchError::Io {
        source: path.display().to_string(),
        error,
    };
    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_bytes {
        return Err(FetchError::TooLarge {
            source: path.display().to_string(),
            max_bytes,
        });
    }
    std::fs::read(path).map_err(io_err)
}

fn download(url: &str, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    tracing::debug!(url, "Downloading workbook");
    let response = ureq::get(url).call().map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: Box::new(e),
    })?;

    // Read one byte past the cap so an oversize body is detected rather than
    // silently truncated.
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|error| FetchError::Io {
            source: url.to_string(),
            error,
        })?;

    if bytes.len() as u64 > max_bytes {
        return Err(FetchError::TooLarge {
            source: url.to_string(),
            max_bytes,
        });
    }
    Ok(bytes)
}

/// Reject payloads that are neither zip containers nor OLE documents. Shared
/// drive links answer with an HTML page when the file is not public.
fn check_spreadsheet_magic(source: &WorkbookSource, bytes: &[u8]) -> Result<(), FetchError> {
    if bytes.starts_with(constants::ZIP_MAGIC) || bytes.starts_with(constants::OLE_MAGIC) {
        return Ok(());
    }
    let preview: String = String::from_utf8_lossy(&bytes[..bytes.len().min(64)])
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    Err(FetchError::UnexpectedContent {
        source: source.to_string(),
        detail: if bytes.is_empty() {
            "empty response".to_string()
        } else {
            format!("content starts with \"{preview}\"")
        },
    })
}
