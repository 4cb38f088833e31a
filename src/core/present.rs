// AlertSleuth - core/present.rs
//
// Display shaping for result tables: link validation and Markdown rendering.
// Only affects what is shown; exports always use the raw record values.

use crate::core::model::{ColumnNames, Record};
use crate::util::constants;
use std::fmt;

/// A link cell as it should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link<'a> {
    /// Clickable link with a fixed label.
    Available { label: &'static str, url: &'a str },

    /// No usable link; rendered as the placeholder text.
    Missing,
}

impl fmt::Display for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available { label, url } => write!(f, "[{label}]({})", md_url(url)),
            Self::Missing => f.write_str(constants::NO_LINK_PLACEHOLDER),
        }
    }
}

/// Turn a raw link cell into a displayable link.
///
/// Only values starting with `http` become links; empty cells and anything
/// else ("no disponible", relative paths, ...) become the placeholder.
pub fn linkify<'a>(value: Option<&'a str>, label: &'static str) -> Link<'a> {
    match value {
        Some(url) if url.starts_with(constants::LINK_SCHEME_PREFIX) => {
            Link::Available { label, url }
        }
        _ => Link::Missing,
    }
}

/// Display link for the announcement URL column.
pub fn url_link(record: &Record) -> Link<'_> {
    linkify(record.url.as_deref(), constants::URL_LINK_LABEL)
}

/// Display link for the document column.
pub fn document_link(record: &Record) -> Link<'_> {
    linkify(record.document_link.as_deref(), constants::DOCUMENT_LINK_LABEL)
}

/// Date column text (empty when the record has no date).
pub fn date_text(record: &Record) -> String {
    record
        .date
        .map(|d| d.format(constants::DATE_DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

/// Escape text for a single Markdown table cell.
fn md_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Percent-encode the characters that would end a Markdown link target or
/// split a table row.
fn md_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '|' => out.push_str("%7C"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            ' ' => out.push_str("%20"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            '\t' => out.push_str("%09"),
            other => out.push(other),
        }
    }
    out
}

/// Render records as a Markdown table with link columns transformed.
pub fn render_markdown<'a, I>(records: I, columns: &ColumnNames) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let headers = columns.projected();
    let mut out = String::new();

    out.push('|');
    for header in headers {
        out.push(' ');
        out.push_str(&md_cell(header));
        out.push_str(" |");
    }
    out.push('\n');
    out.push('|');
    for _ in headers {
        out.push_str(" --- |");
    }
    out.push('\n');

    for record in records {
        let cells = [
            date_text(record),
            md_cell(&record.title),
            url_link(record).to_string(),
            document_link(record).to_string(),
            md_cell(record.source_sheet.as_str()),
            md_cell(record.classification_codes.as_deref().unwrap_or_default()),
        ];
        out.push('|');
        for c in &cells {
            out.push(' ');
            out.push_str(c);
            out.push_str(" |");
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::SourceSheet;
    use chrono::NaiveDate;

    fn make_record(url: Option<&str>, doc: Option<&str>) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2025, 5, 8),
            title: "Obras | fase 2".to_string(),
            url: url.map(str::to_string),
            document_link: doc.map(str::to_string),
            source_sheet: SourceSheet::new("BOE Alertas de Anuncios"),
            classification_codes: Some("45000000".to_string()),
        }
    }

    #[test]
    fn test_linkify_requires_http_prefix() {
        assert_eq!(
            linkify(Some("https://boe.es"), "Abrir enlace"),
            Link::Available {
                label: "Abrir enlace",
                url: "https://boe.es"
            }
        );
        assert_eq!(linkify(Some("www.boe.es"), "Abrir enlace"), Link::Missing);
        assert_eq!(linkify(Some(""), "Abrir enlace"), Link::Missing);
        assert_eq!(linkify(None, "Abrir enlace"), Link::Missing);
    }

    #[test]
    fn test_link_display() {
        assert_eq!(
            linkify(Some("http://a.b"), "Ver documento").to_string(),
            "[Ver documento](http://a.b)"
        );
        assert_eq!(Link::Missing.to_string(), "(sin enlace)");
    }

    #[test]
    fn test_markdown_table_rows() {
        let records = vec![make_record(Some("https://boe.es/a"), Some("n/d"))];
        let md = render_markdown(&records, &ColumnNames::default());
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "| Fecha correo | Título | URL | Ver documento | Fuente | CPVs |"
        );
        assert_eq!(
            lines[2],
            "| 2025-05-08 | Obras \\| fase 2 | [Abrir enlace](https://boe.es/a) | (sin enlace) | BOE Alertas de Anuncios | 45000000 |"
        );
    }

    #[test]
    fn test_link_target_escapes_row_and_paren_breakers() {
        let link = linkify(Some("https://boe.es/buscar?q=a|b (c)"), "Abrir enlace");
        assert_eq!(
            link.to_string(),
            "[Abrir enlace](https://boe.es/buscar?q=a%7Cb%20%28c%29)"
        );

        let records = vec![make_record(Some("https://boe.es/x|y"), Some("https://d.es/(1)"))];
        let md = render_markdown(&records, &ColumnNames::default());
        let row = md.lines().nth(2).unwrap();
        assert_eq!(row.matches(" | ").count(), 5);
        assert!(row.contains("[Abrir enlace](https://boe.es/x%7Cy)"));
        assert!(row.contains("[Ver documento](https://d.es/%281%29)"));
    }
}
