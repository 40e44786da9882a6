//! Turning uploaded files into review text and records.
//!
//! Plain text is passed through. CSV exports and Excel workbooks are reduced
//! to one review per row, with a date column, when present, prefixed as
//! `[date] `. Word documents are split into reviews on their numbering,
//! bullets, or paragraph breaks.

mod docx;
mod xlsx;

use std::fmt::Display;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use revlens_core::ReviewRecord;

use crate::error::IngestError;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const HEADER_MARKERS: &[&str] = &["review", "comment", "feedback", "text"];

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{4})").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    PlainText,
    Csv,
    Docx,
    Xlsx,
}

fn detect_kind(name: &str, mime: &str) -> Option<DocumentKind> {
    let mime = mime.trim().to_ascii_lowercase();
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if mime == DOCX_MIME || extension.as_deref() == Some("docx") {
        Some(DocumentKind::Docx)
    } else if mime == XLSX_MIME || extension.as_deref() == Some("xlsx") {
        Some(DocumentKind::Xlsx)
    } else if mime == "text/csv" || extension.as_deref() == Some("csv") {
        Some(DocumentKind::Csv)
    } else if mime == "text/plain" || extension.as_deref() == Some("txt") {
        Some(DocumentKind::PlainText)
    } else {
        None
    }
}

/// Extract review text from an uploaded file.
///
/// `mime` may be empty; the file extension is consulted either way. Text
/// formats are decoded as UTF-8, replacing invalid sequences.
///
/// # Errors
///
/// - [`IngestError::UnsupportedType`] for anything other than plain text,
///   CSV, DOCX, or XLSX.
/// - [`IngestError::Unreadable`] when a DOCX or XLSX file is not a valid
///   document.
pub fn parse_document(name: &str, mime: &str, bytes: &[u8]) -> Result<String, IngestError> {
    let kind = detect_kind(name, mime).ok_or_else(|| IngestError::UnsupportedType {
        name: name.to_owned(),
        mime: if mime.is_empty() {
            "unknown".to_owned()
        } else {
            mime.to_owned()
        },
    })?;

    let parsed = match kind {
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
        DocumentKind::Csv => parse_csv(&String::from_utf8_lossy(bytes)),
        DocumentKind::Docx => docx::parse_docx(name, bytes)?,
        DocumentKind::Xlsx => xlsx::parse_xlsx(name, bytes)?,
    };
    tracing::debug!(file = name, ?kind, chars = parsed.len(), "document parsed");
    Ok(parsed)
}

fn unreadable(name: &str, format: &'static str, reason: impl Display) -> IngestError {
    IngestError::Unreadable {
        name: name.to_owned(),
        format,
        reason: reason.to_string(),
    }
}

fn parse_csv(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    let Some(first) = lines.first() else {
        return String::new();
    };

    let first_lower = first.to_lowercase();
    let has_header = HEADER_MARKERS.iter().any(|m| first_lower.contains(m));
    let rows = if has_header { &lines[1..] } else { &lines[..] };

    rows.iter()
        .map(|row| csv_row_to_review(row))
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv_row_to_review(row: &str) -> String {
    let columns: Vec<&str> = row
        .split(',')
        .map(|c| {
            let c = c.trim();
            let c = c.strip_prefix('"').unwrap_or(c);
            c.strip_suffix('"').unwrap_or(c)
        })
        .collect();

    let body = columns
        .iter()
        .copied()
        .fold("", |longest, c| if c.len() > longest.len() { c } else { longest });
    let date = columns.iter().find(|c| DATE_PATTERN.is_match(c));

    match date {
        Some(date) if !body.is_empty() => format!("[{date}] {body}"),
        _ if !body.is_empty() => body.to_owned(),
        _ => columns.join(" "),
    }
}

/// One record per non-blank line, trimmed, with 1-based positions.
#[must_use]
pub fn reviews_from_text(text: &str) -> Vec<ReviewRecord> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| ReviewRecord::new(i + 1, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use revlens_core::{Sentiment, DEFAULT_CONFIDENCE};

    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = parse_document("reviews.txt", "", b"one\ntwo\n").unwrap();
        assert_eq!(text, "one\ntwo\n");
    }

    #[test]
    fn mime_type_alone_is_enough() {
        assert!(parse_document("upload", "text/plain", b"x").is_ok());
        assert!(parse_document("upload", "text/csv", b"x").is_ok());
    }

    #[test]
    fn pdf_and_unknown_types_are_rejected() {
        for (name, mime) in [
            ("r.pdf", "application/pdf"),
            ("r.doc", "application/msword"),
            ("noext", ""),
        ] {
            let err = parse_document(name, mime, b"data").unwrap_err();
            assert!(matches!(err, IngestError::UnsupportedType { .. }), "{name}");
            assert_eq!(err.kind(), revlens_core::ErrorKind::UnsupportedType);
        }
    }

    #[test]
    fn office_types_are_detected_by_mime_or_extension() {
        assert_eq!(detect_kind("upload", DOCX_MIME), Some(DocumentKind::Docx));
        assert_eq!(detect_kind("r.DOCX", ""), Some(DocumentKind::Docx));
        assert_eq!(detect_kind("upload", XLSX_MIME), Some(DocumentKind::Xlsx));
        assert_eq!(detect_kind("r.xlsx", ""), Some(DocumentKind::Xlsx));
    }

    #[test]
    fn corrupt_office_files_are_unreadable() {
        let err = parse_document("r.docx", "", b"data").unwrap_err();
        assert!(matches!(err, IngestError::Unreadable { format: "DOCX", .. }));
        assert_eq!(err.kind(), revlens_core::ErrorKind::Validation);
    }

    #[test]
    fn csv_skips_header_and_picks_longest_column() {
        let csv = "id,review,rating\n1,\"Battery life is fantastic\",5\n\n2,Too slow,2\n";
        let text = parse_document("export.csv", "text/csv", csv.as_bytes()).unwrap();
        assert_eq!(text, "Battery life is fantastic\nToo slow");
    }

    #[test]
    fn csv_prefixes_date_columns() {
        let csv = "2024-03-01,Shipping took three weeks\n3/7/2024,Lovely packaging\n";
        let text = parse_document("export.csv", "", csv.as_bytes()).unwrap();
        assert_eq!(
            text,
            "[2024-03-01] Shipping took three weeks\n[3/7/2024] Lovely packaging"
        );
    }

    #[test]
    fn csv_without_rows_is_empty() {
        assert_eq!(parse_document("e.csv", "", b"\n\n").unwrap(), "");
        assert_eq!(parse_document("e.csv", "", b"review\n").unwrap(), "");
    }

    #[test]
    fn reviews_from_text_skips_blank_lines() {
        let reviews = reviews_from_text("  Great product \n\n\t\nTerrible service\n");
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].position, 1);
        assert_eq!(reviews[0].text, "Great product");
        assert_eq!(reviews[1].position, 2);
        assert_eq!(reviews[1].sentiment, Sentiment::Neutral);
        assert!((reviews[1].confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
    }
}
