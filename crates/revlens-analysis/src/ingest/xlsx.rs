//! Excel workbooks. Only the first sheet is read.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::unreadable;
use crate::error::IngestError;

const FORMAT: &str = "XLSX";
/// Header names holding the review body, by priority.
const REVIEW_COLUMNS: &[&str] = &["review", "comment", "feedback", "text"];
const DATE_COLUMNS: &[&str] = &["date", "created"];
/// A string cell longer than this may stand in for a missing review column.
const MIN_FALLBACK_CHARS: usize = 10;

pub(super) fn parse_xlsx(name: &str, bytes: &[u8]) -> Result<String, IngestError> {
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes)).map_err(|e| unreadable(name, FORMAT, e))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(String::new());
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| unreadable(name, FORMAT, e))?;

    let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
    tracing::debug!(file = name, sheet = %sheet, rows = rows.len(), "read worksheet");
    Ok(rows_to_text(&rows))
}

/// One line per data row. The first row names the columns; a sheet with no
/// data rows below it is returned cell by cell instead.
fn rows_to_text(rows: &[Vec<Data>]) -> String {
    let Some((header, records)) = rows.split_first() else {
        return String::new();
    };
    let headers: Vec<String> = header
        .iter()
        .map(|c| cell_text(c).trim().to_lowercase())
        .collect();
    let records: Vec<&Vec<Data>> = records.iter().filter(|r| !joined(r).is_empty()).collect();

    let lines: Vec<String> = if records.is_empty() {
        rows.iter().map(|r| joined(r)).collect()
    } else {
        records
            .into_iter()
            .map(|row| record_line(&headers, row))
            .collect()
    };
    lines
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn record_line(headers: &[String], row: &[Data]) -> String {
    let review = named_value(headers, row, REVIEW_COLUMNS).or_else(|| {
        row.iter().find_map(|cell| match cell {
            Data::String(s) if s.trim().chars().count() > MIN_FALLBACK_CHARS => {
                Some(s.trim().to_owned())
            }
            _ => None,
        })
    });
    let date = named_value(headers, row, DATE_COLUMNS);

    match (date, review) {
        (Some(date), Some(review)) => format!("[{date}] {review}"),
        (None, Some(review)) => review,
        (_, None) => joined(row),
    }
}

/// The first non-empty cell under one of `names`, tried in order.
fn named_value(headers: &[String], row: &[Data], names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        let index = headers.iter().position(|h| h == name)?;
        let value = cell_text(row.get(index)?);
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    })
}

fn joined(row: &[Data]) -> String {
    row.iter()
        .map(cell_text)
        .filter(|v| !v.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
