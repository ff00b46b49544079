//! Tabular data sources: delimited text and spreadsheets.
//!
//! The first row supplies the column names. Empty cells become nulls.

use super::extension;
use crate::error::LoadError;
use calamine::{open_workbook_auto, Data, Reader};
use common::model::datasource::DataSourceType;
use common::model::dataset::Dataset;
use std::fs;
use std::path::Path;

/// Picks the most frequent of `,`, `;`, tab and `|` in the header line.
pub fn detect_delimiter(header_line: &str) -> u8 {
    [b',', b';', b'\t', b'|']
        .into_iter()
        .max_by_key(|&d| header_line.matches(d as char).count())
        .filter(|&d| header_line.contains(d as char))
        .unwrap_or(b',')
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses delimited text; the delimiter is detected from the header line.
pub fn read_csv(text: &str) -> Result<Dataset, LoadError> {
    let text = text.trim_start_matches('\u{feff}');
    let header_line = text.lines().next().unwrap_or_default();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(header_line))
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(LoadError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(non_empty).collect());
    }
    Ok(Dataset::new(columns, rows))
}

/// Stringifies a cell. Date cells render as `YYYY-MM-DD HH:MM:SS`; ISO
/// date and duration text is kept as written.
fn cell_value(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(v) | Data::DateTimeIso(v) | Data::DurationIso(v) => non_empty(v),
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(|d| d.to_string())
            .or_else(|| Some(cell.to_string())),
        other => Some(other.to_string()),
    }
}

/// Reads the first worksheet of a workbook.
pub fn read_spreadsheet(path: &Path) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .ok_or(LoadError::MissingHeader)?
        .iter()
        .map(|c| cell_value(c).unwrap_or_default().trim().to_string())
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(LoadError::MissingHeader);
    }

    let rows = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    Ok(Dataset::new(columns, rows))
}

/// Loads a data source, choosing the reader by file extension.
pub fn open_data_source(path: &Path) -> Result<(DataSourceType, Dataset), LoadError> {
    let ext = extension(path)?;
    match DataSourceType::from_extension(&ext) {
        Some(DataSourceType::Csv) => {
            let bytes = fs::read(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let text =
                String::from_utf8(bytes).map_err(|_| LoadError::Encoding(path.to_path_buf()))?;
            Ok((DataSourceType::Csv, read_csv(&text)?))
        }
        Some(DataSourceType::Spreadsheet) => {
            Ok((DataSourceType::Spreadsheet, read_spreadsheet(path)?))
        }
        None => Err(LoadError::UnsupportedType(ext)),
    }
}
