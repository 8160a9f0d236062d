//! CSV grids with encoding and delimiter auto-detection.
//!
//! Every record becomes one grid row, the heading row included: deciding
//! whether the first row is a heading is the sheet's job, not the parser's.
//! Field text is kept as written. Only zero-length fields are empty cells,
//! and rows of empty fields are kept so row numbers match the file.

use std::path::Path;

use csv::ReaderBuilder;
use log::debug;

use super::MemoryGrid;
use crate::cell::CellValue;
use crate::error::{GridError, GridResult};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows
    pub grid: MemoryGrid,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> GridResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                debug!("invalid utf-8 ({}), decoding lossily", e);
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => Ok(enc.decode(bytes).0.into_owned()),
            None => Err(GridError::Encoding(format!("unknown encoding '{}'", other))),
        },
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into a grid with an explicit delimiter.
///
/// # Example
/// ```
/// use sheetmap::grid::{csv::parse_csv, CellGrid};
///
/// let grid = parse_csv("Sheet1", "name;age\nAlice;30", ';').unwrap();
/// assert_eq!(grid.row_count(), 2);
/// assert_eq!(grid.column_count(), 2);
/// ```
pub fn parse_csv(name: &str, content: &str, delimiter: char) -> GridResult<MemoryGrid> {
    if content.trim().is_empty() {
        return Err(GridError::Empty);
    }

    let delimiter = u8::try_from(delimiter)
        .map_err(|_| GridError::UnsupportedFormat(format!("delimiter '{}'", delimiter)))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::text).collect());
    }

    Ok(MemoryGrid::new(name, rows))
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(name: &str, bytes: &[u8]) -> GridResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    debug!(
        "csv '{}': encoding {}, delimiter {:?}",
        name, encoding, delimiter
    );

    let grid = parse_csv(name, &content, delimiter)?;
    Ok(ParseResult {
        grid,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// The grid is named after the file stem.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> GridResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    parse_bytes_auto(&sheet_name(path), &bytes)
}

/// Parse a CSV file with an explicit delimiter.
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: char) -> GridResult<MemoryGrid> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let content = decode_content(&bytes, &detect_encoding(&bytes))?;
    parse_csv(&sheet_name(path), &content, delimiter)
}

fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}
