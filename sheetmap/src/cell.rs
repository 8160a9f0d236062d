//! Raw cell values as delivered by a cell grid.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// A raw spreadsheet value, typed as far as the grid could tell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// A formula error such as `#DIV/0!`, kept as text.
    Error(String),
}

impl CellValue {
    /// Build a text cell, normalising blank text to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::String(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The textual form used by transformers and textual mappers.
    ///
    /// Integral floats print without a fractional part so `1.0` reads as `"1"`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) | CellValue::Error(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            other => serializer.serialize_str(&other.as_text()),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Convert an Excel serial date (1900 date system) to a date-time.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    // Day 0 is 1899-12-30 once the 1900 leap-year bug is accounted for.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// One cell as seen by the value pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadCell {
    /// Zero-based row index in the grid.
    pub row: usize,
    /// Zero-based source column, absent for synthetic cells.
    pub column: Option<usize>,
    pub value: CellValue,
}

impl ReadCell {
    pub fn new(row: usize, column: Option<usize>, value: CellValue) -> Self {
        Self { row, column, value }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn text(&self) -> String {
        self.value.as_text()
    }

    /// The same position with a different value.
    pub fn with_value(&self, value: CellValue) -> Self {
        Self {
            row: self.row,
            column: self.column,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_normalises_blank() {
        assert_eq!(CellValue::text(""), CellValue::Empty);
        assert_eq!(CellValue::text(" "), CellValue::String(" ".into()));
    }

    #[test]
    fn test_integral_float_text() {
        assert_eq!(CellValue::Float(1.0).as_text(), "1");
        assert_eq!(CellValue::Float(-3.0).as_text(), "-3");
        assert_eq!(CellValue::Float(2.5).as_text(), "2.5");
    }

    #[test]
    fn test_excel_serial_dates() {
        let dt = excel_serial_to_datetime(42920.0).unwrap();
        assert_eq!(dt, NaiveDate::from_ymd_opt(2017, 7, 4).unwrap().and_hms_opt(0, 0, 0).unwrap());

        let noon = excel_serial_to_datetime(42920.5).unwrap();
        assert_eq!(noon.format("%H:%M").to_string(), "12:00");

        assert!(excel_serial_to_datetime(-1.0).is_none());
    }

    #[test]
    fn test_serialize_cells() {
        let cells = vec![
            CellValue::Empty,
            CellValue::Int(3),
            CellValue::text("a"),
            CellValue::Bool(true),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,3,"a",true]"#);
    }
}
