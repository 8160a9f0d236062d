//! Cell value transformers.
//!
//! Transformers rewrite the text of a non-empty cell before the pipeline
//! decides whether the cell is empty, so trimming `"   "` yields a present
//! but empty string rather than an empty cell. Empty cells pass through.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cell::{CellValue, ReadCell};

/// All available cell value transformers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellValueTransformer {
    /// Remove leading and trailing whitespace
    Trim,

    /// Convert to uppercase
    Uppercase,

    /// Convert to lowercase
    Lowercase,

    /// Replace every match of a regex pattern
    Replace {
        #[serde(with = "pattern_serde")]
        pattern: Regex,
        #[serde(default)]
        value: String,
    },

    /// Pad string at start to reach target length
    PadStart {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: char,
    },

    /// Pad string at end to reach target length
    PadEnd {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: char,
    },

    /// Ensure string starts with given prefix
    EnsurePrefix { value: String },

    /// Ensure string ends with given suffix
    EnsureSuffix { value: String },

    /// Take characters from `start`, optionally at most `length` of them
    Substring {
        start: usize,
        #[serde(default)]
        length: Option<usize>,
    },

    /// Remove all non-alphanumeric characters
    Alphanumeric,

    /// Remove all non-digit characters
    DigitsOnly,
}

fn default_pad_char() -> char {
    '0'
}

impl CellValueTransformer {
    /// Build a [`CellValueTransformer::Replace`], compiling the pattern once.
    pub fn replace(pattern: &str, value: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(CellValueTransformer::Replace {
            pattern: Regex::new(pattern)?,
            value: value.into(),
        })
    }

    /// Apply this transformer to a cell. Empty cells are returned unchanged.
    pub fn transform_cell(&self, cell: ReadCell) -> ReadCell {
        if cell.is_empty() {
            return cell;
        }
        let text = self.apply(&cell.text());
        cell.with_value(CellValue::String(text))
    }

    /// Apply this transformer to a piece of text
    pub fn apply(&self, value: &str) -> String {
        match self {
            CellValueTransformer::Trim => value.trim().to_string(),
            CellValueTransformer::Uppercase => value.to_uppercase(),
            CellValueTransformer::Lowercase => value.to_lowercase(),
            CellValueTransformer::Replace { pattern, value: replacement } => {
                pattern.replace_all(value, replacement.as_str()).into_owned()
            }
            CellValueTransformer::PadStart { length, char } => {
                let padding = padding(value, *length, *char);
                format!("{}{}", padding, value)
            }
            CellValueTransformer::PadEnd { length, char } => {
                let padding = padding(value, *length, *char);
                format!("{}{}", value, padding)
            }
            CellValueTransformer::EnsurePrefix { value: prefix } => {
                if value.starts_with(prefix.as_str()) {
                    value.to_string()
                } else {
                    format!("{}{}", prefix, value)
                }
            }
            CellValueTransformer::EnsureSuffix { value: suffix } => {
                if value.ends_with(suffix.as_str()) {
                    value.to_string()
                } else {
                    format!("{}{}", value, suffix)
                }
            }
            CellValueTransformer::Substring { start, length } => {
                let chars = value.chars().skip(*start);
                match length {
                    Some(length) => chars.take(*length).collect(),
                    None => chars.collect(),
                }
            }
            CellValueTransformer::Alphanumeric => {
                value.chars().filter(|c| c.is_alphanumeric()).collect()
            }
            CellValueTransformer::DigitsOnly => {
                value.chars().filter(|c| c.is_ascii_digit()).collect()
            }
        }
    }
}

fn padding(value: &str, length: usize, pad: char) -> String {
    let current = value.chars().count();
    (current..length).map(|_| pad).collect()
}

mod pattern_serde {
    use regex::Regex;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pattern: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(pattern.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Regex, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Regex::new(&pattern).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> ReadCell {
        ReadCell::new(1, Some(0), CellValue::text(text))
    }

    #[test]
    fn test_trim() {
        let t = CellValueTransformer::Trim;
        assert_eq!(t.apply("  hello  "), "hello");
    }

    #[test]
    fn test_trim_whitespace_keeps_present_empty_string() {
        let out = CellValueTransformer::Trim.transform_cell(cell("   "));
        assert_eq!(out.value, CellValue::String(String::new()));
        assert!(!out.is_empty());
    }

    #[test]
    fn test_empty_cell_passes_through() {
        let out = CellValueTransformer::EnsurePrefix { value: "T".into() }.transform_cell(cell(""));
        assert!(out.is_empty());
    }

    #[test]
    fn test_numeric_cell_becomes_text() {
        let input = ReadCell::new(0, Some(0), CellValue::Float(42.0));
        let out = CellValueTransformer::PadStart { length: 5, char: '0' }.transform_cell(input);
        assert_eq!(out.value, CellValue::String("00042".into()));
    }

    #[test]
    fn test_replace() {
        let t = CellValueTransformer::replace("[-. ]", "").unwrap();
        assert_eq!(t.apply("123-456.789 0"), "1234567890");
        assert!(CellValueTransformer::replace("(", "").is_err());
    }

    #[test]
    fn test_padding_counts_chars() {
        let t = CellValueTransformer::PadEnd { length: 4, char: '_' };
        assert_eq!(t.apply("é"), "é___");
        assert_eq!(t.apply("abcdef"), "abcdef");
    }

    #[test]
    fn test_ensure_prefix_and_suffix() {
        let prefix = CellValueTransformer::EnsurePrefix { value: "T".into() };
        assert_eq!(prefix.apply("1234567890"), "T1234567890");
        assert_eq!(prefix.apply("T1234567890"), "T1234567890");

        let suffix = CellValueTransformer::EnsureSuffix { value: "%".into() };
        assert_eq!(suffix.apply("50"), "50%");
        assert_eq!(suffix.apply("50%"), "50%");
    }

    #[test]
    fn test_substring_and_filters() {
        let t = CellValueTransformer::Substring { start: 2, length: Some(3) };
        assert_eq!(t.apply("abcdefg"), "cde");
        let t = CellValueTransformer::Substring { start: 10, length: None };
        assert_eq!(t.apply("abc"), "");

        assert_eq!(CellValueTransformer::DigitsOnly.apply("T-123.4"), "1234");
        assert_eq!(CellValueTransformer::Alphanumeric.apply("a-b c!1"), "abc1");
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"[
            {"type": "trim"},
            {"type": "replace", "pattern": "\\s+", "value": " "},
            {"type": "pad_start", "length": 3}
        ]"#;
        let chain: Vec<CellValueTransformer> = serde_json::from_str(json).unwrap();
        let out = chain.iter().fold("  7  ".to_string(), |acc, t| t.apply(&acc));
        assert_eq!(out, "007");

        let bad = r#"{"type": "replace", "pattern": "("}"#;
        assert!(serde_json::from_str::<CellValueTransformer>(bad).is_err());
    }
}
