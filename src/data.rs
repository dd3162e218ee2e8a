//! Typed cell values and per-column kind detection.
//!
//! Every field read from the source is classified once at load time:
//! empty or placeholder tokens become [`Cell::Missing`], anything that parses
//! as a finite number becomes [`Cell::Number`], and the rest is kept verbatim
//! as [`Cell::Text`].

use std::{borrow::Cow, fmt};

use serde::{Serialize, Serializer};

/// Tokens read as missing values, compared case-insensitively after trimming.
const MISSING_TOKENS: &[&str] = &["", "na", "n/a", "#n/a", "nan", "-nan", "null", "none", "<na>"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_missing_token(trimmed) {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if !value.is_nan() => Cell::Number(value),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Integral numeric cells as an encoded category code.
    pub fn as_code(&self) -> Option<i64> {
        match self {
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
                Some(*value as i64)
            }
            _ => None,
        }
    }

    /// Grouping key for categorical aggregation; missing cells have no key.
    pub fn group_key(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Missing => None,
            Cell::Number(value) => Some(Cow::Owned(format_number(*value))),
            Cell::Text(value) => Some(Cow::Borrowed(value.as_str())),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Number(value) => format_number(*value),
            Cell::Text(value) => value.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cell::Missing => serializer.serialize_none(),
            Cell::Number(value) => serializer.serialize_f64(*value),
            Cell::Text(value) => serializer.serialize_str(value),
        }
    }
}

/// Column-level type, the way a dataframe would report its dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Empty,
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn detect<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut kind = ColumnKind::Empty;
        for cell in cells {
            match cell {
                Cell::Missing => {}
                Cell::Number(_) => kind = ColumnKind::Numeric,
                Cell::Text(_) => return ColumnKind::Text,
            }
        }
        kind
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::Empty => "empty",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
        };
        f.write_str(label)
    }
}

fn is_missing_token(value: &str) -> bool {
    MISSING_TOKENS
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
}

/// Literal form of a number: integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_numbers_text_and_placeholders() {
        assert_eq!(Cell::parse("42"), Cell::Number(42.0));
        assert_eq!(Cell::parse(" 3.5 "), Cell::Number(3.5));
        assert_eq!(Cell::parse("Visual"), Cell::text("Visual"));
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("NaN"), Cell::Missing);
        assert_eq!(Cell::parse("N/A"), Cell::Missing);
    }

    #[test]
    fn as_code_requires_integral_values() {
        assert_eq!(Cell::Number(2.0).as_code(), Some(2));
        assert_eq!(Cell::Number(2.5).as_code(), None);
        assert_eq!(Cell::text("2").as_code(), None);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(2.25), "2.25");
    }

    #[test]
    fn column_kind_prefers_text_over_numeric() {
        let numeric = [Cell::Number(1.0), Cell::Missing, Cell::Number(0.0)];
        assert_eq!(ColumnKind::detect(&numeric), ColumnKind::Numeric);

        let mixed = [Cell::Number(1.0), Cell::text("Yes")];
        assert_eq!(ColumnKind::detect(&mixed), ColumnKind::Text);

        let empty = [Cell::Missing, Cell::Missing];
        assert_eq!(ColumnKind::detect(&empty), ColumnKind::Empty);
    }
}
