//! Column metadata and wire-value coercion
//!
//! Drivers hand over every field as text (or NULL). The declared column type,
//! captured before any row is read, decides which scalar the text becomes.

use super::value::DatabaseValue;
use serde::{Deserialize, Serialize};

/// Scalar family a column's declared type maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ColumnKind {
    /// Column declared as NULL type; every value becomes `Null`
    Null,
    /// Integer family (TINYINT .. BIGINT)
    Integer,
    /// FLOAT, DOUBLE and DECIMAL
    Float,
    /// Everything else
    #[default]
    Text,
}

impl ColumnKind {
    /// Map a declared SQLite column type using SQLite's affinity rules.
    ///
    /// NUMERIC affinity counts as `Float`, matching how DECIMAL columns are
    /// treated for MySQL.
    pub fn from_sqlite_decltype(decltype: &str) -> Self {
        let t = decltype.to_ascii_uppercase();
        if t.contains("INT") {
            ColumnKind::Integer
        } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
            ColumnKind::Text
        } else if t.is_empty() || t.contains("BLOB") {
            ColumnKind::Text
        } else if t.contains("REAL")
            || t.contains("FLOA")
            || t.contains("DOUB")
            || t.contains("DEC")
            || t.contains("NUMERIC")
        {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }

    /// Coerce a raw wire value into a tagged scalar.
    ///
    /// A raw NULL always yields `Null`. Unparseable numbers fall back to the
    /// numeric prefix of the text, or zero.
    pub fn coerce(&self, raw: Option<&str>) -> DatabaseValue {
        let Some(raw) = raw else {
            return DatabaseValue::Null;
        };
        match self {
            ColumnKind::Null => DatabaseValue::Null,
            ColumnKind::Integer => DatabaseValue::Int(parse_int(raw)),
            ColumnKind::Float => DatabaseValue::Float(parse_float(raw)),
            ColumnKind::Text => DatabaseValue::Text(raw.to_string()),
        }
    }
}

fn parse_int(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return v;
    }
    // Unsigned BIGINT above i64::MAX and "12.0"-style text saturate like a float cast
    parse_float(raw) as i64
}

fn parse_float(raw: &str) -> f64 {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<f64>() {
        return v;
    }
    let prefix = numeric_prefix(raw);
    prefix.parse::<f64>().unwrap_or(0.0)
}

/// Longest leading slice that looks like a decimal number
fn numeric_prefix(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'+' | b'-' if i == 0 => {}
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + 1;
    }
    if seen_digit {
        &raw[..end]
    } else {
        ""
    }
}

/// Metadata for one result-set column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name or alias
    pub name: String,
    /// Scalar family used for coercion
    pub kind: ColumnKind,
    /// Type name as reported by the driver
    pub declared: Option<String>,
}

impl ColumnMeta {
    /// Create column metadata
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            declared: None,
        }
    }

    /// Attach the driver's type name
    #[must_use]
    pub fn declared(mut self, declared: impl Into<String>) -> Self {
        self.declared = Some(declared.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coercion() {
        assert_eq!(ColumnKind::Integer.coerce(Some("42")), DatabaseValue::Int(42));
        assert_eq!(ColumnKind::Integer.coerce(Some("-7")), DatabaseValue::Int(-7));
        assert_eq!(
            ColumnKind::Integer.coerce(Some("18446744073709551615")),
            DatabaseValue::Int(i64::MAX)
        );
        assert_eq!(ColumnKind::Integer.coerce(Some("abc")), DatabaseValue::Int(0));
        assert_eq!(ColumnKind::Integer.coerce(Some("12abc")), DatabaseValue::Int(12));
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(ColumnKind::Float.coerce(Some("1.25")), DatabaseValue::Float(1.25));
        assert_eq!(ColumnKind::Float.coerce(Some("10.50")), DatabaseValue::Float(10.5));
        assert_eq!(ColumnKind::Float.coerce(Some("x")), DatabaseValue::Float(0.0));
    }

    #[test]
    fn test_text_and_null_coercion() {
        assert_eq!(
            ColumnKind::Text.coerce(Some("0042")),
            DatabaseValue::Text("0042".to_string())
        );
        assert_eq!(ColumnKind::Null.coerce(Some("anything")), DatabaseValue::Null);
    }

    #[test]
    fn test_raw_null_is_null_for_every_kind() {
        for kind in [
            ColumnKind::Null,
            ColumnKind::Integer,
            ColumnKind::Float,
            ColumnKind::Text,
        ] {
            assert_eq!(kind.coerce(None), DatabaseValue::Null);
        }
    }

    #[test]
    fn test_sqlite_affinity() {
        assert_eq!(ColumnKind::from_sqlite_decltype("INTEGER"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_sqlite_decltype("bigint"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_sqlite_decltype("VARCHAR(20)"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_sqlite_decltype("REAL"), ColumnKind::Float);
        assert_eq!(ColumnKind::from_sqlite_decltype("DOUBLE PRECISION"), ColumnKind::Float);
        assert_eq!(ColumnKind::from_sqlite_decltype("DECIMAL(10,2)"), ColumnKind::Float);
        assert_eq!(ColumnKind::from_sqlite_decltype("BLOB"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_sqlite_decltype("DATETIME"), ColumnKind::Text);
    }
}
