//! String escaping for hand-built SQL
//!
//! # Security Warning
//!
//! **SQL Injection Risk**: escaping only neutralizes quote and control
//! characters inside a quoted literal. The caller must still wrap every escaped
//! value in single quotes, and identifiers (table/column names) are never safe
//! to take from user input. This module exists for fragment building such as
//! [`build_filter`](super::filter::build_filter) and `insert_data`.

use super::error::Result;
use super::value::{DatabaseRow, DatabaseValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A driver's string-escaping primitive
pub trait Escaper {
    /// Escape text so it can sit inside a single-quoted SQL literal
    fn escape_str(&self, value: &str) -> String;
}

/// Escaping rules of `mysql_real_escape_string` for ASCII-compatible charsets
pub fn mysql_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
    out
}

/// SQLite string literals only need the quote doubled
pub fn sqlite_escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// Values that can be escaped in place, keeping their shape
pub trait Escape: Sized {
    /// Escape every string inside `self`
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self;
}

impl Escape for String {
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self {
        escaper.escape_str(&self)
    }
}

impl Escape for DatabaseValue {
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self {
        match self {
            DatabaseValue::Text(s) => DatabaseValue::Text(escaper.escape_str(&s)),
            other => other,
        }
    }
}

impl<T: Escape> Escape for Option<T> {
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self {
        self.map(|v| v.escape_with(escaper))
    }
}

impl<T: Escape> Escape for Vec<T> {
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self {
        self.into_iter().map(|v| v.escape_with(escaper)).collect()
    }
}

impl<K: Eq + Hash, V: Escape> Escape for HashMap<K, V> {
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self {
        self.into_iter()
            .map(|(k, v)| (k, v.escape_with(escaper)))
            .collect()
    }
}

impl<K: Ord, V: Escape> Escape for BTreeMap<K, V> {
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self {
        self.into_iter()
            .map(|(k, v)| (k, v.escape_with(escaper)))
            .collect()
    }
}

impl Escape for DatabaseRow {
    fn escape_with(mut self, escaper: &(impl Escaper + ?Sized)) -> Self {
        for value in self.values_mut() {
            let taken = std::mem::replace(value, DatabaseValue::Null);
            *value = taken.escape_with(escaper);
        }
        self
    }
}

/// Record-shaped data: strings are escaped at every depth, keys untouched
impl Escape for serde_json::Value {
    fn escape_with(self, escaper: &(impl Escaper + ?Sized)) -> Self {
        use serde_json::Value;
        match self {
            Value::String(s) => Value::String(escaper.escape_str(&s)),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| v.escape_with(escaper)).collect())
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, v.escape_with(escaper)))
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Escape every string field of a serializable record, returning the same type.
pub fn escape_record<T, E>(record: &T, escaper: &E) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    E: Escaper + ?Sized,
{
    let value = serde_json::to_value(record)?.escape_with(escaper);
    Ok(serde_json::from_value(value)?)
}

/// Escaper for MySQL text literals
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlEscaper;

impl Escaper for MysqlEscaper {
    fn escape_str(&self, value: &str) -> String {
        mysql_escape(value)
    }
}

/// Escaper for SQLite text literals
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEscaper;

impl Escaper for SqliteEscaper {
    fn escape_str(&self, value: &str) -> String {
        sqlite_escape(value)
    }
}
