//! Result materialization
//!
//! Turns a raw [`ResultSet`] into [`DatabaseRow`]s: coerce each field by its
//! column kind, optionally HTML-clean text, then hand each field to an
//! optional hook that may replace it.

use super::driver::ResultSet;
use super::html::clean_value;
use super::value::{DatabaseResult, DatabaseRow, DatabaseValue};
use std::sync::Arc;

/// Per-field hook: `(value, row so far, clean)`.
///
/// Returning a truthy `Some` value replaces the field. `None` keeps the processed
/// value, as do the falsy values `Null`, `0`, `0.0`, `""` and `"0"`.
pub type RowHook<'a> =
    dyn Fn(&DatabaseValue, &DatabaseRow, bool) -> Option<DatabaseValue> + Send + Sync + 'a;

/// Materialize every row of `set`, consuming it.
pub fn materialize(set: ResultSet, clean: bool, hook: Option<&RowHook<'_>>) -> DatabaseResult {
    let (columns, raw_rows) = set.into_parts();
    let names: Arc<Vec<String>> = Arc::new(columns.iter().map(|c| c.name.clone()).collect());
    let index = Arc::new(DatabaseRow::build_index(&names));

    raw_rows
        .into_iter()
        .map(|raw| {
            let values = columns
                .iter()
                .zip(raw.iter().map(Option::as_deref).chain(std::iter::repeat(None)))
                .map(|(column, field)| {
                    let value = column.kind.coerce(field);
                    if clean {
                        clean_value(value)
                    } else {
                        value
                    }
                })
                .collect();

            let mut row = DatabaseRow::with_index(Arc::clone(&names), Arc::clone(&index), values);
            if let Some(hook) = hook {
                apply_hook(&mut row, hook, clean);
            }
            row
        })
        .collect()
}

fn apply_hook(row: &mut DatabaseRow, hook: &RowHook<'_>, clean: bool) {
    for i in 0..row.len() {
        let replacement = match row.get_index(i) {
            Some(value) => hook(value, row, clean),
            None => None,
        };
        if let Some(new_value) = replacement.filter(is_truthy) {
            row.set_index(i, new_value);
        }
    }
}

/// Falsy: `Null`, zero, `""` and `"0"`
fn is_truthy(value: &DatabaseValue) -> bool {
    match value {
        DatabaseValue::Null => false,
        DatabaseValue::Int(n) => *n != 0,
        DatabaseValue::Float(f) => *f != 0.0,
        DatabaseValue::Text(s) => !(s.is_empty() || s == "0"),
    }
}
