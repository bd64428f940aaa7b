//! Filter-string builder
//!
//! Concatenates caller-supplied condition fragments into a WHERE/AND clause.
//! Fragments are not parsed or escaped; see [`escape`](super::escape) for the
//! values interpolated into them.

use std::fmt;
use std::str::FromStr;

/// Boolean operator joining the fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolOp {
    /// AND
    #[default]
    And,
    /// OR
    Or,
}

impl BoolOp {
    fn as_sql(&self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for BoolOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Ok(BoolOp::And),
            "OR" => Ok(BoolOp::Or),
            _ => Err(format!("Invalid boolean operator: '{}'", s)),
        }
    }
}

/// Keyword placed in front of the joined fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lead {
    /// `WHERE ...`, for a standalone clause
    #[default]
    Where,
    /// `AND ...`, to extend an existing WHERE clause
    And,
    /// No keyword
    None,
}

impl Lead {
    fn as_sql(&self) -> &'static str {
        match self {
            Lead::Where => "WHERE",
            Lead::And => "AND",
            Lead::None => "",
        }
    }
}

/// Key of a filter entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey {
    /// Positional entry; its fragment is used verbatim
    Index(usize),
    /// Column entry; emitted as `<column> <fragment>`
    Column(String),
}

impl From<usize> for FilterKey {
    fn from(i: usize) -> Self {
        FilterKey::Index(i)
    }
}

impl From<&str> for FilterKey {
    fn from(s: &str) -> Self {
        FilterKey::Column(s.to_string())
    }
}

impl From<String> for FilterKey {
    fn from(s: String) -> Self {
        FilterKey::Column(s)
    }
}

impl From<&String> for FilterKey {
    fn from(s: &String) -> Self {
        FilterKey::Column(s.clone())
    }
}

/// Options for [`build_filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOptions {
    /// Operator between fragments (default AND)
    pub operator: BoolOp,
    /// Wrap the joined fragments in parentheses
    pub enclose: bool,
}

impl FilterOptions {
    /// Options joining with OR
    pub fn or() -> Self {
        Self {
            operator: BoolOp::Or,
            enclose: false,
        }
    }

    /// Set `enclose`
    #[must_use]
    pub fn enclose(mut self, enclose: bool) -> Self {
        self.enclose = enclose;
        self
    }
}

/// Build a SQL condition string from fragments.
///
/// Returns an empty string when there are no fragments so the caller can omit
/// the clause entirely.
///
/// ```
/// use rust_sql_wrapper::core::filter::{build_filter, FilterOptions};
///
/// let clause = build_filter(
///     [("Name", "LIKE 'B%'"), ("City", "= 'X'")],
///     &FilterOptions::or(),
///     "WHERE",
/// );
/// assert_eq!(clause, "WHERE Name LIKE 'B%' OR City = 'X'");
/// ```
pub fn build_filter<I, K, V>(fields: I, options: &FilterOptions, append: &str) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<FilterKey>,
    V: AsRef<str>,
{
    let fragments: Vec<String> = fields
        .into_iter()
        .map(|(key, fragment)| match key.into() {
            FilterKey::Index(_) => fragment.as_ref().to_string(),
            FilterKey::Column(column) => format!("{} {}", column, fragment.as_ref()),
        })
        .collect();

    if fragments.is_empty() {
        return String::new();
    }

    let joined = fragments.join(&format!(" {} ", options.operator));
    let body = if options.enclose {
        format!("({})", joined)
    } else {
        joined
    };

    let append = append.trim();
    if append.is_empty() {
        body
    } else {
        format!("{} {}", append, body)
    }
}

/// Ordered filter entries plus options
///
/// ```
/// use rust_sql_wrapper::core::filter::{BoolOp, FilterSpec, Lead};
///
/// let clause = FilterSpec::new()
///     .column("age", ">= 18")
///     .raw("status = 'a' OR status = 'b'")
///     .enclose(true)
///     .lead(Lead::And)
///     .build();
/// assert_eq!(clause, "AND (age >= 18 AND status = 'a' OR status = 'b')");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    entries: Vec<(FilterKey, String)>,
    options: FilterOptions,
    lead: Lead,
}

impl FilterSpec {
    /// Create an empty filter: AND, not enclosed, WHERE-led
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `<column> <fragment>` entry
    #[must_use]
    pub fn column(mut self, column: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.entries
            .push((FilterKey::Column(column.into()), fragment.into()));
        self
    }

    /// Add a verbatim fragment
    #[must_use]
    pub fn raw(mut self, fragment: impl Into<String>) -> Self {
        let index = self.entries.len();
        self.entries.push((FilterKey::Index(index), fragment.into()));
        self
    }

    /// Set the joining operator
    #[must_use]
    pub fn operator(mut self, operator: BoolOp) -> Self {
        self.options.operator = operator;
        self
    }

    /// Wrap the joined fragments in parentheses
    #[must_use]
    pub fn enclose(mut self, enclose: bool) -> Self {
        self.options.enclose = enclose;
        self
    }

    /// Set the leading keyword
    #[must_use]
    pub fn lead(mut self, lead: Lead) -> Self {
        self.lead = lead;
        self
    }

    /// Whether no entries were added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the clause
    pub fn build(&self) -> String {
        build_filter(
            self.entries.iter().map(|(k, v)| (k.clone(), v.as_str())),
            &self.options,
            self.lead.as_sql(),
        )
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_or_filter() {
        let clause = build_filter(
            vec![("Name", "LIKE 'B%'"), ("City", "= 'X'")],
            &FilterOptions::or(),
            "WHERE",
        );
        assert_eq!(clause, "WHERE Name LIKE 'B%' OR City = 'X'");
    }

    #[test]
    fn test_default_operator_is_and() {
        let clause = build_filter(
            vec![("a", "= 1"), ("b", "= 2")],
            &FilterOptions::default(),
            "AND",
        );
        assert_eq!(clause, "AND a = 1 AND b = 2");
    }

    #[test]
    fn test_empty_fields_give_empty_string() {
        let fields: Vec<(&str, &str)> = Vec::new();
        assert_eq!(build_filter(fields, &FilterOptions::default(), "WHERE"), "");
        assert_eq!(FilterSpec::new().build(), "");
    }

    #[test]
    fn test_index_keys_are_verbatim() {
        let fields: Vec<(FilterKey, &str)> = vec![
            (0usize.into(), "x = 1 OR y = 2"),
            ("z".into(), "IS NULL"),
        ];
        let clause = build_filter(fields, &FilterOptions::default().enclose(true), "WHERE ");
        assert_eq!(clause, "WHERE (x = 1 OR y = 2 AND z IS NULL)");
    }

    #[test]
    fn test_no_append() {
        let clause = build_filter([("id", "= 3")], &FilterOptions::default(), "");
        assert_eq!(clause, "id = 3");
    }

    #[test]
    fn test_btreemap_input() {
        let mut fields = BTreeMap::new();
        fields.insert("b".to_string(), "> 2".to_string());
        fields.insert("a".to_string(), "< 1".to_string());
        let clause = build_filter(&fields, &FilterOptions::default(), "WHERE");
        assert_eq!(clause, "WHERE a < 1 AND b > 2");
    }

    #[test]
    fn test_bool_op_parse() {
        assert_eq!("or".parse::<BoolOp>(), Ok(BoolOp::Or));
        assert_eq!(" And ".parse::<BoolOp>(), Ok(BoolOp::And));
        assert!("xor".parse::<BoolOp>().is_err());
    }

    #[test]
    fn test_filter_lead_none() {
        let clause = FilterSpec::new()
            .column("a", "= 1")
            .operator(BoolOp::Or)
            .lead(Lead::None)
            .to_string();
        assert_eq!(clause, "a = 1");
    }
}
