//! Property-based tests for escaping, cleaning, filters and classification using proptest

use proptest::prelude::*;
use rust_sql_wrapper::core::escape::{mysql_escape, sqlite_escape, Escape, MysqlEscaper};
use rust_sql_wrapper::core::filter::FilterKey;
use rust_sql_wrapper::core::html::{clean_html, decode_entities};
use rust_sql_wrapper::core::ColumnKind;
use rust_sql_wrapper::prelude::*;

// ============================================================================
// Statement Classification
// ============================================================================

proptest! {
    /// The verb depends only on the first word, whatever its case
    #[test]
    fn test_verb_ignores_case_and_tail(
        verb in prop::sample::select(vec!["select", "insert", "update", "delete", "show", "call"]),
        upper in any::<bool>(),
        lead in "[ \t\n]{0,3}",
        tail in "[a-z0-9 ,*]{0,40}",
    ) {
        let word = if upper { verb.to_uppercase() } else { verb.to_string() };
        let sql = format!("{}{} {}", lead, word, tail);
        let classified = QueryVerb::classify(&sql);
        prop_assert_eq!(classified.as_str(), verb.to_uppercase());
    }

    /// Unknown first words are kept, uppercased
    #[test]
    fn test_unknown_verb_is_other(word in "[a-z]{3,10}") {
        prop_assume!(!["select", "insert", "update", "delete", "show", "call"].contains(&word.as_str()));
        let classified = QueryVerb::classify(&format!("{} x", word));
        prop_assert_eq!(classified, QueryVerb::Other(word.to_uppercase()));
    }
}

// ============================================================================
// Filter Strings
// ============================================================================

proptest! {
    /// Every fragment appears once, in order, joined by the operator
    #[test]
    fn test_filter_joins_all_fragments(
        fragments in prop::collection::vec("[a-z]{1,8} = [0-9]{1,4}", 1..8),
        or in any::<bool>(),
    ) {
        let options = if or { FilterOptions::or() } else { FilterOptions::default() };
        let op = if or { " OR " } else { " AND " };
        let entries: Vec<(FilterKey, &str)> = fragments
            .iter()
            .enumerate()
            .map(|(i, f)| (FilterKey::Index(i), f.as_str()))
            .collect();

        let clause = build_filter(entries, &options, "WHERE");
        prop_assert_eq!(clause, format!("WHERE {}", fragments.join(op)));
    }

    /// Enclosing wraps exactly the joined body
    #[test]
    fn test_filter_enclose(fragments in prop::collection::vec("[a-z]{1,8} > 1", 1..5)) {
        let entries: Vec<(usize, &str)> = fragments.iter().map(String::as_str).enumerate().collect();
        let clause = build_filter(entries, &FilterOptions::default().enclose(true), "");
        prop_assert!(clause.starts_with('('));
        prop_assert!(clause.ends_with(')'));
        prop_assert_eq!(clause.matches(" AND ").count(), fragments.len() - 1);
    }

    /// No fragments means no clause, whatever the leading keyword
    #[test]
    fn test_empty_filter_is_empty(append in "[A-Z ]{0,8}") {
        let clause = build_filter(Vec::<(&str, &str)>::new(), &FilterOptions::default(), &append);
        prop_assert!(clause.is_empty());
    }
}

// ============================================================================
// Escaping
// ============================================================================

proptest! {
    /// Text without special characters is left alone
    #[test]
    fn test_plain_text_is_unchanged(s in "[a-zA-Z0-9 _.,-]{0,64}") {
        prop_assert_eq!(mysql_escape(&s), s.clone());
        prop_assert_eq!(sqlite_escape(&s), s);
    }

    /// SQLite escaping leaves no lone quote behind
    #[test]
    fn test_sqlite_escape_doubles_quotes(s in ".{0,64}") {
        let escaped = sqlite_escape(&s);
        prop_assert_eq!(escaped.replace("''", "'"), s);
    }

    /// MySQL escaping never leaves an unescaped quote
    #[test]
    fn test_mysql_escape_quotes_are_escaped(s in ".{0,64}") {
        let escaped = mysql_escape(&s);
        let mut chars = escaped.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                prop_assert!(chars.next().is_some());
            } else {
                prop_assert!(c != '\'' && c != '"' && c != '\0');
            }
        }
    }

    /// Escaping a map escapes every value and keeps every key
    #[test]
    fn test_escape_map_values(values in prop::collection::btree_map("[a-z]{1,6}", ".{0,16}", 0..6)) {
        let escaped = values.clone().escape_with(&MysqlEscaper);
        prop_assert_eq!(escaped.len(), values.len());
        for (key, value) in &values {
            prop_assert_eq!(&escaped[key], &mysql_escape(value));
        }
    }
}

// ============================================================================
// HTML Cleaning
// ============================================================================

proptest! {
    /// Cleaning twice equals cleaning once
    #[test]
    fn test_clean_is_idempotent(s in "[a-z &;<>\"'#0-9]{0,64}") {
        let once = clean_html(&s);
        prop_assert_eq!(clean_html(&once), once);
    }

    /// Same, with accented letters, symbols and named entities in the mix
    #[test]
    fn test_clean_is_idempotent_for_named_entities(
        parts in prop::collection::vec(
            prop_oneof![
                "[a-zA-Z \u{a0}-\u{ff}\u{2190}-\u{2194}\u{2660}-\u{2666}\u{4e00}]{1,8}",
                Just("&hearts;".to_string()),
                Just("&Eacute;".to_string()),
                Just("&amp;".to_string()),
                Just("&#233;".to_string()),
            ],
            0..8,
        )
    ) {
        let s = parts.concat();
        let once = clean_html(&s);
        prop_assert_eq!(clean_html(&once), once.clone());
        // every Latin-1 character has a name, so none survives raw
        let latin1 = '\u{a0}'..='\u{ff}';
        prop_assert!(!once.chars().any(|c| latin1.contains(&c)));
    }

    /// Cleaned text never carries raw markup characters
    #[test]
    fn test_clean_has_no_raw_markup(s in ".{0,64}") {
        let cleaned = clean_html(&s);
        prop_assert!(!cleaned.contains('<'));
        prop_assert!(!cleaned.contains('>'));
        prop_assert!(!cleaned.contains('"'));
    }

    /// Decoding the cleaned text gives back the decoded input
    #[test]
    fn test_clean_preserves_meaning(s in "[a-zA-Z &<>]{0,64}") {
        prop_assert_eq!(decode_entities(&clean_html(&s)), decode_entities(&s));
    }
}

// ============================================================================
// Coercion
// ============================================================================

proptest! {
    #[test]
    fn test_integer_coercion(value in any::<i64>()) {
        let raw = value.to_string();
        prop_assert_eq!(ColumnKind::Integer.coerce(Some(&raw)), DatabaseValue::Int(value));
        prop_assert_eq!(ColumnKind::Integer.coerce(None), DatabaseValue::Null);
    }

    #[test]
    fn test_float_coercion(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let raw = value.to_string();
        prop_assert_eq!(ColumnKind::Float.coerce(Some(&raw)), DatabaseValue::Float(value));
    }

    #[test]
    fn test_text_coercion(s in ".{0,32}") {
        prop_assert_eq!(ColumnKind::Text.coerce(Some(&s)), DatabaseValue::Text(s.clone()));
    }
}

// ============================================================================
// SQLite Round Trip
// ============================================================================

#[cfg(feature = "sqlite")]
mod sqlite_round_trip {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Escaped text stored through the wrapper reads back unchanged
        #[test]
        fn test_escaped_text_round_trips(s in "[^\u{0}]{0,48}") {
            let stored = tokio_test::block_on(async {
                let config = ConnectionBuilder::new(Backend::Sqlite)
                    .database(":memory:")
                    .clean(false)
                    .build()?;
                let db = SqlClient::connect(SqliteDriver::new(), config).await?;
                db.execute("CREATE TABLE t (body TEXT)").await?;
                db.insert_data("t", [("body", s.as_str())]).await?;
                let row = db.query_row("SELECT body FROM t").await?;
                db.close().await?;
                Ok::<_, DatabaseError>(row)
            })
            .unwrap()
            .unwrap();
            prop_assert_eq!(stored.get("body"), Some(&DatabaseValue::from(s.as_str())));
        }
    }
}
