//! Statement verb classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading keyword of a SQL statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QueryVerb {
    Select,
    Insert,
    Update,
    Delete,
    Show,
    Call,
    /// Any other keyword, uppercased
    Other(String),
    /// Nothing executed yet
    #[default]
    None,
}

impl QueryVerb {
    /// Classify SQL text by its first whitespace-delimited token.
    ///
    /// ```
    /// use rust_sql_wrapper::core::verb::QueryVerb;
    ///
    /// assert_eq!(QueryVerb::classify("select * from t"), QueryVerb::Select);
    /// assert_eq!(QueryVerb::classify("  \n\tUpDaTe t SET a = 1"), QueryVerb::Update);
    /// ```
    pub fn classify(sql: &str) -> Self {
        let token = sql.split_whitespace().next().unwrap_or_default();
        Self::from_keyword(&token.to_uppercase())
    }

    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "SELECT" => QueryVerb::Select,
            "INSERT" => QueryVerb::Insert,
            "UPDATE" => QueryVerb::Update,
            "DELETE" => QueryVerb::Delete,
            "SHOW" => QueryVerb::Show,
            "CALL" => QueryVerb::Call,
            "" => QueryVerb::None,
            other => QueryVerb::Other(other.to_string()),
        }
    }

    /// Uppercased keyword
    pub fn as_str(&self) -> &str {
        match self {
            QueryVerb::Select => "SELECT",
            QueryVerb::Insert => "INSERT",
            QueryVerb::Update => "UPDATE",
            QueryVerb::Delete => "DELETE",
            QueryVerb::Show => "SHOW",
            QueryVerb::Call => "CALL",
            QueryVerb::Other(s) => s,
            QueryVerb::None => "",
        }
    }

    /// Verbs whose row count is the fetched row count rather than the driver's affected rows
    pub fn counts_fetched_rows(&self) -> bool {
        matches!(self, QueryVerb::Select | QueryVerb::Show)
    }
}

impl fmt::Display for QueryVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_verbs() {
        assert_eq!(QueryVerb::classify("SELECT 1"), QueryVerb::Select);
        assert_eq!(QueryVerb::classify("insert into t values (1)"), QueryVerb::Insert);
        assert_eq!(QueryVerb::classify("Delete FROM t"), QueryVerb::Delete);
        assert_eq!(QueryVerb::classify("show tables"), QueryVerb::Show);
        assert_eq!(QueryVerb::classify("call refresh()"), QueryVerb::Call);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            QueryVerb::classify("create table t (id int)"),
            QueryVerb::Other("CREATE".to_string())
        );
        assert_eq!(QueryVerb::classify("replace into t values (1)").as_str(), "REPLACE");
    }

    #[test]
    fn test_classify_only_first_token() {
        assert_eq!(QueryVerb::classify("select\n*\nfrom t"), QueryVerb::Select);
        assert_eq!(QueryVerb::classify("SELECT-1").as_str(), "SELECT-1");
    }

    #[test]
    fn test_classify_blank() {
        assert_eq!(QueryVerb::classify("   "), QueryVerb::None);
    }

    #[test]
    fn test_counts_fetched_rows() {
        assert!(QueryVerb::Select.counts_fetched_rows());
        assert!(QueryVerb::Show.counts_fetched_rows());
        assert!(!QueryVerb::Call.counts_fetched_rows());
        assert!(!QueryVerb::Update.counts_fetched_rows());
    }
}
