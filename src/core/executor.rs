//! Query execution
//!
//! [`execute`] validates and classifies the SQL, runs it through a driver and
//! returns an [`ExecutionOutcome`] holding everything about that one
//! statement. Nothing is kept between calls.

use super::driver::{Driver, RawOutcome, ResultSet};
use super::error::{DatabaseError, Result};
use super::verb::QueryVerb;
use tracing::{debug, warn};

/// Longest SQL prefix written to logs
const LOG_SQL_LIMIT: usize = 200;

/// Result of one successful execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    verb: QueryVerb,
    sql: String,
    row_count: u64,
    affected_rows: u64,
    last_insert_id: Option<u64>,
    result_sets: Vec<ResultSet>,
}

impl ExecutionOutcome {
    /// Post-process a driver outcome according to the verb.
    ///
    /// Row count and verb are fixed here, before any row is materialized.
    pub fn from_raw(verb: QueryVerb, sql: impl Into<String>, raw: RawOutcome) -> Self {
        let row_count = raw
            .result_sets
            .first()
            .map(|set| set.row_count() as u64)
            .unwrap_or(0);
        let last_insert_id = match verb {
            QueryVerb::Insert => raw.last_insert_id,
            _ => None,
        };

        Self {
            verb,
            sql: sql.into(),
            row_count,
            affected_rows: raw.affected_rows,
            last_insert_id,
            result_sets: raw.result_sets,
        }
    }

    /// Classified verb
    pub fn verb(&self) -> &QueryVerb {
        &self.verb
    }

    /// Executed SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Rows in the first result set; 0 when the statement returned a status only
    pub fn num_rows(&self) -> u64 {
        self.row_count
    }

    /// Fetched row count for SELECT/SHOW, the driver's affected rows otherwise
    pub fn affected_rows(&self) -> u64 {
        if self.verb.counts_fetched_rows() {
            self.row_count
        } else {
            self.affected_rows
        }
    }

    /// Generated id of an INSERT
    pub fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id
    }

    /// The generated id if this was an INSERT.
    ///
    /// `Some(0)` is a legitimate id (tables without AUTO_INCREMENT) and is
    /// distinct from `None`.
    pub fn was_inserted(&self) -> Option<u64> {
        match self.verb {
            QueryVerb::Insert => Some(self.last_insert_id.unwrap_or(0)),
            _ => None,
        }
    }

    /// Whether this was an UPDATE
    pub fn was_updated(&self) -> bool {
        self.verb == QueryVerb::Update
    }

    /// Whether this was a DELETE
    pub fn was_deleted(&self) -> bool {
        self.verb == QueryVerb::Delete
    }

    /// Borrow the result sets
    pub fn result_sets(&self) -> &[ResultSet] {
        &self.result_sets
    }

    /// Take the result sets out, leaving counts and verb in place
    pub fn take_result_sets(&mut self) -> Vec<ResultSet> {
        std::mem::take(&mut self.result_sets)
    }

    /// Consume the outcome, keeping only the first result set
    pub fn into_first_result_set(self) -> Option<ResultSet> {
        self.result_sets.into_iter().next()
    }
}

/// Truncate SQL for log lines on a char boundary
pub(crate) fn log_sql(sql: &str) -> &str {
    match sql.char_indices().nth(LOG_SQL_LIMIT) {
        Some((i, _)) => &sql[..i],
        None => sql,
    }
}

/// Run one SQL string through `driver`.
///
/// Empty SQL is a configuration error. Driver failures come back as
/// [`DatabaseError::QueryError`], with the SQL attached when `debug` is set.
pub async fn execute<D>(driver: &D, sql: &str, debug: bool) -> Result<ExecutionOutcome>
where
    D: Driver + ?Sized,
{
    if sql.trim().is_empty() {
        return Err(DatabaseError::configuration("You need to provide a query."));
    }

    let verb = QueryVerb::classify(sql);
    debug!(verb = %verb, sql = log_sql(sql), "executing statement");

    let raw = match driver.execute(sql).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(verb = %verb, error = %err, "statement failed");
            return Err(if debug { err.with_sql(sql) } else { err });
        }
    };

    let outcome = ExecutionOutcome::from_raw(verb, sql, raw);
    debug!(
        verb = %outcome.verb(),
        rows = outcome.num_rows(),
        affected = outcome.affected_rows(),
        insert_id = ?outcome.last_insert_id(),
        "statement finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::column::{ColumnKind, ColumnMeta};

    fn select_raw(rows: usize) -> RawOutcome {
        RawOutcome {
            result_sets: vec![ResultSet::new(
                vec![ColumnMeta::new("id", ColumnKind::Integer)],
                (0..rows).map(|i| vec![Some(i.to_string())]).collect(),
            )],
            affected_rows: 99,
            last_insert_id: None,
        }
    }

    #[test]
    fn test_select_counts_fetched_rows() {
        let outcome = ExecutionOutcome::from_raw(QueryVerb::Select, "SELECT id FROM t", select_raw(3));
        assert_eq!(outcome.num_rows(), 3);
        assert_eq!(outcome.affected_rows(), 3);
        assert_eq!(outcome.was_inserted(), None);
        assert!(!outcome.was_updated());
    }

    #[test]
    fn test_update_uses_driver_count() {
        let raw = RawOutcome {
            affected_rows: 4,
            ..RawOutcome::default()
        };
        let outcome = ExecutionOutcome::from_raw(QueryVerb::Update, "UPDATE t SET a = 1", raw);
        assert!(outcome.was_updated());
        assert!(!outcome.was_deleted());
        assert_eq!(outcome.affected_rows(), 4);
        assert_eq!(outcome.num_rows(), 0);
    }

    #[test]
    fn test_insert_captures_id() {
        let raw = RawOutcome {
            affected_rows: 1,
            last_insert_id: Some(12),
            ..RawOutcome::default()
        };
        let outcome = ExecutionOutcome::from_raw(QueryVerb::Insert, "INSERT INTO t VALUES (1)", raw);
        assert_eq!(outcome.was_inserted(), Some(12));
        assert_eq!(outcome.last_insert_id(), Some(12));
    }

    #[test]
    fn test_insert_id_ignored_for_other_verbs() {
        let raw = RawOutcome {
            last_insert_id: Some(5),
            ..RawOutcome::default()
        };
        let outcome = ExecutionOutcome::from_raw(QueryVerb::Delete, "DELETE FROM t", raw);
        assert_eq!(outcome.last_insert_id(), None);
        assert!(outcome.was_deleted());
    }

    #[test]
    fn test_take_result_sets_keeps_counts() {
        let mut outcome = ExecutionOutcome::from_raw(QueryVerb::Select, "SELECT 1", select_raw(2));
        let sets = outcome.take_result_sets();
        assert_eq!(sets.len(), 1);
        assert!(outcome.result_sets().is_empty());
        assert_eq!(outcome.num_rows(), 2);
    }

    #[test]
    fn test_log_sql_truncates() {
        let long = "x".repeat(500);
        assert_eq!(log_sql(&long).len(), LOG_SQL_LIMIT);
        assert_eq!(log_sql("SELECT 1"), "SELECT 1");
    }
}
