//! Driver trait and raw results
//!
//! A driver owns one connection and exposes the handful of primitives the
//! wrapper needs: connect, execute raw SQL, escape text, set the charset and
//! close. Everything else is built on top in [`executor`](super::executor),
//! [`materialize`](super::materialize) and the client.

use super::backend::Backend;
use super::column::ColumnMeta;
use super::config::ConnectionConfig;
use super::error::Result;
use super::escape::Escaper;
use async_trait::async_trait;
use std::sync::Arc;

/// One raw result set as read from the wire
///
/// Column metadata is captured before the first row is read; every field is
/// kept as text (`None` = SQL NULL) until materialization coerces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Arc<Vec<ColumnMeta>>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Create a result set from metadata and raw rows
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            columns: Arc::new(columns),
            rows,
        }
    }

    /// Column metadata in result order
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Raw rows
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Arc<Vec<ColumnMeta>>, Vec<Vec<Option<String>>>) {
        (self.columns, self.rows)
    }
}

/// What the driver reports for one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOutcome {
    /// Result sets in statement order; empty when nothing returned rows
    pub result_sets: Vec<ResultSet>,
    /// Rows changed by the first statement
    pub affected_rows: u64,
    /// Id generated by the first statement, if any
    pub last_insert_id: Option<u64>,
}

impl RawOutcome {
    /// Whether the first statement produced a result set rather than a status
    pub fn has_result_set(&self) -> bool {
        !self.result_sets.is_empty()
    }
}

/// Core driver trait that all backends implement
#[async_trait]
pub trait Driver: Escaper + Send + Sync {
    /// Get the backend type
    fn backend(&self) -> Backend;

    /// Open the connection described by `config`
    async fn connect(&self, config: &ConnectionConfig) -> Result<()>;

    /// Check if connected to the database
    fn is_connected(&self) -> bool;

    /// Close the connection; closing twice is a no-op
    async fn close(&self) -> Result<()>;

    /// Execute raw SQL, possibly several `;`-separated statements.
    ///
    /// Trailing result sets are drained so the connection is ready for the
    /// next call.
    ///
    /// # Security Warning
    ///
    /// **SQL Injection Risk**: the text is sent as-is. Escape interpolated
    /// values and quote them yourself.
    async fn execute(&self, sql: &str) -> Result<RawOutcome>;

    /// Set the connection character set
    async fn set_charset(&self, charset: &str) -> Result<()>;
}
