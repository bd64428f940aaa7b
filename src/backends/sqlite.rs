//! SQLite driver implementation
//!
//! This module provides a SQLite implementation of the Driver trait. Blocking
//! rusqlite calls run on tokio's blocking pool.

use crate::core::{
    backend::Backend,
    column::{ColumnKind, ColumnMeta},
    config::{validate_charset, ConnectionConfig},
    driver::{Driver, RawOutcome, ResultSet},
    error::{DatabaseError, Result},
    escape::{sqlite_escape, Escaper},
};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, Statement};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default timeout for database operations (30 seconds)
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite driver
pub struct SqliteDriver {
    connection: Arc<Mutex<Option<Connection>>>,
    timeout: Duration,
}

impl SqliteDriver {
    /// Create a new, unconnected SQLite driver
    pub fn new() -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `f` against the open connection on the blocking pool, bounded by the timeout
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let connection_arc = Arc::clone(&self.connection);

        let mut task = tokio::task::spawn_blocking(move || -> Result<T> {
            let connection = connection_arc.blocking_lock();
            let conn = connection.as_ref().ok_or(DatabaseError::NotConnected)?;
            f(conn)
        });

        // Use select! to abort task on timeout, preventing resource leaks
        tokio::select! {
            result = &mut task => {
                result.map_err(|e| DatabaseError::other(format!("Task join error: {}", e)))?
            }
            _ = tokio::time::sleep(self.timeout) => {
                task.abort();
                Err(DatabaseError::query_timeout(self.timeout.as_millis() as u64))
            }
        }
    }

    /// Run every statement of `sql`, collecting result sets and the first statement's counts
    fn run_batch(conn: &Connection, sql: &str) -> rusqlite::Result<RawOutcome> {
        let mut outcome = RawOutcome::default();
        let mut batch = Batch::new(conn, sql);
        let mut first = true;

        while let Some(mut stmt) = batch.next()? {
            if stmt.column_count() > 0 {
                let set = Self::read_result_set(&mut stmt)?;
                outcome.result_sets.push(set);
                // Writes with RETURNING produce rows and change counts
                if first && !stmt.readonly() {
                    outcome.affected_rows = conn.changes();
                    outcome.last_insert_id = u64::try_from(conn.last_insert_rowid()).ok();
                }
            } else {
                let affected = stmt.execute([])?;
                if first {
                    outcome.affected_rows = affected as u64;
                    outcome.last_insert_id = u64::try_from(conn.last_insert_rowid()).ok();
                }
            }
            first = false;
        }

        Ok(outcome)
    }

    /// Read one result set, capturing column kinds before consuming rows
    fn read_result_set(stmt: &mut Statement<'_>) -> rusqlite::Result<ResultSet> {
        let mut columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .map(|c| match c.decl_type() {
                Some(decl) => {
                    ColumnMeta::new(c.name(), ColumnKind::from_sqlite_decltype(decl)).declared(decl)
                }
                None => ColumnMeta::new(c.name(), ColumnKind::Text),
            })
            .collect();
        let width = columns.len();

        // Expression columns carry no declared type; take it from the first non-null value
        let mut undeclared: Vec<bool> = columns.iter().map(|c| c.declared.is_none()).collect();

        let mut raw_rows = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut raw = Vec::with_capacity(width);
            for i in 0..width {
                let value = row.get_ref(i)?;
                if undeclared[i] {
                    if let Some(kind) = kind_of(value) {
                        columns[i].kind = kind;
                        undeclared[i] = false;
                    }
                }
                raw.push(wire_text(value));
            }
            raw_rows.push(raw);
        }

        Ok(ResultSet::new(columns, raw_rows))
    }
}

fn kind_of(value: ValueRef<'_>) -> Option<ColumnKind> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(_) => Some(ColumnKind::Integer),
        ValueRef::Real(_) => Some(ColumnKind::Float),
        ValueRef::Text(_) | ValueRef::Blob(_) => Some(ColumnKind::Text),
    }
}

/// Render a value the way a text-protocol server would send it
fn wire_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(v) => Some(v.to_string()),
        ValueRef::Real(v) => Some(v.to_string()),
        ValueRef::Text(v) | ValueRef::Blob(v) => Some(String::from_utf8_lossy(v).into_owned()),
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Escaper for SqliteDriver {
    fn escape_str(&self, value: &str) -> String {
        sqlite_escape(value)
    }
}

#[async_trait]
impl Driver for SqliteDriver {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<()> {
        // Clean up any existing connection first
        {
            let mut connection = self.connection.lock().await;
            *connection = None;
        }

        let path = config.connection_string();
        let connection_arc = Arc::clone(&self.connection);
        let open_path = path.clone();

        let mut task = tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = Connection::open(&open_path)?;

            // Enable foreign keys
            conn.execute("PRAGMA foreign_keys = ON", [])?;

            let mut connection = connection_arc.blocking_lock();
            *connection = Some(conn);

            Ok(())
        });

        let opened = tokio::select! {
            result = &mut task => {
                result.map_err(|e| DatabaseError::other(format!("Task join error: {}", e)))?
            }
            _ = tokio::time::sleep(self.timeout) => {
                task.abort();
                Err(DatabaseError::query_timeout(self.timeout.as_millis() as u64))
            }
        };

        opened.map_err(|e| {
            DatabaseError::connection_failed_with_source(&path, 0, "Could not open database", Box::new(e))
        })?;
        info!(path = %path, "sqlite database opened");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection
            .try_lock()
            .map(|conn| conn.is_some())
            .unwrap_or(false)
    }

    async fn close(&self) -> Result<()> {
        let mut connection = self.connection.lock().await;
        if connection.take().is_some() {
            debug!("sqlite database closed");
        }
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<RawOutcome> {
        let sql = sql.to_string();
        self.with_connection(move |conn| {
            Self::run_batch(conn, &sql).map_err(|e| DatabaseError::query(e.to_string()))
        })
        .await
    }

    async fn set_charset(&self, charset: &str) -> Result<()> {
        validate_charset(charset)?;
        // SQLite text is always UTF-8; only the encoding of a fresh database can change
        let pragma = match charset.to_ascii_lowercase().as_str() {
            "utf8" | "utf8mb4" | "utf_8" => "UTF-8".to_string(),
            other => other.to_uppercase(),
        };
        self.with_connection(move |conn| {
            conn.execute_batch(&format!("PRAGMA encoding = '{}'", pragma))
                .map_err(|e| DatabaseError::query(e.to_string()))
        })
        .await
    }
}
